use image::math::Rect;
use imageproc::point::Point;
use num_traits::{Num, ToPrimitive};

/// Calculates the axis-aligned bounding box of a set of vertices.
///
/// The box spans from the smallest to the largest coordinate on each axis, so
/// `width` and `height` are vertex spans (`max - min`), not pixel counts. This
/// matches how polygon vertices sit on pixel centers: a ring whose vertices
/// cover columns 10 and 19 has a width of 9.
///
/// The function is generic over numeric types that implement `PartialOrd`, so it
/// works for both pixel (`i32`) and floating-point coordinates. Negative values
/// are clamped to 0 when converted to `u32`.
///
/// # Returns
///
/// `None` if `vertices` is empty.
///
/// # Examples
///
/// ```
/// use imageproc::point::Point;
/// use mask_polygon_codec::rect::bounding_box;
///
/// let diamond = [
///     Point { x: 50, y: 10 },
///     Point { x: 90, y: 50 },
///     Point { x: 50, y: 90 },
///     Point { x: 10, y: 50 },
/// ];
///
/// let bounds = bounding_box(&diamond).unwrap();
///
/// assert_eq!(bounds.x, 10);
/// assert_eq!(bounds.y, 10);
/// assert_eq!(bounds.width, 80);
/// assert_eq!(bounds.height, 80);
/// ```
pub fn bounding_box<T>(vertices: &[Point<T>]) -> Option<Rect>
where
    T: Copy + PartialOrd + Num + ToPrimitive,
{
    let (first, rest) = vertices.split_first()?;
    let mut min_x = first.x;
    let mut max_x = first.x;
    let mut min_y = first.y;
    let mut max_y = first.y;

    // `T` is only `PartialOrd`, so float coordinates are supported too.
    for p in rest {
        if p.x < min_x {
            min_x = p.x;
        }
        if p.x > max_x {
            max_x = p.x;
        }
        if p.y < min_y {
            min_y = p.y;
        }
        if p.y > max_y {
            max_y = p.y;
        }
    }

    let x = min_x.to_u32().unwrap_or(0);
    let y = min_y.to_u32().unwrap_or(0);

    let width = max_x.to_u32().unwrap_or(0).saturating_sub(x);
    let height = max_y.to_u32().unwrap_or(0).saturating_sub(y);

    Some(Rect {
        x,
        y,
        width,
        height,
    })
}
