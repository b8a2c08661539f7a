use image::{GrayImage, imageops::replace};
use imageproc::{
    contours::{BorderType, Contour, find_contours},
    point::Point,
};
use num_traits::{AsPrimitive, Num, NumCast};

/// Traces the outermost boundaries of the foreground (non-zero) regions of a
/// binary image.
///
/// The image frame counts as background: the indicator is traced inside a one
/// pixel background border, so regions touching the image edge are ordinary
/// outer borders. Hole borders are dropped, and so are the outer borders of
/// components that sit inside another component's hole: the enclosing ring
/// already covers them. Contours are returned in raster scan order of their
/// first pixel, each listing its boundary pixels in trace order, in the
/// coordinates of `indicator`.
pub fn external_contours(indicator: &GrayImage) -> Vec<Contour<i32>> {
    let (width, height) = indicator.dimensions();
    let mut padded = GrayImage::new(width + 2, height + 2);
    replace(&mut padded, indicator, 1, 1);

    let mut contours = find_contours::<i32>(&padded);

    contours
        .retain(|contour| contour.border_type == BorderType::Outer && contour.parent.is_none());

    for contour in &mut contours {
        for point in &mut contour.points {
            point.x -= 1;
            point.y -= 1;
        }
    }

    contours
}

/// Compresses a closed chain of 8-connected boundary pixels down to the points
/// where its direction changes.
///
/// Straight horizontal, vertical and diagonal runs collapse to their end points.
/// The chain is treated as closed, so the first point is kept only if the ring
/// turns there. Repeated points are dropped first, and chains left with fewer
/// than three points are returned as they are.
///
/// # Examples
///
/// ```
/// use imageproc::point::Point;
/// use mask_polygon_codec::contours::compress_chain;
///
/// let chain = [
///     Point::new(0, 0),
///     Point::new(1, 0),
///     Point::new(2, 0),
///     Point::new(2, 1),
///     Point::new(2, 2),
///     Point::new(1, 1),
/// ];
///
/// assert_eq!(
///     compress_chain(&chain),
///     vec![Point::new(0, 0), Point::new(2, 0), Point::new(2, 2)]
/// );
/// ```
pub fn compress_chain(points: &[Point<i32>]) -> Vec<Point<i32>> {
    let mut points = points.to_vec();
    points.dedup();
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    let n = points.len();
    if n < 3 {
        return points;
    }

    let step = |from: Point<i32>, to: Point<i32>| {
        ((to.x - from.x).signum(), (to.y - from.y).signum())
    };

    let corners: Vec<Point<i32>> = (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect();

    if corners.is_empty() { points } else { corners }
}

/// Calculates the length of a closed ring.
///
/// The perimeter is the sum of Euclidean distances between consecutive points,
/// closing the loop with the distance between the last and first point. Rings
/// with 0 or 1 point have a perimeter of `0.0`.
///
/// Works on pixel rings from [`external_contours`] as well as on normalized
/// rings, for callers that rank or filter extracted polygons by size.
pub fn perimeter<T>(points: &[Point<T>]) -> f64
where
    T: Num + NumCast + Copy + PartialEq + AsPrimitive<f64>,
{
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(p1, p2)| {
            let dx: f64 = p2.x.as_() - p1.x.as_();
            let dy: f64 = p2.y.as_() - p1.y.as_();
            dx.hypot(dy)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn assert_float_eq(a: f64, b: f64) {
        assert!(
            (a - b).abs() < 1e-9,
            "Assertion failed: expected {}, got {}",
            b,
            a
        );
    }

    fn filled(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            let inside = rects
                .iter()
                .any(|&(rx, ry, rw, rh)| x >= rx && x < rx + rw && y >= ry && y < ry + rh);
            Luma([inside as u8])
        })
    }

    #[test]
    fn test_external_contours_skip_holes() {
        // A 9x9 frame with a 3x3 hole.
        let mut image = filled(20, 20, &[(5, 5, 9, 9)]);
        for y in 8..11 {
            for x in 8..11 {
                image.put_pixel(x, y, Luma([0]));
            }
        }

        let all = find_contours::<i32>(&image);
        assert_eq!(all.len(), 2, "outer border plus hole border");

        let outer = external_contours(&image);
        assert_eq!(outer.len(), 1);
        assert_eq!(outer[0].border_type, BorderType::Outer);
    }

    #[test]
    fn test_external_contours_skip_islands_inside_holes() {
        // A frame with a hole and a single pixel island in the middle of the hole.
        let mut image = filled(20, 20, &[(2, 2, 15, 15)]);
        for y in 5..14 {
            for x in 5..14 {
                image.put_pixel(x, y, Luma([0]));
            }
        }
        image.put_pixel(9, 9, Luma([1]));

        let outer = external_contours(&image);
        assert_eq!(outer.len(), 1);
        assert!(outer[0].points.contains(&Point::new(2, 2)));
    }

    #[test]
    fn test_external_contours_scan_order() {
        let image = filled(30, 30, &[(20, 2, 3, 3), (2, 10, 3, 3), (10, 20, 3, 3)]);
        let outer = external_contours(&image);
        let starts: Vec<i32> = outer
            .iter()
            .map(|c| c.points.iter().map(|p| p.y).min().unwrap())
            .collect();
        assert_eq!(starts, vec![2, 10, 20]);
    }

    #[test]
    fn test_external_contours_regions_on_image_edges() {
        for (x, y) in [(0, 12), (0, 0), (12, 0), (25, 12), (12, 25), (25, 25)] {
            let image = filled(30, 30, &[(x, y, 5, 5)]);
            let outer = external_contours(&image);
            assert_eq!(outer.len(), 1, "region at ({x}, {y})");
            assert_eq!(outer[0].border_type, BorderType::Outer);
            assert!(outer[0].points.contains(&Point::new(x as i32, y as i32)));
            assert!(
                outer[0]
                    .points
                    .iter()
                    .all(|p| (0..30).contains(&p.x) && (0..30).contains(&p.y))
            );
        }
    }

    #[test]
    fn test_external_contours_full_frame() {
        let image = filled(10, 10, &[(0, 0, 10, 10)]);
        let outer = external_contours(&image);
        assert_eq!(outer.len(), 1);

        let mut corners = compress_chain(&outer[0].points);
        corners.sort_by_key(|p| (p.y, p.x));
        assert_eq!(
            corners,
            vec![
                Point::new(0, 0),
                Point::new(9, 0),
                Point::new(0, 9),
                Point::new(9, 9),
            ]
        );
    }

    #[test]
    fn test_external_contours_frame_touching_edges_keeps_hole_out() {
        // A frame filling the whole image around a hole with an island.
        let mut image = filled(20, 20, &[(0, 0, 20, 20)]);
        for y in 5..15 {
            for x in 5..15 {
                image.put_pixel(x, y, Luma([0]));
            }
        }
        image.put_pixel(9, 9, Luma([1]));

        let outer = external_contours(&image);
        assert_eq!(outer.len(), 1);
        assert!(outer[0].points.contains(&Point::new(0, 0)));
        assert!(!outer[0].points.contains(&Point::new(9, 9)));
    }

    #[test]
    fn test_compress_chain_square() {
        let image = filled(30, 30, &[(10, 10, 10, 10)]);
        let outer = external_contours(&image);
        assert_eq!(outer.len(), 1);

        let mut corners = compress_chain(&outer[0].points);
        corners.sort_by_key(|p| (p.y, p.x));
        assert_eq!(
            corners,
            vec![
                Point::new(10, 10),
                Point::new(19, 10),
                Point::new(10, 19),
                Point::new(19, 19),
            ]
        );
    }

    #[test]
    fn test_compress_chain_keeps_short_chains() {
        let single = [Point::new(3, 3)];
        assert_eq!(compress_chain(&single), single.to_vec());

        let pair = [Point::new(3, 3), Point::new(4, 3)];
        assert_eq!(compress_chain(&pair), pair.to_vec());
    }

    #[test]
    fn test_compress_chain_back_and_forth_line() {
        // The trace of a one pixel thick horizontal line walks out and back.
        let chain = [
            Point::new(0, 0),
            Point::new(1, 0),
            Point::new(2, 0),
            Point::new(1, 0),
        ];
        assert_eq!(
            compress_chain(&chain),
            vec![Point::new(0, 0), Point::new(2, 0)]
        );
    }

    #[test]
    fn test_perimeter() {
        let square = [
            Point::new(0, 0),
            Point::new(10, 0),
            Point::new(10, 10),
            Point::new(0, 10),
        ];
        assert_float_eq(perimeter(&square), 40.0);

        let triangle = [Point::new(0.0, 0.0), Point::new(3.0, 0.0), Point::new(0.0, 4.0)];
        assert_float_eq(perimeter(&triangle), 12.0);

        // Out and back.
        assert_float_eq(perimeter(&[Point::new(0, 0), Point::new(10, 0)]), 20.0);

        assert_float_eq(perimeter(&[Point::new(100, 100)]), 0.0);
        assert_float_eq(perimeter::<i32>(&[]), 0.0);
    }
}
