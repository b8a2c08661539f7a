//! Polygon annotations to a binary occupancy mask.
//!
//! Pixel convention: a normalized coordinate `v` maps to `v * size`, rounded to
//! the nearest integer with exact halves rounded toward zero, then clamped to
//! `[0, size - 1]`. Ring vertices therefore land on pixel centers, which is
//! where the extractor places them.
//!
//! Fill convention: even-odd, evaluated on every pixel row with half-open edge
//! spans, followed by a stroke of every ring edge so boundary pixels are always
//! part of the polygon. Polygons are drawn in record order with one foreground
//! value, so overlaps resolve last-write-wins.

use image::{GrayImage, Luma};
use imageproc::{
    drawing::{Canvas, draw_line_segment_mut},
    point::Point,
};
use tracing::{debug, trace, warn};

use crate::annotation::{Annotation, AnnotationRecord, FOREGROUND_CLASS};
use crate::error::{Error, Result};
use crate::rect::bounding_box;

/// Pixel value written inside polygons by default.
pub const FOREGROUND_VALUE: u8 = 1;

/// Options for [`rasterize_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterizeOptions {
    /// The one class id this rasterizer accepts.
    pub class_id: u32,
    /// Value written inside polygons. Must be non-zero.
    pub foreground: u8,
}

impl Default for RasterizeOptions {
    fn default() -> Self {
        Self {
            class_id: FOREGROUND_CLASS,
            foreground: FOREGROUND_VALUE,
        }
    }
}

impl RasterizeOptions {
    pub fn with_class_id(mut self, class_id: u32) -> Self {
        self.class_id = class_id;
        self
    }

    pub fn with_foreground(mut self, foreground: u8) -> Self {
        self.foreground = foreground;
        self
    }
}

/// Rasterizes `record` into a `height` x `width` mask with default options.
///
/// See [`rasterize_with`].
pub fn rasterize(record: &AnnotationRecord, height: u32, width: u32) -> Result<GrayImage> {
    rasterize_with(record, height, width, RasterizeOptions::default())
}

/// Rasterizes `record` into a `height` x `width` mask.
///
/// Rings with fewer than three distinct vertices fill nothing. Coordinates
/// outside [0, 1] are clamped onto the raster edge and logged, not rejected.
///
/// # Errors
///
/// * [`Error::InvalidSize`] if either dimension is zero.
/// * [`Error::InvalidForeground`] if the foreground value is 0.
/// * [`Error::UnsupportedClass`] if any entry has a class id other than
///   `options.class_id`. The whole record is checked before drawing starts.
///
/// # Examples
///
/// ```
/// use mask_polygon_codec::{AnnotationRecord, rasterize};
///
/// let record: AnnotationRecord = "0 0.25 0.25 0.75 0.25 0.75 0.75 0.25 0.75".parse().unwrap();
/// let mask = rasterize(&record, 8, 8).unwrap();
///
/// assert_eq!(mask.get_pixel(2, 2)[0], 1);
/// assert_eq!(mask.get_pixel(6, 6)[0], 1);
/// assert_eq!(mask.get_pixel(7, 7)[0], 0);
/// ```
pub fn rasterize_with(
    record: &AnnotationRecord,
    height: u32,
    width: u32,
    options: RasterizeOptions,
) -> Result<GrayImage> {
    if height == 0 || width == 0 {
        return Err(Error::InvalidSize { height, width });
    }
    if options.foreground == 0 {
        return Err(Error::InvalidForeground);
    }
    if let Some(annotation) = record.iter().find(|a| a.class_id() != options.class_id) {
        return Err(Error::UnsupportedClass {
            class_id: annotation.class_id(),
        });
    }

    debug!(height, width, polygons = record.len(), "rasterizing");

    let mut mask = GrayImage::new(width, height);
    let color = Luma([options.foreground]);

    for (index, annotation) in record.iter().enumerate() {
        let vertices = pixel_vertices(annotation, height, width);
        if vertices.len() < 3 {
            trace!(index, vertices = vertices.len(), "skipping degenerate ring");
            continue;
        }

        if !annotation.as_polygon().is_in_range() {
            warn!(index, "ring has coordinates outside [0, 1], clamping to raster");
        }

        fill_even_odd(&mut mask, &vertices, color);
        stroke_ring(&mut mask, &vertices, color);
    }

    Ok(mask)
}

/// Maps a normalized coordinate onto a pixel index along an axis of `size`
/// pixels.
///
/// Rounds to nearest with exact halves rounded toward zero, then clamps to
/// `[0, size - 1]`. Non-finite input maps to 0.
///
/// ```
/// use mask_polygon_codec::rasterize::denormalize;
///
/// assert_eq!(denormalize(0.29, 100), 29);
/// assert_eq!(denormalize(0.375, 4), 1);
/// assert_eq!(denormalize(1.0, 100), 99);
/// assert_eq!(denormalize(-0.2, 100), 0);
/// ```
pub fn denormalize(value: f64, size: u32) -> i32 {
    let scaled = value * f64::from(size);
    if !scaled.is_finite() {
        return 0;
    }

    let nearest = if (scaled - scaled.trunc()).abs() == 0.5 {
        scaled.trunc()
    } else {
        scaled.round()
    };

    nearest.clamp(0.0, f64::from(size.saturating_sub(1))) as i32
}

/// Denormalized vertices of one entry, without a repeated closing point and
/// without consecutive duplicates.
fn pixel_vertices(annotation: &Annotation, height: u32, width: u32) -> Vec<Point<i32>> {
    let mut vertices = annotation.as_polygon().pixel_ring(height, width);
    vertices.dedup();
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    vertices
}

/// Fills the interior of a closed polygon with the even-odd rule.
///
/// Each row `y` collects the crossings of edges whose span `[y_lo, y_hi)`
/// contains it; horizontal edges contribute nothing. Pixels between each pair
/// of sorted crossings are set, both ends included.
fn fill_even_odd(mask: &mut GrayImage, vertices: &[Point<i32>], color: Luma<u8>) {
    let (width, height) = mask.dimensions();
    let max_x = width as i32 - 1;

    let Some(bounds) = bounding_box(vertices) else {
        return;
    };
    let y_min = bounds.y as i32;
    let y_max = (y_min + bounds.height as i32).min(height as i32 - 1);

    let mut crossings: Vec<f64> = Vec::with_capacity(vertices.len());
    for y in y_min..=y_max {
        crossings.clear();

        for (p0, p1) in vertices.iter().zip(vertices.iter().cycle().skip(1)) {
            if p0.y == p1.y {
                continue;
            }
            let (lo, hi) = if p0.y < p1.y { (p0, p1) } else { (p1, p0) };
            if y < lo.y || y >= hi.y {
                continue;
            }
            let t = f64::from(y - lo.y) / f64::from(hi.y - lo.y);
            crossings.push(f64::from(lo.x) + t * f64::from(hi.x - lo.x));
        }

        crossings.sort_unstable_by(f64::total_cmp);

        for span in crossings.chunks_exact(2) {
            let from = (span[0].ceil() as i32).max(0);
            let to = (span[1].floor() as i32).min(max_x);
            for x in from..=to {
                mask.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

/// Draws every edge of a closed ring, including the closing edge. A single
/// vertex draws one pixel.
pub(crate) fn stroke_ring<C>(canvas: &mut C, vertices: &[Point<i32>], color: C::Pixel)
where
    C: Canvas,
{
    for (start, end) in vertices.iter().zip(vertices.iter().cycle().skip(1)) {
        draw_line_segment_mut(
            canvas,
            (start.x as f32, start.y as f32),
            (end.x as f32, end.y as f32),
            color,
        );
    }
}
