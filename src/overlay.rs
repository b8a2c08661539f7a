//! Visual checks of masks and annotations against their source images.

use image::{GrayImage, Rgb, RgbImage};
use tracing::debug;

use crate::annotation::AnnotationRecord;
use crate::colors::{OUTLINE_START_HUE, generate_contrasting_colors};
use crate::error::Result;
use crate::rasterize::stroke_ring;
use crate::resample::ensure_same_dimensions;

/// Tints every non-zero pixel of `mask` on a copy of `image`.
///
/// Each tinted channel becomes `(1 - alpha) * image + alpha * color`, with
/// `alpha` clamped to [0, 1]. Background pixels are left untouched.
///
/// # Errors
///
/// [`crate::Error::DimensionMismatch`] if the mask and image sizes differ.
///
/// # Examples
///
/// ```
/// use image::{GrayImage, Luma, Rgb, RgbImage};
/// use mask_polygon_codec::overlay::blend_mask;
///
/// let image = RgbImage::from_pixel(2, 1, Rgb([100, 100, 100]));
/// let mut mask = GrayImage::new(2, 1);
/// mask.put_pixel(1, 0, Luma([1]));
///
/// let blended = blend_mask(&image, &mask, Rgb([200, 0, 0]), 0.3).unwrap();
/// assert_eq!(blended.get_pixel(0, 0), &Rgb([100, 100, 100]));
/// assert_eq!(blended.get_pixel(1, 0), &Rgb([130, 70, 70]));
/// ```
pub fn blend_mask(
    image: &RgbImage,
    mask: &GrayImage,
    color: Rgb<u8>,
    alpha: f32,
) -> Result<RgbImage> {
    ensure_same_dimensions(image.dimensions(), mask.dimensions())?;

    let alpha = alpha.clamp(0.0, 1.0);
    let mut blended = image.clone();

    for (pixel, label) in blended.pixels_mut().zip(mask.pixels()) {
        if label[0] == 0 {
            continue;
        }
        for (channel, tint) in pixel.0.iter_mut().zip(color.0) {
            let mixed = (1.0 - alpha) * f32::from(*channel) + alpha * f32::from(tint);
            *channel = mixed.round() as u8;
        }
    }

    Ok(blended)
}

/// Strokes the outline of every annotation onto `canvas`, each in its own
/// color.
///
/// Coordinates are mapped to the canvas size with the rasterizer's rounding
/// and clamping, so outlines sit exactly on the boundary pixels a rasterized
/// mask would have. Degenerate rings are drawn as points or line segments.
pub fn draw_annotations(canvas: &mut RgbImage, record: &AnnotationRecord) {
    let (width, height) = canvas.dimensions();
    if width == 0 || height == 0 {
        return;
    }

    debug!(width, height, polygons = record.len(), "drawing annotation outlines");

    let colors = generate_contrasting_colors(record.len(), OUTLINE_START_HUE);
    for (annotation, color) in record.iter().zip(colors) {
        let vertices = annotation.as_polygon().pixel_ring(height, width);
        stroke_ring(canvas, &vertices, color);
    }
}
