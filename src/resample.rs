//! Mask resizing and image/mask size checks.

use image::GrayImage;
use tracing::debug;

use crate::error::{Error, Result};

/// Upscales a labeled mask by an integer `factor` with nearest-neighbour
/// sampling.
///
/// Every source pixel becomes a `factor` x `factor` block, so label values are
/// copied and never blended.
///
/// # Errors
///
/// [`Error::InvalidSize`] if `factor` is zero or the result would not fit in
/// `u32` dimensions.
pub fn upscale_mask(mask: &GrayImage, factor: u32) -> Result<GrayImage> {
    let (width, height) = mask.dimensions();
    let scaled = width
        .checked_mul(factor)
        .zip(height.checked_mul(factor))
        .filter(|_| factor > 0);
    let Some((new_width, new_height)) = scaled else {
        return Err(Error::InvalidSize {
            height: height.saturating_mul(factor),
            width: width.saturating_mul(factor),
        });
    };

    debug!(width, height, factor, "upscaling mask");
    Ok(GrayImage::from_fn(new_width, new_height, |x, y| {
        *mask.get_pixel(x / factor, y / factor)
    }))
}

/// Fails with [`Error::DimensionMismatch`] unless both `(width, height)` pairs
/// are equal.
pub fn ensure_same_dimensions(expected: (u32, u32), actual: (u32, u32)) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::DimensionMismatch { expected, actual })
    }
}
