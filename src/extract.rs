//! Labeled mask to polygon annotations.

use std::ops::Deref;

use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use imageproc::point::Point;
use tracing::{debug, trace};

use crate::annotation::{AnnotationRecord, FOREGROUND_CLASS, Polygon};
use crate::contours::{compress_chain, external_contours, perimeter};
use crate::error::{Error, Result};

/// How many of the traced boundary pixels end up in a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainApproximation {
    /// Every boundary pixel, in trace order.
    Full,
    /// Only the points where the boundary changes direction.
    #[default]
    Simple,
}

/// Options for [`extract_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Class id written on every emitted polygon. Pixel values identify
    /// instances, not classes, so all polygons share this id.
    pub class_id: u32,
    pub approximation: ChainApproximation,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            class_id: FOREGROUND_CLASS,
            approximation: ChainApproximation::Simple,
        }
    }
}

impl ExtractOptions {
    pub fn with_class_id(mut self, class_id: u32) -> Self {
        self.class_id = class_id;
        self
    }

    pub fn with_approximation(mut self, approximation: ChainApproximation) -> Self {
        self.approximation = approximation;
        self
    }
}

/// Extracts polygon annotations from a labeled mask with default options.
///
/// See [`extract_with`].
pub fn extract(mask: &DynamicImage) -> Result<AnnotationRecord> {
    extract_with(mask, ExtractOptions::default())
}

/// Extracts polygon annotations from a labeled mask.
///
/// The mask must be a single-channel 8-bit image; anything else fails with
/// [`Error::UnsupportedFormat`]. Wider masks have to be narrowed by the caller
/// first, for example with [`narrow_luma16`].
///
/// # Examples
///
/// ```
/// use image::{DynamicImage, GrayImage, Luma};
/// use mask_polygon_codec::extract;
///
/// let mut mask = GrayImage::new(100, 100);
/// for y in 10..20 {
///     for x in 10..20 {
///         mask.put_pixel(x, y, Luma([1]));
///     }
/// }
///
/// let record = extract(&DynamicImage::ImageLuma8(mask)).unwrap();
/// assert_eq!(record.len(), 1);
/// assert_eq!(record.entries()[0].ring().len(), 4);
/// ```
pub fn extract_with(mask: &DynamicImage, options: ExtractOptions) -> Result<AnnotationRecord> {
    match mask {
        DynamicImage::ImageLuma8(gray) => Ok(extract_gray(gray, options)),
        other => Err(Error::UnsupportedFormat {
            color: other.color(),
        }),
    }
}

/// Extracts polygon annotations from an 8-bit labeled mask.
///
/// Every distinct non-zero pixel value is treated as one label. Labels are
/// processed in ascending order; for each label the outer boundaries of its
/// connected regions are traced in raster scan order. Coordinates are divided
/// by the mask's own width and height. Holes are not represented and small
/// regions may trace to rings of one or two points.
pub fn extract_gray(mask: &GrayImage, options: ExtractOptions) -> AnnotationRecord {
    let (width, height) = mask.dimensions();
    let mut record = AnnotationRecord::new();
    if width == 0 || height == 0 {
        return record;
    }

    let labels = distinct_labels(mask);
    debug!(width, height, labels = labels.len(), "extracting polygons");

    let (w, h) = (f64::from(width), f64::from(height));
    for label in labels {
        let indicator = GrayImage::from_fn(width, height, |x, y| {
            Luma([u8::from(mask.get_pixel(x, y)[0] == label)])
        });

        for contour in external_contours(&indicator) {
            let points = match options.approximation {
                ChainApproximation::Full => contour.points,
                ChainApproximation::Simple => compress_chain(&contour.points),
            };
            trace!(
                label,
                points = points.len(),
                perimeter = perimeter(&points),
                "traced boundary"
            );

            let ring = points
                .iter()
                .map(|p| Point::new(f64::from(p.x) / w, f64::from(p.y) / h))
                .collect();
            record.push(Polygon::new(options.class_id, ring));
        }
    }

    debug!(polygons = record.len(), "extraction finished");
    record
}

/// Non-zero pixel values present in `mask`, ascending.
fn distinct_labels(mask: &GrayImage) -> Vec<u8> {
    let mut seen = [false; 256];
    for pixel in mask.pixels() {
        seen[usize::from(pixel[0])] = true;
    }
    (1..=u8::MAX).filter(|&v| seen[usize::from(v)]).collect()
}

/// Narrows a 16-bit mask to 8 bits by keeping the high byte (`value / 256`).
///
/// Labels that differ only in their low byte merge, and labels below 256
/// become background. Callers that need the narrowed mask anyway must opt in
/// by calling this explicitly; [`extract`] never narrows on its own.
pub fn narrow_luma16<C>(mask: &ImageBuffer<Luma<u16>, C>) -> GrayImage
where
    C: Deref<Target = [u16]>,
{
    let (width, height) = mask.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        Luma([(mask.get_pixel(x, y)[0] >> 8) as u8])
    })
}
