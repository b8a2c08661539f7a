//! Conversion between labeled instance-segmentation masks and polygon
//! annotations in normalized, image-relative coordinates.
//!
//! [`extract`] traces the outer boundary of every labeled region of an 8-bit
//! mask into an [`AnnotationRecord`]; [`rasterize`] fills such a record back
//! into a binary occupancy mask of a requested size. Both are pure functions
//! of their inputs and can run in parallel across images without coordination.
//! Reading and writing files stays with the caller; [`AnnotationRecord`]
//! parses and prints the line-oriented text format.
//!
//! The [`overlay`] and [`resample`] modules hold the small helpers a dataset
//! pipeline needs around the codec: mask overlays for visual checks,
//! nearest-neighbour mask upscaling and image/mask size checks.

mod colors;
pub mod annotation;
pub mod contours;
pub mod error;
pub mod extract;
pub mod overlay;
pub mod rasterize;
pub mod rect;
pub mod resample;

pub use annotation::{
    Annotation, AnnotationRecord, COORDINATE_PRECISION, FOREGROUND_CLASS, Polygon, Ring,
    parse_line,
};
pub use error::{Error, LineError, Result};
pub use extract::{ChainApproximation, ExtractOptions, extract, extract_gray, extract_with};
pub use rasterize::{FOREGROUND_VALUE, RasterizeOptions, rasterize, rasterize_with};
