use image::ColorType;
use thiserror::Error;

/// Errors reported by the codec. Every failure is scoped to a single call
/// (one image, one annotation line) so batch callers can skip and continue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The input raster is not a single-channel 8-bit image.
    #[error("unsupported mask format {color:?}: expected single-channel 8-bit")]
    UnsupportedFormat { color: ColorType },

    /// An annotation references a class the rasterizer was not configured for.
    #[error("unsupported class id {class_id}")]
    UnsupportedClass { class_id: u32 },

    /// A target or scale dimension is zero.
    #[error("invalid size {height}x{width}: dimensions must be positive")]
    InvalidSize { height: u32, width: u32 },

    /// The rasterizer foreground value collides with the background value.
    #[error("foreground value must be non-zero")]
    InvalidForeground,

    /// One line of the annotation text format could not be parsed.
    #[error("malformed annotation on line {line}: {reason}")]
    MalformedAnnotationLine { line: usize, reason: LineError },

    /// Two rasters that must share (width, height) do not.
    #[error("dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Why a single annotation line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("odd number of coordinate fields ({0})")]
    OddCoordinateCount(usize),

    #[error("class id {0:?} is not a non-negative integer")]
    InvalidClassId(String),

    #[error("coordinate {0:?} is not a finite number")]
    InvalidCoordinate(String),
}

impl LineError {
    /// Attaches the 1-based line number the error was found on.
    pub fn at_line(self, line: usize) -> Error {
        Error::MalformedAnnotationLine { line, reason: self }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
