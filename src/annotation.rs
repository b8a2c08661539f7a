//! Polygon annotations in normalized, image-relative coordinates and their
//! line-oriented text representation.
//!
//! One line per polygon:
//!
//! ```text
//! <class_id> <x1> <y1> <x2> <y2> ... <xn> <yn>
//! ```
//!
//! Coordinates are fractions of the image width (x) and height (y), written
//! with [`COORDINATE_PRECISION`] decimals. An empty text is a record with no
//! entries.

use std::fmt;
use std::str::FromStr;

use image::math::Rect;
use imageproc::point::Point;
use tracing::warn;

use crate::error::{Error, LineError, Result};
use crate::rasterize::denormalize;
use crate::rect::bounding_box;

/// The only class id emitted by the extractor and accepted by the rasterizer
/// with default options.
pub const FOREGROUND_CLASS: u32 = 0;

/// Decimal digits written per coordinate.
pub const COORDINATE_PRECISION: usize = 6;

/// A closed polygon boundary. The last point connects back to the first; an
/// explicit repeat of the first point at the end is tolerated.
pub type Ring = Vec<Point<f64>>;

/// A single polygon tagged with its semantic class.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub class_id: u32,
    pub ring: Ring,
}

impl Polygon {
    pub fn new(class_id: u32, ring: Ring) -> Self {
        Self { class_id, ring }
    }

    /// A ring with fewer than three points encloses no area.
    pub fn is_degenerate(&self) -> bool {
        self.ring.len() < 3
    }

    /// Returns `true` when every coordinate lies in the closed unit interval.
    pub fn is_in_range(&self) -> bool {
        self.ring
            .iter()
            .all(|p| (0.0..=1.0).contains(&p.x) && (0.0..=1.0).contains(&p.y))
    }

    /// Maps the ring onto a `height` x `width` pixel grid using the
    /// rasterizer's rounding and clamping convention.
    pub fn pixel_ring(&self, height: u32, width: u32) -> Vec<Point<i32>> {
        self.ring
            .iter()
            .map(|p| Point::new(denormalize(p.x, width), denormalize(p.y, height)))
            .collect()
    }

    /// Axis-aligned bounds of the ring's pixel vertices, for callers that need
    /// a box annotation alongside the polygon. The rasterizer uses the same
    /// bounds to limit the rows it scans.
    ///
    /// Returns `None` for an empty ring.
    pub fn pixel_bounds(&self, height: u32, width: u32) -> Option<Rect> {
        bounding_box(&self.pixel_ring(height, width))
    }
}

/// One entry of an [`AnnotationRecord`].
///
/// Only polygons exist today. Instance ids or other shape kinds can be added
/// as new variants without changing how existing lines are read or written.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Annotation {
    Polygon(Polygon),
}

impl Annotation {
    pub fn class_id(&self) -> u32 {
        match self {
            Annotation::Polygon(polygon) => polygon.class_id,
        }
    }

    pub fn ring(&self) -> &[Point<f64>] {
        match self {
            Annotation::Polygon(polygon) => &polygon.ring,
        }
    }

    pub fn as_polygon(&self) -> &Polygon {
        match self {
            Annotation::Polygon(polygon) => polygon,
        }
    }
}

impl From<Polygon> for Annotation {
    fn from(polygon: Polygon) -> Self {
        Annotation::Polygon(polygon)
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class_id())?;
        for p in self.ring() {
            write!(
                f,
                " {:.prec$} {:.prec$}",
                p.x,
                p.y,
                prec = COORDINATE_PRECISION
            )?;
        }
        Ok(())
    }
}

/// Parses a single annotation line.
///
/// Blank lines yield `Ok(None)`. A line holding only a class id is an entry
/// with an empty ring.
pub fn parse_line(line: &str) -> Result<Option<Annotation>, LineError> {
    let mut fields = line.split_whitespace();
    let Some(class_field) = fields.next() else {
        return Ok(None);
    };

    let class_id = class_field
        .parse::<u32>()
        .map_err(|_| LineError::InvalidClassId(class_field.to_owned()))?;

    let coordinates = fields
        .map(|field| match field.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(LineError::InvalidCoordinate(field.to_owned())),
        })
        .collect::<Result<Vec<f64>, LineError>>()?;

    if coordinates.len() % 2 != 0 {
        return Err(LineError::OddCoordinateCount(coordinates.len()));
    }

    let ring = coordinates
        .chunks_exact(2)
        .map(|xy| Point::new(xy[0], xy[1]))
        .collect();

    Ok(Some(Polygon::new(class_id, ring).into()))
}

/// An ordered collection of annotations belonging to one image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationRecord {
    entries: Vec<Annotation>,
}

impl AnnotationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, annotation: impl Into<Annotation>) {
        self.entries.push(annotation.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Annotation> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[Annotation] {
        &self.entries
    }

    /// Serializes the record, one line per entry, without a trailing newline.
    pub fn to_text(&self) -> String {
        self.to_string()
    }

    /// Parses `text`, skipping malformed lines instead of failing.
    ///
    /// Every skipped line is reported as an [`Error::MalformedAnnotationLine`]
    /// so a batch caller can log it and move on.
    pub fn parse_lenient(text: &str) -> (Self, Vec<Error>) {
        let mut record = Self::new();
        let mut errors = Vec::new();

        for (index, line) in text.lines().enumerate() {
            match parse_line(line) {
                Ok(Some(annotation)) => record.push(annotation),
                Ok(None) => {}
                Err(reason) => {
                    let error = reason.at_line(index + 1);
                    warn!(%error, "skipping annotation line");
                    errors.push(error);
                }
            }
        }

        (record, errors)
    }

    /// Indices of entries with at least one coordinate outside [0, 1].
    pub fn out_of_range(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, annotation)| !annotation.as_polygon().is_in_range())
            .map(|(index, _)| index)
            .collect()
    }
}

impl FromStr for AnnotationRecord {
    type Err = Error;

    /// Strict parse: the first malformed line aborts with its 1-based number.
    fn from_str(text: &str) -> Result<Self> {
        let mut record = Self::new();
        for (index, line) in text.lines().enumerate() {
            if let Some(annotation) = parse_line(line).map_err(|e| e.at_line(index + 1))? {
                record.push(annotation);
            }
        }
        Ok(record)
    }
}

impl fmt::Display for AnnotationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, annotation) in self.entries.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{annotation}")?;
        }
        Ok(())
    }
}

impl FromIterator<Annotation> for AnnotationRecord {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for AnnotationRecord {
    type Item = Annotation;
    type IntoIter = std::vec::IntoIter<Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a AnnotationRecord {
    type Item = &'a Annotation;
    type IntoIter = std::slice::Iter<'a, Annotation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::new(
            FOREGROUND_CLASS,
            vec![
                Point::new(0.1, 0.1),
                Point::new(0.1, 0.19),
                Point::new(0.19, 0.19),
                Point::new(0.19, 0.1),
            ],
        )
    }

    #[test]
    fn test_format_uses_fixed_precision() {
        let mut record = AnnotationRecord::new();
        record.push(square());
        assert_eq!(
            record.to_text(),
            "0 0.100000 0.100000 0.100000 0.190000 0.190000 0.190000 0.190000 0.100000"
        );
    }

    #[test]
    fn test_format_joins_lines_without_trailing_newline() {
        let record: AnnotationRecord = vec![
            Annotation::from(Polygon::new(0, vec![Point::new(0.5, 0.25)])),
            Annotation::from(Polygon::new(0, vec![Point::new(1.0, 0.0)])),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            record.to_text(),
            "0 0.500000 0.250000\n0 1.000000 0.000000"
        );
        assert_eq!(AnnotationRecord::new().to_text(), "");
    }

    #[test]
    fn test_parse_reads_back_formatted_text() {
        let mut record = AnnotationRecord::new();
        record.push(square());
        let parsed: AnnotationRecord = record.to_text().parse().unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_parse_skips_blank_lines_and_accepts_crlf() {
        let text = "\n0 0.1 0.2 0.3 0.4 0.5 0.6\r\n   \n0 0.7 0.8\n";
        let record: AnnotationRecord = text.parse().unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.entries()[0].ring().len(), 3);
        assert_eq!(record.entries()[1].ring(), &[Point::new(0.7, 0.8)]);
    }

    #[test]
    fn test_parse_empty_text_is_empty_record() {
        let record: AnnotationRecord = "".parse().unwrap();
        assert!(record.is_empty());
    }

    #[test]
    fn test_class_only_line_is_empty_ring() {
        let annotation = parse_line("3").unwrap().unwrap();
        assert_eq!(annotation.class_id(), 3);
        assert!(annotation.ring().is_empty());
    }

    #[test]
    fn test_parse_line_errors() {
        assert_eq!(
            parse_line("0 0.1 0.2 0.3"),
            Err(LineError::OddCoordinateCount(3))
        );
        assert_eq!(
            parse_line("1.5 0.1 0.2"),
            Err(LineError::InvalidClassId("1.5".to_owned()))
        );
        assert_eq!(
            parse_line("-1 0.1 0.2"),
            Err(LineError::InvalidClassId("-1".to_owned()))
        );
        assert_eq!(
            parse_line("0 0.1 abc"),
            Err(LineError::InvalidCoordinate("abc".to_owned()))
        );
        assert_eq!(
            parse_line("0 NaN 0.2"),
            Err(LineError::InvalidCoordinate("NaN".to_owned()))
        );
        assert_eq!(
            parse_line("0 inf 0.2"),
            Err(LineError::InvalidCoordinate("inf".to_owned()))
        );
    }

    #[test]
    fn test_strict_parse_reports_line_number() {
        let text = "0 0.1 0.1 0.2 0.2 0.3 0.1\n\n0 0.1\n";
        let err = text.parse::<AnnotationRecord>().unwrap_err();
        assert_eq!(
            err,
            Error::MalformedAnnotationLine {
                line: 3,
                reason: LineError::OddCoordinateCount(1),
            }
        );
    }

    #[test]
    fn test_lenient_parse_keeps_good_lines() {
        let text = "0 0.1 0.1 0.2 0.2 0.3 0.1\nx 0.1 0.1\n0 0.5 0.5 0.6 0.6 0.7 0.5";
        let (record, errors) = AnnotationRecord::parse_lenient(text);
        assert_eq!(record.len(), 2);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            Error::MalformedAnnotationLine { line: 2, .. }
        ));
    }

    #[test]
    fn test_out_of_range_entries() {
        let mut record = AnnotationRecord::new();
        record.push(square());
        record.push(Polygon::new(0, vec![Point::new(1.0000001, 0.5)]));
        record.push(Polygon::new(0, vec![Point::new(0.0, 1.0)]));
        record.push(Polygon::new(0, vec![Point::new(0.2, -0.01)]));
        assert_eq!(record.out_of_range(), vec![1, 3]);
    }

    #[test]
    fn test_pixel_ring_and_bounds() {
        let polygon = square();
        assert_eq!(
            polygon.pixel_ring(100, 100),
            vec![
                Point::new(10, 10),
                Point::new(10, 19),
                Point::new(19, 19),
                Point::new(19, 10),
            ]
        );
        let bounds = polygon.pixel_bounds(100, 200).unwrap();
        assert_eq!((bounds.x, bounds.y), (20, 10));
        assert_eq!((bounds.width, bounds.height), (18, 9));
        assert!(Polygon::new(0, vec![]).pixel_bounds(10, 10).is_none());
    }

    #[test]
    fn test_degenerate_polygon() {
        assert!(Polygon::new(0, vec![Point::new(0.0, 0.0), Point::new(0.5, 0.5)]).is_degenerate());
        assert!(!square().is_degenerate());
    }
}
