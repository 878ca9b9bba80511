use crate::ids::{MarkerId, ZoneId};
use std::path::PathBuf;

/// Represents all possible errors that can occur in this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A zone ring has fewer than four points.
    #[error("{zone} ring has {points} points, at least 4 are required")]
    RingTooShort { zone: ZoneId, points: usize },

    /// A zone ring does not end on its first point.
    #[error("{0} ring is not closed")]
    RingNotClosed(ZoneId),

    /// A bounded zone attribute is outside its range.
    #[error("{zone} {field} out of range: {value}")]
    OutOfRange {
        zone: ZoneId,
        field: &'static str,
        value: u32,
    },

    /// A marker rating is outside `0..=5`.
    #[error("{marker} rating out of range: {rating}")]
    RatingOutOfRange { marker: MarkerId, rating: f32 },

    #[error("duplicate marker id: {0}")]
    DuplicateMarker(MarkerId),

    #[error("duplicate zone id: {0}")]
    DuplicateZone(ZoneId),

    /// Error occurred while reading a catalog file.
    #[error("Failed to read catalog {path}: {source}")]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog document could not be deserialized.
    #[error("Failed to parse catalog: {0}")]
    CatalogParse(#[from] toml_edit::de::Error),
}
