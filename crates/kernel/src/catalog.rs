use crate::error::Error;
use crate::marker::Marker;
use crate::zone::Zone;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

const BUILTIN: &str = include_str!("../data/cancun.toml");

/// Static set of zones and markers a repository serves from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub zones: Vec<Zone>,
    pub markers: Vec<Marker>,
}

impl Catalog {
    pub fn new(zones: Vec<Zone>, markers: Vec<Marker>) -> Result<Self, Error> {
        let catalog = Self { zones, markers };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The catalog bundled with the crate: a handful of places in Cancún.
    pub fn builtin() -> Result<Self, Error> {
        Self::from_toml_str(BUILTIN)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::CatalogRead {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_toml_str(&contents)?;
        debug!(
            path = %path.display(),
            zones = catalog.zones.len(),
            markers = catalog.markers.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        let catalog: Self = toml_edit::de::from_str(contents)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Reject duplicate ids, malformed rings and out-of-range ratings.
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(id) = self.markers.iter().map(|m| m.id).duplicates().next() {
            return Err(Error::DuplicateMarker(id));
        }
        if let Some(id) = self.zones.iter().map(|z| z.id).duplicates().next() {
            return Err(Error::DuplicateZone(id));
        }
        for zone in &self.zones {
            zone.validate()?;
        }
        for marker in &self.markers {
            if let Some(rating) = marker.rating
                && !(0.0..=5.0).contains(&rating)
            {
                return Err(Error::RatingOutOfRange {
                    marker: marker.id,
                    rating,
                });
            }
        }
        Ok(())
    }
}
