use crate::error::Error;
use crate::geometry::{centroid, point_in_polygon};
use crate::ids::ZoneId;
use crate::location::LngLat;
use config::ZoneKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    /// Closed ring of `(lng, lat)` pairs, first point repeated last.
    pub coordinates: Vec<LngLat>,
    #[serde(rename = "type")]
    pub kind: ZoneKind,
    #[serde(default)]
    pub description: String,
    /// 1 (lowest) to 5 (highest).
    #[serde(default = "default_security_level")]
    pub security_level: u8,
    /// 0 to 100.
    #[serde(default)]
    pub popularity_score: u8,
}

fn default_security_level() -> u8 {
    3
}

impl Zone {
    pub fn new(id: u32, name: impl Into<String>, kind: ZoneKind, coordinates: Vec<LngLat>) -> Self {
        Self {
            id: ZoneId(id),
            name: name.into(),
            coordinates,
            kind,
            description: String::new(),
            security_level: default_security_level(),
            popularity_score: 0,
        }
    }

    /// Axis-aligned rectangle ring, closed.
    pub fn rectangle(
        id: u32,
        name: impl Into<String>,
        kind: ZoneKind,
        (west, south): (f64, f64),
        (east, north): (f64, f64),
    ) -> Self {
        let ring = vec![
            LngLat::new(west, north),
            LngLat::new(east, north),
            LngLat::new(east, south),
            LngLat::new(west, south),
            LngLat::new(west, north),
        ];
        Self::new(id, name, kind, ring)
    }

    pub fn contains(&self, point: LngLat) -> bool {
        point_in_polygon(point, &self.coordinates)
    }

    pub fn center(&self) -> LngLat {
        centroid(&self.coordinates)
    }

    /// Check that the ring has at least four points and is closed, and that
    /// the scores are in range. Self-intersection is not detected.
    pub fn validate(&self) -> Result<(), Error> {
        if self.coordinates.len() < 4 {
            return Err(Error::RingTooShort {
                zone: self.id,
                points: self.coordinates.len(),
            });
        }
        if self.coordinates.first() != self.coordinates.last() {
            return Err(Error::RingNotClosed(self.id));
        }
        if !(1..=5).contains(&self.security_level) {
            return Err(Error::OutOfRange {
                zone: self.id,
                field: "security_level",
                value: self.security_level.into(),
            });
        }
        if self.popularity_score > 100 {
            return Err(Error::OutOfRange {
                zone: self.id,
                field: "popularity_score",
                value: self.popularity_score.into(),
            });
        }
        Ok(())
    }
}
