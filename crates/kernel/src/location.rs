use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Fixed reference point used when no real fix can be obtained (Cancún).
pub const DEFAULT_LAT: f64 = 21.1619;
pub const DEFAULT_LNG: f64 = -86.8515;

/// A `(lng, lat)` pair, the ordering used by polygon rings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<(f64, f64)> for LngLat {
    fn from((lng, lat): (f64, f64)) -> Self {
        Self { lng, lat }
    }
}

impl From<LngLat> for (f64, f64) {
    fn from(point: LngLat) -> Self {
        (point.lng, point.lat)
    }
}

/// Position fix of the user. Replaced wholesale on every update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UserLocation {
    pub lat: f64,
    pub lng: f64,
    /// Accuracy radius in meters, when the platform reports one.
    pub accuracy: Option<f64>,
    pub timestamp: SystemTime,
}

impl UserLocation {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            accuracy: None,
            timestamp: SystemTime::now(),
        }
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    pub fn fallback() -> Self {
        Self::new(DEFAULT_LAT, DEFAULT_LNG)
    }

    pub fn point(&self) -> LngLat {
        LngLat::new(self.lng, self.lat)
    }
}

/// Viewport rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}
