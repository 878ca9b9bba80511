#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Duration;

#[serde_as]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProximitySettings {
    /// Radius in meters within which a marker counts as nearby.
    pub nearby_radius: f64,

    /// Radius in meters around the user worth loading data for.
    pub load_radius: f64,

    /// Interval between automatic nearby refreshes. Zero disables it.
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub auto_refresh_interval: Duration,
}

impl Default for ProximitySettings {
    fn default() -> Self {
        Self {
            nearby_radius: 1000.0,
            load_radius: 5000.0,
            auto_refresh_interval: Duration::from_secs(30),
        }
    }
}

/// Partial update merged over the current settings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProximityUpdate {
    pub nearby_radius: Option<f64>,
    pub load_radius: Option<f64>,
    pub auto_refresh_interval: Option<Duration>,
}

impl ProximitySettings {
    pub fn merge(self, update: ProximityUpdate) -> Self {
        Self {
            nearby_radius: update.nearby_radius.unwrap_or(self.nearby_radius),
            load_radius: update.load_radius.unwrap_or(self.load_radius),
            auto_refresh_interval: update
                .auto_refresh_interval
                .unwrap_or(self.auto_refresh_interval),
        }
    }
}
