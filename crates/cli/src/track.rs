use crate::error::Error;
use orchestrator::geolocation::{Fix, PositionError, WATCH_THROTTLE};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, trace};

/// A recorded position, delivered `delay_ms` after the previous one.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrackPoint {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_delay_ms() -> u64 {
    u64::try_from(WATCH_THROTTLE.as_millis()).unwrap_or(u64::MAX)
}

impl TrackPoint {
    pub fn fix(&self) -> Fix {
        let fix = Fix::new(self.lat, self.lng);
        match self.accuracy {
            Some(accuracy) => fix.with_accuracy(accuracy),
            None => fix,
        }
    }
}

/// ```toml
/// [[points]]
/// lat = 21.1619
/// lng = -86.8515
/// accuracy = 12.0
/// delay_ms = 6000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub points: Vec<TrackPoint>,
}

impl Track {
    pub fn load(path: &Path) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::TrackRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        Ok(toml_edit::de::from_str(contents)?)
    }

    pub fn first(&self) -> Option<&TrackPoint> {
        self.points.first()
    }

    /// Push every point into `feed`, honoring the delays. Stops early when
    /// the receiving side is gone.
    pub async fn replay(self, feed: flume::Sender<Result<Fix, PositionError>>) {
        for (index, point) in self.points.into_iter().enumerate() {
            tokio::time::sleep(Duration::from_millis(point.delay_ms)).await;
            trace!(index, lat = point.lat, lng = point.lng, "replaying fix");
            if feed.send_async(Ok(point.fix())).await.is_err() {
                debug!("location watch gone, replay stopped");
                return;
            }
        }
        debug!("track replay finished");
    }
}
