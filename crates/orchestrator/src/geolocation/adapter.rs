#![forbid(unsafe_code)]

use super::source::{Fix, FixReceiver, PermissionState, PositionError, PositionOptions};
use super::{LocationError, PositionSource};
use crate::clock::Clock;
use kernel::UserLocation;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Slack added on top of the platform timeout before a request is abandoned.
pub const TIMEOUT_GRACE: Duration = Duration::from_secs(1);

/// Minimum spacing between forwarded watch updates.
pub const WATCH_THROTTLE: Duration = Duration::from_secs(5);

/// Result of a one-shot location request.
///
/// The request never fails: when neither accuracy tier yields a fix the
/// location is the fixed fallback point and `fallback_reason` says why.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationFix {
    pub location: UserLocation,
    pub fallback_reason: Option<LocationError>,
}

impl LocationFix {
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportStatus {
    pub supported: bool,
    pub permitted: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WatchEvent {
    Update(UserLocation),
    Error(LocationError),
}

/// Handle to a running location watch. Dropping it stops the watch.
#[derive(Debug)]
pub struct LocationWatch {
    events: flume::Receiver<WatchEvent>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl LocationWatch {
    /// Next throttled event, or `None` once the watch has ended.
    pub async fn next(&self) -> Option<WatchEvent> {
        self.events.recv_async().await.ok()
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled() && !self.task.is_finished()
    }
}

impl Drop for LocationWatch {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Wraps a [`PositionSource`] with the request policy: accuracy fallback,
/// timeouts, throttled tracking and error translation.
#[derive(Clone)]
pub struct Geolocator {
    source: Arc<dyn PositionSource>,
    clock: Arc<dyn Clock>,
}

impl Geolocator {
    pub fn new(source: Arc<dyn PositionSource>, clock: Arc<dyn Clock>) -> Self {
        Self { source, clock }
    }

    pub fn is_supported(&self) -> bool {
        self.source.is_supported()
    }

    /// One-shot fix: high accuracy first, then normal accuracy, then the
    /// fixed fallback point.
    pub async fn current_location(&self) -> LocationFix {
        if !self.source.is_supported() {
            warn!("geolocation unsupported, using fallback location");
            return Self::fallback(LocationError::Unsupported);
        }

        let high = match self.attempt(PositionOptions::HIGH_ACCURACY).await {
            Ok(location) => {
                return LocationFix {
                    location,
                    fallback_reason: None,
                };
            }
            Err(err) => err,
        };
        warn!(error = ?high, "high accuracy location failed, retrying with normal accuracy");

        match self.attempt(PositionOptions::NORMAL).await {
            Ok(location) => LocationFix {
                location,
                fallback_reason: None,
            },
            Err(err) => {
                warn!(error = ?err, "all location attempts failed, using fallback location");
                Self::fallback(err.into())
            }
        }
    }

    async fn attempt(&self, options: PositionOptions) -> Result<UserLocation, PositionError> {
        let request = self.source.current_position(options);
        match tokio::time::timeout(options.timeout + TIMEOUT_GRACE, request).await {
            Ok(result) => result.map(Self::to_location),
            Err(_) => Err(PositionError::Timeout),
        }
    }

    fn fallback(reason: LocationError) -> LocationFix {
        LocationFix {
            location: UserLocation::fallback(),
            fallback_reason: Some(reason),
        }
    }

    fn to_location(fix: Fix) -> UserLocation {
        UserLocation {
            lat: fix.lat,
            lng: fix.lng,
            accuracy: fix.accuracy,
            timestamp: SystemTime::now(),
        }
    }

    /// Start continuous tracking. Updates are throttled to one per
    /// [`WATCH_THROTTLE`]; timeouts are dropped as noise and every other
    /// error is forwarded translated.
    ///
    /// Must be called from within a tokio runtime.
    pub fn watch_location(&self) -> Result<LocationWatch, LocationError> {
        if !self.source.is_supported() {
            return Err(LocationError::Unsupported);
        }
        let raw = self.source.watch_position(PositionOptions::WATCH)?;
        let (events_tx, events_rx) = flume::unbounded();
        let cancel = CancellationToken::new();
        let task = tokio::spawn(Self::forward(
            raw,
            events_tx,
            cancel.clone(),
            Arc::clone(&self.clock),
        ));
        debug!("location watch started");

        Ok(LocationWatch {
            events: events_rx,
            cancel,
            task,
        })
    }

    /// Cancel a watch. Stopping an already stopped watch does nothing.
    pub fn stop_watching(&self, watch: &LocationWatch) {
        if watch.is_active() {
            debug!("location watch stopped");
        }
        watch.stop();
    }

    async fn forward(
        raw: FixReceiver,
        events: flume::Sender<WatchEvent>,
        cancel: CancellationToken,
        clock: Arc<dyn Clock>,
    ) {
        let mut last_update = None;
        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => break,
                received = raw.recv_async() => received,
            };

            let event = match received {
                Err(_) => {
                    debug!("position source closed the watch");
                    break;
                }
                Ok(Ok(fix)) => {
                    let now = clock.now();
                    if let Some(last) = last_update
                        && now.duration_since(last) < WATCH_THROTTLE
                    {
                        trace!("throttled location update");
                        continue;
                    }
                    last_update = Some(now);
                    WatchEvent::Update(Self::to_location(fix))
                }
                Ok(Err(PositionError::Timeout)) => {
                    debug!("location watch timed out, ignoring");
                    continue;
                }
                Ok(Err(err)) => {
                    warn!(error = ?err, "location watch error");
                    WatchEvent::Error(err.into())
                }
            };

            if events.send(event).is_err() {
                break;
            }
        }
    }

    /// Probe capability and permission without prompting.
    pub async fn check_support(&self) -> SupportStatus {
        if !self.source.is_supported() {
            return SupportStatus {
                supported: false,
                permitted: false,
                message: LocationError::Unsupported.to_string(),
            };
        }

        match self.source.permission().await {
            Ok(state) => SupportStatus {
                supported: true,
                permitted: state == PermissionState::Granted,
                message: match state {
                    PermissionState::Granted => "Geolocation available",
                    PermissionState::Denied => "Location permission denied",
                    PermissionState::Prompt => "Location permission pending",
                }
                .to_string(),
            },
            Err(err) => {
                debug!(error = ?err, "permission query failed");
                SupportStatus {
                    supported: true,
                    permitted: false,
                    message: "Permissions API not available, try requesting a location".into(),
                }
            }
        }
    }
}

impl std::fmt::Debug for Geolocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Geolocator")
            .field("supported", &self.source.is_supported())
            .finish_non_exhaustive()
    }
}
