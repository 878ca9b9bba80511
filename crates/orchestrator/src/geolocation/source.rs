#![forbid(unsafe_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

/// Request parameters forwarded to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached fix the platform may answer with.
    pub maximum_age: Duration,
}

impl PositionOptions {
    pub const HIGH_ACCURACY: Self = Self {
        high_accuracy: true,
        timeout: Duration::from_secs(15),
        maximum_age: Duration::ZERO,
    };

    pub const NORMAL: Self = Self {
        high_accuracy: false,
        timeout: Duration::from_secs(10),
        maximum_age: Duration::from_secs(30),
    };

    pub const WATCH: Self = Self {
        high_accuracy: false,
        timeout: Duration::from_secs(20),
        maximum_age: Duration::from_secs(10),
    };
}

/// Raw position reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    pub lat: f64,
    pub lng: f64,
    pub accuracy: Option<f64>,
}

impl Fix {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            accuracy: None,
        }
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }
}

/// Raw platform error. Never leaves the geolocation module untranslated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    Unsupported,
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
}

pub type FixReceiver = flume::Receiver<Result<Fix, PositionError>>;

/// Platform location primitives.
#[async_trait]
pub trait PositionSource: Send + Sync {
    fn is_supported(&self) -> bool;

    /// Query the permission state without prompting the user.
    async fn permission(&self) -> Result<PermissionState, PositionError>;

    /// One-shot position request.
    async fn current_position(&self, options: PositionOptions) -> Result<Fix, PositionError>;

    /// Register continuous tracking. Fixes and errors arrive on the returned
    /// channel until it is dropped.
    fn watch_position(&self, options: PositionOptions) -> Result<FixReceiver, PositionError>;
}

/// Platform without any location capability.
#[derive(Debug, Default)]
pub struct UnsupportedSource;

#[async_trait]
impl PositionSource for UnsupportedSource {
    fn is_supported(&self) -> bool {
        false
    }

    async fn permission(&self) -> Result<PermissionState, PositionError> {
        Err(PositionError::Unsupported)
    }

    async fn current_position(&self, _options: PositionOptions) -> Result<Fix, PositionError> {
        Err(PositionError::Unsupported)
    }

    fn watch_position(&self, _options: PositionOptions) -> Result<FixReceiver, PositionError> {
        Err(PositionError::Unsupported)
    }
}

/// Source answering from a prepared script: a queue of one-shot responses
/// and a feed of watch events pushed through [`ScriptedSource::feed`].
/// When the one-shot queue runs dry, `current_position` reports the
/// position as unavailable.
#[derive(Debug)]
pub struct ScriptedSource {
    current: Mutex<VecDeque<Result<Fix, PositionError>>>,
    permission: Result<PermissionState, PositionError>,
    feed_tx: flume::Sender<Result<Fix, PositionError>>,
    feed_rx: FixReceiver,
    requests: Mutex<Vec<PositionOptions>>,
}

impl Default for ScriptedSource {
    fn default() -> Self {
        let (feed_tx, feed_rx) = flume::unbounded();
        Self {
            current: Mutex::new(VecDeque::new()),
            permission: Ok(PermissionState::Granted),
            feed_tx,
            feed_rx,
            requests: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the answer for the next one-shot request.
    pub fn respond(self, response: Result<Fix, PositionError>) -> Self {
        self.current.lock().push_back(response);
        self
    }

    pub fn with_permission(mut self, permission: Result<PermissionState, PositionError>) -> Self {
        self.permission = permission;
        self
    }

    /// Sender for events delivered to active watches.
    pub fn feed(&self) -> flume::Sender<Result<Fix, PositionError>> {
        self.feed_tx.clone()
    }

    /// Options of every one-shot request seen so far, in order.
    pub fn requests(&self) -> Vec<PositionOptions> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl PositionSource for ScriptedSource {
    fn is_supported(&self) -> bool {
        true
    }

    async fn permission(&self) -> Result<PermissionState, PositionError> {
        self.permission.clone()
    }

    async fn current_position(&self, options: PositionOptions) -> Result<Fix, PositionError> {
        self.requests.lock().push(options);
        let next = self.current.lock().pop_front();
        next.unwrap_or(Err(PositionError::PositionUnavailable))
    }

    fn watch_position(&self, _options: PositionOptions) -> Result<FixReceiver, PositionError> {
        Ok(self.feed_rx.clone())
    }
}
