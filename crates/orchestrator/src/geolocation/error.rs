#![forbid(unsafe_code)]

use super::PositionError;

/// Location failure as shown to users. Raw platform errors are translated
/// into this at the adapter boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied. Enable location access in your settings.")]
    PermissionDenied,

    #[error("Location unavailable. Check your GPS or Wi-Fi connection.")]
    PositionUnavailable,

    #[error("Timed out waiting for a location. The GPS signal may be weak.")]
    Timeout,

    #[error("Geolocation is not supported on this platform.")]
    Unsupported,

    #[error("Unknown error while obtaining the location.")]
    Unknown,
}

impl From<PositionError> for LocationError {
    fn from(err: PositionError) -> Self {
        match err {
            PositionError::PermissionDenied => LocationError::PermissionDenied,
            PositionError::PositionUnavailable => LocationError::PositionUnavailable,
            PositionError::Timeout => LocationError::Timeout,
            PositionError::Unsupported => LocationError::Unsupported,
            PositionError::Other(_) => LocationError::Unknown,
        }
    }
}

impl LocationError {
    /// Errors after which continuous tracking cannot recover on its own.
    pub fn is_persistent(&self) -> bool {
        matches!(self, LocationError::PermissionDenied | LocationError::Unsupported)
    }
}
