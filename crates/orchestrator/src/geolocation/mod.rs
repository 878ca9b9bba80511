#![forbid(unsafe_code)]

mod adapter;
mod error;
mod source;

pub use adapter::{
    Geolocator, LocationFix, LocationWatch, SupportStatus, TIMEOUT_GRACE, WATCH_THROTTLE,
    WatchEvent,
};
pub use error::LocationError;
pub use source::{
    Fix, FixReceiver, PermissionState, PositionError, PositionOptions, PositionSource,
    ScriptedSource, UnsupportedSource,
};
