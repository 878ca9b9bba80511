//! Map state and proximity engine.
//!
//! [`MapEngine`] owns the map state and talks to the outside world through
//! a [`MapRepository`], a [`Geolocator`] and a [`PreferencesRepository`].
//! The reveal and render modules consume state snapshots and never mutate
//! the engine directly.

pub mod clock;
pub mod engine;
pub mod error;
pub mod geolocation;
pub mod persistence;
pub mod render;
pub mod repository;
pub mod reveal;
pub mod state;

pub use clock::{Clock, SystemClock};
pub use engine::{ControlEvent, MapEngine, Services};
pub use error::Error;
pub use geolocation::{Geolocator, LocationError, LocationFix, PositionSource};
pub use persistence::{NoopPreferences, PreferencesRepository, TomlPreferences};
pub use repository::{InMemoryRepository, MapData, MapRepository};
pub use state::{LoadOutcome, MapState, Session};
