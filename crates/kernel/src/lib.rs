//! Domain model of the map engine: zones, markers, user locations and the
//! geometry that relates them.

pub mod catalog;
mod error;
pub mod geometry;
mod ids;
mod location;
mod marker;
mod zone;

pub use catalog::Catalog;
pub use error::Error;
pub use ids::{MarkerId, ZoneId};
pub use location::{DEFAULT_LAT, DEFAULT_LNG, LngLat, MapBounds, UserLocation};
pub use marker::{Marker, MarkerMetadata};
pub use zone::Zone;
