#![forbid(unsafe_code)]

use crate::error::Error;
use async_trait::async_trait;
use config::MapFilters;
use kernel::{MapBounds, Marker, MarkerId, UserLocation, Zone, ZoneId};

/// Snapshot of zones and markers, already annotated and filtered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapData {
    pub zones: Vec<Zone>,
    pub markers: Vec<Marker>,
}

/// Source of map data. Lookups fail with a not-found error; list queries
/// return empty collections instead of failing.
#[async_trait]
pub trait MapRepository: Send + Sync {
    /// Zones and markers with favorites, distance and nearby flags attached,
    /// sorted nearest first when a location is given, then filtered.
    async fn get_map_data(
        &self,
        location: Option<&UserLocation>,
        bounds: Option<&MapBounds>,
        filters: Option<&MapFilters>,
    ) -> Result<MapData, Error>;

    /// Markers within `radius` meters of `location`, nearest first. Ignores
    /// map filters.
    async fn get_nearby_markers(
        &self,
        location: &UserLocation,
        radius: f64,
    ) -> Result<Vec<Marker>, Error>;

    async fn get_marker_by_id(&self, id: MarkerId) -> Result<Marker, Error>;

    async fn get_zone_by_id(&self, id: ZoneId) -> Result<Zone, Error>;

    /// Flip the favorite flag of a marker and return the new state.
    async fn toggle_favorite_marker(&self, id: MarkerId) -> Result<bool, Error>;
}
