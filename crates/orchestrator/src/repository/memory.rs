#![forbid(unsafe_code)]

use super::annotate::{
    NEARBY_ANNOTATION_RADIUS, annotate_distances, annotate_favorites, filter_markers,
    filter_zones, sort_by_distance,
};
use super::{MapData, MapRepository};
use crate::error::Error;
use async_trait::async_trait;
use config::MapFilters;
use kernel::{Catalog, MapBounds, Marker, MarkerId, UserLocation, Zone, ZoneId};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, trace};

/// Repository serving a fixed [`Catalog`] from memory. Favorites live for
/// as long as the repository does.
#[derive(Debug)]
pub struct InMemoryRepository {
    catalog: Catalog,
    favorites: Mutex<HashSet<MarkerId>>,
    latency: Duration,
}

impl InMemoryRepository {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            favorites: Mutex::new(HashSet::new()),
            latency: Duration::ZERO,
        }
    }

    /// Delay every call by `latency`, simulating a remote backend.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_favorites(self, favorites: impl IntoIterator<Item = MarkerId>) -> Self {
        self.favorites.lock().extend(favorites);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn favorites(&self) -> HashSet<MarkerId> {
        self.favorites.lock().clone()
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn favorite_markers(&self) -> Vec<Marker> {
        let mut markers = self.catalog.markers.clone();
        annotate_favorites(&mut markers, &self.favorites.lock());
        markers
    }
}

#[async_trait]
impl MapRepository for InMemoryRepository {
    async fn get_map_data(
        &self,
        location: Option<&UserLocation>,
        bounds: Option<&MapBounds>,
        filters: Option<&MapFilters>,
    ) -> Result<MapData, Error> {
        self.simulate_latency().await;
        if let Some(bounds) = bounds {
            trace!(?bounds, "bounds are not used by the in-memory repository");
        }

        let mut markers = self.favorite_markers();
        if let Some(location) = location {
            annotate_distances(&mut markers, location, NEARBY_ANNOTATION_RADIUS);
            sort_by_distance(&mut markers);
        }

        let mut zones = self.catalog.zones.clone();
        if let Some(filters) = filters {
            markers = filter_markers(markers, filters, location.is_some());
            zones = filter_zones(zones, filters);
        }

        debug!(zones = zones.len(), markers = markers.len(), "map data served");
        Ok(MapData { zones, markers })
    }

    async fn get_nearby_markers(
        &self,
        location: &UserLocation,
        radius: f64,
    ) -> Result<Vec<Marker>, Error> {
        self.simulate_latency().await;

        let mut markers = self.favorite_markers();
        annotate_distances(&mut markers, location, radius);
        markers.retain(|m| m.is_nearby);
        sort_by_distance(&mut markers);
        Ok(markers)
    }

    async fn get_marker_by_id(&self, id: MarkerId) -> Result<Marker, Error> {
        self.simulate_latency().await;
        self.favorite_markers()
            .into_iter()
            .find(|m| m.id == id)
            .ok_or(Error::MarkerNotFound(id))
    }

    async fn get_zone_by_id(&self, id: ZoneId) -> Result<Zone, Error> {
        self.simulate_latency().await;
        self.catalog
            .zones
            .iter()
            .find(|z| z.id == id)
            .cloned()
            .ok_or(Error::ZoneNotFound(id))
    }

    async fn toggle_favorite_marker(&self, id: MarkerId) -> Result<bool, Error> {
        self.simulate_latency().await;
        if !self.catalog.markers.iter().any(|m| m.id == id) {
            return Err(Error::MarkerNotFound(id));
        }

        let mut favorites = self.favorites.lock();
        let is_favorite = if favorites.remove(&id) {
            false
        } else {
            favorites.insert(id);
            true
        };
        debug!(%id, is_favorite, "favorite toggled");
        Ok(is_favorite)
    }
}
