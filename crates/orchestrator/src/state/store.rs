#![forbid(unsafe_code)]

use super::session::{LoadPhase, LocationPhase, Session};
use crate::error::Error;
use crate::geolocation::{LocationError, LocationFix, SupportStatus};
use crate::repository::MapData;
use config::{MapFilters, Preferences, ProximityUpdate};
use kernel::geometry::{approx_planar_distance, current_zone_for};
use kernel::{LngLat, Marker, MarkerId, UserLocation, Zone};
use tracing::{debug, trace, warn};

/// Location updates closer than this to the stored location are ignored.
pub const JITTER_METERS: f64 = 10.0;

pub const DEFAULT_LOCATION_MESSAGE: &str = "Using default location (Cancún)";

const CENTER_EPSILON: f64 = 0.001;
const ZOOM_EPSILON: f64 = 0.1;

const LOCATED_ZOOM: f64 = 15.0;
const ZONE_ZOOM: f64 = 14.0;
const MARKER_ZOOM: f64 = 16.0;

/// Identifies one map data request. Only the most recently issued ticket
/// may apply its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

/// Same as [`LoadTicket`] for nearby marker requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NearbyTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response was stored. Nearby markers should be refreshed when
    /// `refresh_nearby` is set.
    Applied { refresh_nearby: bool },
    /// The request failed and the error was recorded.
    Failed,
    /// A newer request was issued meanwhile; the response was dropped.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationOutcome {
    /// The stored location changed.
    Moved,
    /// Nothing changed.
    Unchanged,
}

impl LocationOutcome {
    pub fn moved(self) -> bool {
        self == LocationOutcome::Moved
    }
}

/// The synchronous core of the engine.
///
/// Every mutation happens here and none of it awaits. Operations that need
/// I/O are split in two: a `begin_*` call that hands out what the request
/// needs and a `complete_*` call that folds the response back in. Return
/// values tell the caller which follow-up requests are due.
#[derive(Debug, Clone)]
pub struct MapState {
    session: Session,
    preferences: Preferences,
    next_ticket: u64,
    latest_load: Option<LoadTicket>,
    latest_nearby: Option<NearbyTicket>,
}

impl Default for MapState {
    fn default() -> Self {
        Self::new(Preferences::default())
    }
}

impl MapState {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            session: Session::default(),
            preferences,
            next_ticket: 0,
            latest_load: None,
            latest_nearby: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn filters(&self) -> &MapFilters {
        &self.preferences.filters
    }

    pub fn user_location(&self) -> Option<&UserLocation> {
        self.session.user_location.as_ref()
    }

    fn issue(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    // map data

    pub fn begin_load(&mut self) -> LoadTicket {
        let ticket = LoadTicket(self.issue());
        self.session.load_phase = LoadPhase::Loading;
        self.session.error = None;
        self.latest_load = Some(ticket);
        trace!(?ticket, "map data requested");
        ticket
    }

    pub fn complete_load(&mut self, ticket: LoadTicket, result: Result<MapData, Error>) -> LoadOutcome {
        if self.latest_load != Some(ticket) {
            debug!(?ticket, latest = ?self.latest_load, "discarding stale map data");
            return LoadOutcome::Stale;
        }

        match result {
            Ok(MapData { zones, markers }) => {
                self.session.zones = zones;
                self.session.markers = markers;
                self.recompute_current_zone();
                self.session.load_phase = LoadPhase::Ready;
                debug!(
                    zones = self.session.zones.len(),
                    markers = self.session.markers.len(),
                    "map data applied"
                );
                LoadOutcome::Applied {
                    refresh_nearby: self.session.user_location.is_some(),
                }
            }
            Err(err) => {
                warn!(%err, "failed to load map data");
                self.session.error = Some(err.to_string());
                self.session.load_phase = LoadPhase::Errored;
                LoadOutcome::Failed
            }
        }
    }

    /// Starts a nearby request when a location is known. Returns the
    /// location and radius to query with.
    pub fn begin_nearby(&mut self) -> Option<(NearbyTicket, UserLocation, f64)> {
        let location = self.session.user_location?;
        let ticket = NearbyTicket(self.issue());
        self.latest_nearby = Some(ticket);
        Some((ticket, location, self.preferences.proximity.nearby_radius))
    }

    /// Stores nearby markers. Failures are logged and leave the previous
    /// list in place. Returns whether the list was replaced.
    pub fn complete_nearby(&mut self, ticket: NearbyTicket, result: Result<Vec<Marker>, Error>) -> bool {
        if self.latest_nearby != Some(ticket) {
            debug!(?ticket, "discarding stale nearby markers");
            return false;
        }
        match result {
            Ok(markers) => {
                debug!(count = markers.len(), "nearby markers applied");
                self.session.nearby_markers = markers;
                true
            }
            Err(err) => {
                warn!(%err, "failed to load nearby markers");
                false
            }
        }
    }

    // location

    pub fn begin_location_request(&mut self) {
        self.session.is_loading_location = true;
        self.session.location_phase = LocationPhase::Requesting;
        self.session.location_error = None;
    }

    /// Folds the result of a one-shot location request in. Returns
    /// [`LocationOutcome::Moved`] when map data should be reloaded.
    pub fn apply_location_fix(&mut self, fix: LocationFix) -> LocationOutcome {
        self.session.is_loading_location = false;

        let Some(reason) = fix.fallback_reason else {
            self.session.location_phase = LocationPhase::Known;
            self.session.location_error = None;
            self.session.geolocation_permitted = true;
            self.store_location(fix.location);
            if self.preferences.display.follow_user_location {
                self.session.center = fix.location.point();
                self.session.zoom = LOCATED_ZOOM;
            }
            return LocationOutcome::Moved;
        };

        warn!(%reason, "location request failed");
        self.session.location_phase = LocationPhase::Failed;
        self.session.location_error = Some(reason.to_string());
        if reason == LocationError::PermissionDenied {
            self.session.geolocation_permitted = false;
        }

        if self.session.user_location.is_none() {
            self.apply_default_location();
            LocationOutcome::Moved
        } else {
            LocationOutcome::Unchanged
        }
    }

    /// Stores the fixed default location and recenters on it. Map data
    /// should be reloaded afterwards.
    pub fn apply_default_location(&mut self) {
        let location = UserLocation::fallback();
        self.store_location(location);
        self.session.center = location.point();
        self.session.location_error = Some(DEFAULT_LOCATION_MESSAGE.to_owned());
    }

    pub fn apply_support(&mut self, status: &SupportStatus) {
        self.session.geolocation_supported = status.supported;
        self.session.geolocation_permitted = status.permitted;
        if !status.supported {
            self.session.location_error = Some(status.message.clone());
            self.store_location(UserLocation::fallback());
        }
    }

    /// Applies a tracked position. Moves shorter than [`JITTER_METERS`]
    /// are ignored. On [`LocationOutcome::Moved`] nearby markers should be
    /// refreshed.
    pub fn update_user_location(&mut self, location: UserLocation) -> LocationOutcome {
        if let Some(previous) = &self.session.user_location {
            let moved = approx_planar_distance(previous, &location);
            if moved < JITTER_METERS {
                trace!(moved, "ignoring location jitter");
                return LocationOutcome::Unchanged;
            }
        }

        self.store_location(location);
        self.session.location_phase = LocationPhase::Known;
        if self.preferences.display.follow_user_location {
            self.session.center = location.point();
        }
        LocationOutcome::Moved
    }

    /// Records a watch error. Returns `true` when tracking should stop.
    pub fn apply_tracking_error(&mut self, err: &LocationError) -> bool {
        warn!(%err, "location tracking error");
        self.session.location_error = Some(err.to_string());
        if *err == LocationError::PermissionDenied {
            self.session.geolocation_permitted = false;
        }
        err.is_persistent()
    }

    pub fn set_tracking(&mut self, tracking: bool) {
        self.session.tracking = tracking;
    }

    fn store_location(&mut self, location: UserLocation) {
        self.session.user_location = Some(location);
        self.recompute_current_zone();
    }

    fn recompute_current_zone(&mut self) {
        self.session.current_zone = self
            .session
            .user_location
            .as_ref()
            .and_then(|location| current_zone_for(location, &self.session.zones))
            .cloned();
    }

    // selection

    pub fn set_selected_zone(&mut self, zone: Option<Zone>) {
        if let Some(first) = zone.as_ref().and_then(|z| z.coordinates.first()) {
            self.session.center = *first;
            self.session.zoom = ZONE_ZOOM;
            self.preferences.display.follow_user_location = false;
        }
        self.session.selected_zone = zone;
        self.session.selected_marker = None;
    }

    pub fn set_selected_marker(&mut self, marker: Option<Marker>) {
        if let Some(marker) = &marker {
            self.session.center = marker.position();
            self.session.zoom = MARKER_ZOOM;
            self.preferences.display.follow_user_location = false;
        }
        self.session.selected_marker = marker;
        self.session.selected_zone = None;
    }

    /// Writes a confirmed favorite state into every marker projection.
    pub fn apply_favorite(&mut self, id: MarkerId, is_favorite: bool) {
        let patch = |marker: &mut Marker| {
            if marker.id == id {
                marker.is_favorite = is_favorite;
            }
        };
        self.session.markers.iter_mut().for_each(patch);
        self.session.nearby_markers.iter_mut().for_each(patch);
        if let Some(marker) = self.session.selected_marker.as_mut() {
            patch(marker);
        }
    }

    // preferences

    /// Replaces the filters. Map data should be reloaded afterwards, even
    /// when the filters are unchanged.
    pub fn set_filters(&mut self, filters: MapFilters) {
        self.preferences.filters = filters;
    }

    pub fn reset_filters(&mut self) {
        self.set_filters(MapFilters::default());
    }

    /// Toggles the nearby-only view and folds it into the filters. Map data
    /// should be reloaded afterwards.
    pub fn set_show_nearby_only(&mut self, show: bool) {
        self.preferences.display.show_nearby_only = show;
        self.preferences.filters.show_only_nearby = show.then_some(true);
    }

    pub fn set_show_user_location(&mut self, show: bool) {
        self.preferences.display.show_user_location = show;
    }

    pub fn set_follow_user_location(&mut self, follow: bool) {
        self.preferences.display.follow_user_location = follow;
        if follow && let Some(location) = &self.session.user_location {
            self.session.center = location.point();
        }
    }

    /// Merges a partial update. Nearby markers should be refreshed
    /// afterwards.
    pub fn set_proximity_settings(&mut self, update: ProximityUpdate) {
        self.preferences.proximity = self.preferences.proximity.merge(update);
    }

    /// Replaces preferences wholesale, e.g. after reloading them from disk.
    pub fn replace_preferences(&mut self, preferences: Preferences) {
        self.preferences = preferences;
    }

    // viewport

    pub fn set_center(&mut self, center: LngLat) {
        let current = self.session.center;
        let changed = (current.lng - center.lng).abs() > CENTER_EPSILON
            || (current.lat - center.lat).abs() > CENTER_EPSILON;
        if changed {
            self.session.center = center;
            self.preferences.display.follow_user_location = false;
        }
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if (self.session.zoom - zoom).abs() > ZOOM_EPSILON {
            self.session.zoom = zoom;
        }
    }

    pub fn set_map_loaded(&mut self, loaded: bool) {
        self.session.map_loaded = loaded;
    }

    pub fn clear_error(&mut self) {
        self.session.error = None;
    }

    pub fn clear_location_error(&mut self) {
        self.session.location_error = None;
    }

    /// Back to a fresh session with default preferences. Responses to
    /// requests issued before the reset are treated as stale.
    pub fn reset(&mut self) {
        self.session = Session::default();
        self.preferences = Preferences::default();
        self.latest_load = None;
        self.latest_nearby = None;
    }

    // derived views

    pub fn current_zone(&self) -> Option<&Zone> {
        self.session.current_zone.as_ref()
    }

    pub fn favorites_count(&self) -> usize {
        self.session.markers.iter().filter(|m| m.is_favorite).count()
    }

    /// Nearby markers whose name contains `query`, ignoring case.
    pub fn filtered_nearby(&self, query: &str) -> Vec<&Marker> {
        let query = query.to_lowercase();
        self.session
            .nearby_markers
            .iter()
            .filter(|m| m.name.to_lowercase().contains(&query))
            .collect()
    }

    /// Markers the map should show: nearby ones in nearby-only mode,
    /// everything otherwise.
    pub fn displayed_markers(&self) -> &[Marker] {
        if self.preferences.display.show_nearby_only {
            &self.session.nearby_markers
        } else {
            &self.session.markers
        }
    }
}
