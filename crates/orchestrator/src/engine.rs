#![forbid(unsafe_code)]

use crate::error::Error;
use crate::geolocation::{Geolocator, LocationWatch, WatchEvent};
use crate::persistence::PreferencesRepository;
use crate::repository::MapRepository;
use crate::state::{LoadOutcome, MapState};
use config::{MapFilters, Preferences, ProximityUpdate};
use itertools::Itertools;
use kernel::{LngLat, Marker, MarkerId, UserLocation, Zone};
use std::future::pending;
use std::time::Duration;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub struct Services {
    pub repository: Box<dyn MapRepository>,
    pub geolocator: Geolocator,
    pub preferences: Box<dyn PreferencesRepository>,
}

#[derive(Debug)]
pub enum ControlEvent {
    /// Swap in preferences read from disk and reload map data.
    ReloadPreferences(Preferences),
    /// Log a summary of the current state.
    DumpState,
    Refresh,
}

/// Owns the map state and drives every operation that needs a service.
///
/// Operations take `&mut self`, so at most one request is in flight at a
/// time from the engine's point of view. The ticket bookkeeping in
/// [`MapState`] still guards against responses arriving late.
pub struct MapEngine {
    state: MapState,
    services: Services,
    watch: Option<LocationWatch>,
}

impl MapEngine {
    /// Create an engine with the given preferences. Nothing is read from
    /// the preferences repository.
    pub fn new(preferences: Preferences, services: Services) -> Self {
        Self {
            state: MapState::new(preferences),
            services,
            watch: None,
        }
    }

    /// Create an engine with preferences read from the configured
    /// repository.
    pub async fn load(services: Services) -> Result<Self, Error> {
        let preferences = services.preferences.load().await?;
        Ok(Self::new(preferences, services))
    }

    pub fn state(&self) -> &MapState {
        &self.state
    }

    pub fn is_tracking(&self) -> bool {
        self.watch.is_some()
    }

    pub async fn load_map_data(&mut self) -> LoadOutcome {
        let ticket = self.state.begin_load();
        let location = self.state.user_location().copied();
        let filters = self.state.filters().clone();
        let result = self
            .services
            .repository
            .get_map_data(location.as_ref(), None, Some(&filters))
            .await;

        let outcome = self.state.complete_load(ticket, result);
        if let LoadOutcome::Applied {
            refresh_nearby: true,
        } = outcome
        {
            self.load_nearby_markers().await;
        }
        outcome
    }

    pub async fn refresh_map_data(&mut self) -> LoadOutcome {
        self.load_map_data().await
    }

    /// Refresh nearby markers around the known location. Returns whether the
    /// list was replaced.
    pub async fn load_nearby_markers(&mut self) -> bool {
        let Some((ticket, location, radius)) = self.state.begin_nearby() else {
            debug!("no location yet, skipping nearby markers");
            return false;
        };
        let result = self
            .services
            .repository
            .get_nearby_markers(&location, radius)
            .await;
        self.state.complete_nearby(ticket, result)
    }

    pub async fn request_user_location(&mut self) {
        self.state.begin_location_request();
        let fix = self.services.geolocator.current_location().await;
        if self.state.apply_location_fix(fix).moved() {
            self.load_map_data().await;
        }
    }

    pub async fn use_default_location(&mut self) {
        self.state.apply_default_location();
        self.load_map_data().await;
    }

    pub async fn check_location_support(&mut self) {
        let status = self.services.geolocator.check_support().await;
        debug!(?status, "geolocation support probed");
        self.state.apply_support(&status);
    }

    /// Begin continuous tracking. Does nothing when already tracking or when
    /// the platform has no geolocation.
    pub fn start_location_tracking(&mut self) {
        if self.watch.is_some() || !self.state.session().geolocation_supported {
            return;
        }
        match self.services.geolocator.watch_location() {
            Ok(watch) => {
                info!("location tracking started");
                self.watch = Some(watch);
                self.state.set_tracking(true);
            }
            Err(err) => {
                self.state.apply_tracking_error(&err);
            }
        }
    }

    pub fn stop_location_tracking(&mut self) {
        if let Some(watch) = self.watch.take() {
            self.services.geolocator.stop_watching(&watch);
            info!("location tracking stopped");
        }
        self.state.set_tracking(false);
    }

    /// Wait for the next tracking event and apply it. Returns `false` once
    /// there is no watch left to wait on.
    pub async fn next_tracking_event(&mut self) -> bool {
        let event = match &self.watch {
            Some(watch) => watch.next().await,
            None => return false,
        };
        self.handle_watch_event(event).await;
        self.watch.is_some()
    }

    async fn handle_watch_event(&mut self, event: Option<WatchEvent>) {
        match event {
            Some(WatchEvent::Update(location)) => self.update_user_location(location).await,
            Some(WatchEvent::Error(err)) => {
                if self.state.apply_tracking_error(&err) {
                    self.stop_location_tracking();
                }
            }
            None => {
                debug!("location watch ended");
                self.stop_location_tracking();
            }
        }
    }

    pub async fn update_user_location(&mut self, location: UserLocation) {
        if self.state.update_user_location(location).moved() {
            self.load_nearby_markers().await;
        }
    }

    pub fn set_selected_zone(&mut self, zone: Option<Zone>) {
        self.state.set_selected_zone(zone);
    }

    pub fn set_selected_marker(&mut self, marker: Option<Marker>) {
        self.state.set_selected_marker(marker);
    }

    /// Flip a favorite and patch every copy of the marker. On failure the
    /// state is left untouched and the error is returned.
    pub async fn toggle_favorite(&mut self, id: MarkerId) -> Result<bool, Error> {
        match self.services.repository.toggle_favorite_marker(id).await {
            Ok(is_favorite) => {
                self.state.apply_favorite(id, is_favorite);
                Ok(is_favorite)
            }
            Err(err) => {
                warn!(%id, %err, "failed to toggle favorite");
                Err(err)
            }
        }
    }

    /// Replace the filters and refetch map data.
    pub async fn set_filters(&mut self, filters: MapFilters) {
        self.state.set_filters(filters);
        self.load_map_data().await;
    }

    /// Clear every filter and refetch map data. Also the way out of a failed
    /// load.
    pub async fn reset_filters(&mut self) {
        self.state.reset_filters();
        self.load_map_data().await;
    }

    pub async fn set_show_nearby_only(&mut self, show: bool) {
        self.state.set_show_nearby_only(show);
        self.load_map_data().await;
    }

    pub async fn set_proximity_settings(&mut self, update: ProximityUpdate) {
        self.state.set_proximity_settings(update);
        self.load_nearby_markers().await;
    }

    pub fn set_center(&mut self, center: LngLat) {
        self.state.set_center(center);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.state.set_zoom(zoom);
    }

    pub fn set_show_user_location(&mut self, show: bool) {
        self.state.set_show_user_location(show);
    }

    pub fn set_follow_user_location(&mut self, follow: bool) {
        self.state.set_follow_user_location(follow);
    }

    pub fn set_map_loaded(&mut self, loaded: bool) {
        self.state.set_map_loaded(loaded);
    }

    pub fn clear_error(&mut self) {
        self.state.clear_error();
    }

    pub fn clear_location_error(&mut self) {
        self.state.clear_location_error();
    }

    pub fn reset(&mut self) {
        self.stop_location_tracking();
        self.state.reset();
    }

    /// Persist preferences via the configured repository.
    pub async fn save_preferences(&self) -> Result<(), Error> {
        self.services.preferences.save(self.state.preferences()).await
    }

    /// Pump tracking events, control events and periodic nearby refreshes
    /// until `cancel` fires. Preferences are saved on the way out.
    pub async fn run_until(
        &mut self,
        cancel: CancellationToken,
        control_rx: flume::Receiver<ControlEvent>,
    ) -> Result<(), Error> {
        let mut period = self.refresh_period();
        let mut refresh = refresh_timer(period);

        loop {
            if self.refresh_period() != period {
                period = self.refresh_period();
                refresh = refresh_timer(period);
                debug!(?period, "auto refresh rescheduled");
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("shutdown requested");
                    break;
                }
                Ok(event) = control_rx.recv_async() => {
                    self.handle_control(event).await;
                }
                event = next_watch_event(self.watch.as_ref()) => {
                    self.handle_watch_event(event).await;
                }
                _ = next_tick(refresh.as_mut()) => {
                    self.load_nearby_markers().await;
                }
            }
        }

        self.stop_location_tracking();
        if let Err(err) = self.save_preferences().await {
            warn!(%err, "failed to save preferences on shutdown");
        }
        Ok(())
    }

    fn refresh_period(&self) -> Duration {
        self.state.preferences().proximity.auto_refresh_interval
    }

    async fn handle_control(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::ReloadPreferences(preferences) => {
                self.state.replace_preferences(preferences);
                info!("preferences reloaded");
                self.load_map_data().await;
            }
            ControlEvent::DumpState => self.dump_state(),
            ControlEvent::Refresh => {
                self.load_map_data().await;
            }
        }
    }

    fn dump_state(&self) {
        let session = self.state.session();
        let by_category = session.markers.iter().map(|m| m.category.as_str()).counts();
        info!(
            phase = ?session.load_phase,
            location = ?session.user_location.map(|l| (l.lat, l.lng)),
            current_zone = session.current_zone.as_ref().map(|z| z.name.as_str()),
            zones = session.zones.len(),
            markers = session.markers.len(),
            ?by_category,
            nearby = session.nearby_markers.len(),
            favorites = self.state.favorites_count(),
            tracking = self.watch.is_some(),
            "state dump"
        );
    }
}

fn refresh_timer(period: Duration) -> Option<Interval> {
    if period.is_zero() {
        return None;
    }
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(interval)
}

async fn next_tick(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => pending().await,
    }
}

async fn next_watch_event(watch: Option<&LocationWatch>) -> Option<WatchEvent> {
    match watch {
        Some(watch) => watch.next().await,
        None => pending().await,
    }
}
