#![forbid(unsafe_code)]

use kernel::{DEFAULT_LAT, DEFAULT_LNG, LngLat, Marker, UserLocation, Zone};

pub const DEFAULT_ZOOM: f64 = 13.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Last load failed; loading again retries.
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationPhase {
    #[default]
    Unknown,
    Requesting,
    Known,
    /// The last request failed. A fallback location may still be stored.
    Failed,
}

/// State rebuilt from scratch every session.
#[derive(Debug, Clone)]
pub struct Session {
    pub zones: Vec<Zone>,
    pub markers: Vec<Marker>,
    pub nearby_markers: Vec<Marker>,
    pub selected_zone: Option<Zone>,
    pub selected_marker: Option<Marker>,
    pub current_zone: Option<Zone>,
    pub user_location: Option<UserLocation>,

    pub load_phase: LoadPhase,
    pub location_phase: LocationPhase,
    pub is_loading_location: bool,
    pub error: Option<String>,
    pub location_error: Option<String>,

    pub map_loaded: bool,
    pub tracking: bool,
    pub geolocation_supported: bool,
    pub geolocation_permitted: bool,

    pub center: LngLat,
    pub zoom: f64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            zones: Vec::new(),
            markers: Vec::new(),
            nearby_markers: Vec::new(),
            selected_zone: None,
            selected_marker: None,
            current_zone: None,
            user_location: None,
            load_phase: LoadPhase::Idle,
            location_phase: LocationPhase::Unknown,
            is_loading_location: false,
            error: None,
            location_error: None,
            map_loaded: false,
            tracking: false,
            geolocation_supported: true,
            geolocation_permitted: false,
            center: LngLat::new(DEFAULT_LNG, DEFAULT_LAT),
            zoom: DEFAULT_ZOOM,
        }
    }
}

impl Session {
    pub fn is_loading(&self) -> bool {
        self.load_phase == LoadPhase::Loading
    }
}
