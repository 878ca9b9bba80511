#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayToggles {
    pub show_user_location: bool,

    /// Recenter the map whenever the user moves.
    pub follow_user_location: bool,

    pub show_nearby_only: bool,
}

impl Default for DisplayToggles {
    fn default() -> Self {
        Self {
            show_user_location: true,
            follow_user_location: false,
            show_nearby_only: false,
        }
    }
}
