#![forbid(unsafe_code)]

//! User preferences for the map engine.
//!
//! Only the fields in [`Preferences`] survive across sessions. They are read
//! from a TOML document laid out as:
//!
//! ```toml
//! [filters]
//! marker_categories = ["hotel", "villa"]
//! min_rating = 4.0
//!
//! [proximity]
//! nearby_radius = 1000.0
//! load_radius = 5000.0
//! auto_refresh_interval = 30000
//!
//! [display]
//! show_user_location = true
//! follow_user_location = false
//! show_nearby_only = false
//! ```

mod category;
mod display;
mod error;
mod filters;
mod proximity;

pub use category::{MarkerCategory, PriceRange, ZoneKind};
pub use display::DisplayToggles;
pub use error::Error;
pub use filters::MapFilters;
pub use proximity::{ProximitySettings, ProximityUpdate};

use figment::Figment;
use figment::providers::{Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Preferences {
    pub filters: MapFilters,
    pub proximity: ProximitySettings,
    pub display: DisplayToggles,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load preferences from a TOML file. Missing keys fall back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        // reject malformed documents with a positioned error before merging
        contents.parse::<toml_edit::DocumentMut>()?;
        Figment::from(Serialized::defaults(Preferences::default()))
            .merge(Toml::string(contents))
            .extract()
            .map_err(|err| Error::Extract(Box::new(err)))
    }

    pub fn to_toml_string(&self) -> Result<String, Error> {
        Ok(toml_edit::ser::to_string_pretty(self)?)
    }

    /// Write preferences to `path`, creating parent directories as needed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        if path.file_name().is_none() {
            return Err(Error::InvalidPath(path.to_path_buf()));
        }
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }
}
