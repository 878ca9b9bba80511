#![forbid(unsafe_code)]

use crate::error::Error;
use async_trait::async_trait;
use config::Preferences;
use std::path::PathBuf;
use tracing::debug;

/// Storage for the part of the state that survives across sessions.
#[async_trait]
pub trait PreferencesRepository: Send + Sync {
    /// Load stored preferences, or defaults when nothing was stored yet.
    async fn load(&self) -> Result<Preferences, Error>;
    /// Persist preferences.
    async fn save(&self, preferences: &Preferences) -> Result<(), Error>;
}

#[derive(Debug, Default)]
pub struct NoopPreferences;

#[async_trait]
impl PreferencesRepository for NoopPreferences {
    async fn load(&self) -> Result<Preferences, Error> {
        Ok(Preferences::default())
    }

    async fn save(&self, _preferences: &Preferences) -> Result<(), Error> {
        Ok(())
    }
}

/// Preferences kept in a TOML file.
#[derive(Debug, Clone)]
pub struct TomlPreferences {
    path: PathBuf,
}

impl TomlPreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl PreferencesRepository for TomlPreferences {
    async fn load(&self) -> Result<Preferences, Error> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no stored preferences, using defaults");
            return Ok(Preferences::default());
        }
        Ok(Preferences::load(&self.path)?)
    }

    async fn save(&self, preferences: &Preferences) -> Result<(), Error> {
        preferences.save(&self.path)?;
        debug!(path = %self.path.display(), "preferences persisted");
        Ok(())
    }
}
