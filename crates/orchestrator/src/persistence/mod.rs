#![forbid(unsafe_code)]

mod repo;

pub use repo::{NoopPreferences, PreferencesRepository, TomlPreferences};
