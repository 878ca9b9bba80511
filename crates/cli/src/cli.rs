use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::{Path, PathBuf};

/// proximap: what is around you on the map
///
/// Locates the user (or falls back to a default location), loads zones and
/// points of interest around them and prints what is nearby. With a track
/// file the fixes are replayed as a live location watch.
#[derive(Debug, Parser, Clone)]
#[command(about, long_about, version)]
pub struct Cli {
    /// Preferences file (TOML).
    ///
    /// Read at startup if it exists. Written back only with `--save`.
    #[arg(short, long)]
    pub conffile: Option<PathBuf>,

    /// Catalog of zones and markers (TOML). Defaults to the built-in one.
    #[arg(long, value_parser = validate_file)]
    pub catalog: Option<PathBuf>,

    /// Latitude reported by the simulated platform.
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude reported by the simulated platform.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Accuracy in meters of the simulated fix.
    #[arg(long, requires = "lat")]
    pub accuracy: Option<f64>,

    /// Track file (TOML) replayed as a location watch.
    #[arg(short, long, value_parser = validate_file)]
    pub track: Option<PathBuf>,

    /// Keep running until interrupted.
    ///
    /// SIGUSR1 logs a state dump, SIGUSR2 reloads the preferences file.
    #[arg(short, long)]
    pub watch: bool,

    /// Only list nearby markers whose name contains this text.
    #[arg(long)]
    pub query: Option<String>,

    /// Nearby radius in meters.
    #[arg(short, long, value_parser = validate_radius)]
    pub radius: Option<f64>,

    /// Show only nearby markers on the map.
    #[arg(long)]
    pub nearby_only: bool,

    /// Toggle the favorite flag of a marker. May be repeated.
    #[arg(short, long = "favorite", value_name = "ID")]
    pub favorites: Vec<u32>,

    /// Viewport width in pixels, used to pace the marker reveal.
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Write preferences back to the preferences file on exit.
    #[arg(short, long, requires = "conffile")]
    pub save: bool,

    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,
}

impl Cli {
    pub fn fix(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lng)
    }
}

/// Check if the file exists.
#[inline(always)]
fn validate_file(file: &str) -> Result<PathBuf, String> {
    let path = Path::new(file);
    if path.exists() {
        Ok(path.to_owned())
    } else {
        Err(format!("File not found: {:?}", path))
    }
}

/// Validate a radius in meters.
#[inline(always)]
fn validate_radius(radius: &str) -> Result<f64, String> {
    let radius: f64 = radius
        .parse()
        .map_err(|_| format!("`{radius}` is not a valid radius"))?;
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err("Radius must be a positive number of meters".to_string())
    }
}
