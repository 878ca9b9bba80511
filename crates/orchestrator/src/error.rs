#![forbid(unsafe_code)]

use kernel::{MarkerId, ZoneId};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] config::Error),

    #[error("catalog error: {0}")]
    Kernel(#[from] kernel::Error),

    #[error("{0} not found")]
    MarkerNotFound(MarkerId),

    #[error("{0} not found")]
    ZoneNotFound(ZoneId),

    /// The map data backend could not serve the request.
    #[error("map data unavailable: {0}")]
    Unavailable(String),
}
