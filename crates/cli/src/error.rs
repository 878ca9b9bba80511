use orchestrator::ControlEvent;
use flume::SendError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to install signal handler: {0}")]
    SignalHandler(#[source] io::Error),

    #[error("Failed to send control event: {0}")]
    SendControl(#[from] SendError<ControlEvent>),

    #[error("Failed to read track file {path:?}: {source}")]
    TrackRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid track file: {0}")]
    TrackParse(#[from] toml_edit::de::Error),
}
