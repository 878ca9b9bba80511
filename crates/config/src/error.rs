#![forbid(unsafe_code)]

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read preferences file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML document: {0}")]
    TomlParse(#[from] toml_edit::TomlError),

    #[error("failed to serialize TOML: {0}")]
    TomlSer(#[from] toml_edit::ser::Error),

    #[error("failed to extract preferences: {0}")]
    Extract(#[from] Box<figment::Error>),

    #[error("invalid path: {0}")]
    InvalidPath(PathBuf),
}
