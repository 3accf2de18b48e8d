//! Error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating motion configuration
///
/// Runtime motion APIs never return errors; they degrade to no-ops instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file could not be read
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`crate::MotionConfig`]
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration parsed but a value is out of range
    #[error("Invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, Error>;
