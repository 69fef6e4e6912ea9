//! Error types
//!
//! The simulation itself never fails; only configuration I/O can.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or saving a [`crate::BannerConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}
