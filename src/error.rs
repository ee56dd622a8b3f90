//! Error types for docker-hosts.

use std::path::PathBuf;

use crate::runtime::RuntimeError;

/// Crate-level error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The hosts file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The new hosts file could not be written or moved into place.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Simulated output could not be written.
    #[error("failed to write simulated output: {0}")]
    Output(#[source] std::io::Error),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
