//! Unified startup error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::todo::StoreError;

/// Failures that stop the service from starting or serving.
///
/// Per-request failures never surface here: they become HTTP responses
/// (`400`, `404`, or the recover middleware's `500`).
#[derive(Debug, Error)]
pub enum Error {
    /// Binding the listening socket failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// The store could not be constructed (e.g. a malformed database URL).
    #[error("store: {0}")]
    Store(#[from] StoreError),
}
