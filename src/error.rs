//! Error types for walkin.
//!
//! Queue and notifier failures stay in their own enums (`QueueError`, `NotifyError`);
//! they are mapped to HTTP responses or logged where they occur. This type covers
//! startup and server failures.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Web error: {0}")]
    Web(String),
}
