//! Unified error type for view and front-end entry points.

use std::path::PathBuf;

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::session::SessionError;

/// Client-level error type.
///
/// Views convert network and HTTP failures into flash messages themselves;
/// what reaches a `ClientError` is whatever the front end has to report
/// before or around a view (bad configuration, unreadable session file,
/// unreadable upload).
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Session storage failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Upload file could not be read.
    #[error("Cannot read {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;
