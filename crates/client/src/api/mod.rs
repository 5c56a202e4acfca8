//! Marketplace backend REST client.
//!
//! # Architecture
//!
//! - [`ApiClient`] is the untyped transport: JSON, multipart and delete
//!   requests against a fixed origin, with bearer auth attached when the
//!   client carries a session token
//! - [`MarketplaceApi`] layers one typed method per backend endpoint on top
//!
//! Network failures and HTTP failures are separate [`ApiError`] variants so
//! views can word their messages differently.

pub mod client;
pub mod marketplace;

pub use client::{ApiClient, ApiResponse, FormPart};
pub use marketplace::{
    ImageFile, LoginRequest, LoginResponse, MarketplaceApi, NewProduct, RegisterRequest,
};

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the marketplace backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received (DNS, connection refused, timeout, reset).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        status: StatusCode,
        message: String,
        /// Parsed error body, when it was JSON.
        body: Option<serde_json::Value>,
    },

    /// A success response whose body did not have the expected shape.
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// An endpoint path could not be joined onto the base URL.
    #[error("Invalid endpoint path {path}: {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: url::ParseError,
    },
}

impl ApiError {
    /// HTTP status of the failure, if a response was received.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend rejected the bearer token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// Whether no response was received at all.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Pull a human-readable message out of an error response body.
///
/// Understands `{"detail": "..."}`, `{"error": "..."}` and
/// `{"message": "..."}`; anything else falls back to the raw text, then to
/// the status reason phrase.
pub(crate) fn error_message(
    status: StatusCode,
    body: Option<&serde_json::Value>,
    text: &str,
) -> String {
    let from_json = body.and_then(|value| {
        ["detail", "error", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
    });

    if let Some(message) = from_json {
        return message.to_owned();
    }
    let text = text.trim();
    if !text.is_empty() {
        return text.to_owned();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_owned()
}
