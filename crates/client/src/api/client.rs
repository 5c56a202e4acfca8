//! Untyped HTTP transport for the marketplace backend.

use std::sync::Arc;

use marketplace_core::Session;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::{ApiError, error_message};
use crate::config::ClientConfig;

/// HTTP client bound to one backend origin.
///
/// Cloning is cheap; clones share the connection pool. A client optionally
/// carries a bearer token, attached to every request it sends.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
    token: Option<SecretString>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// Parsed JSON body; `Null` when the body was empty, a `String` when
    /// it was not JSON.
    pub body: serde_json::Value,
}

impl ApiResponse {
    /// Decode the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        Ok(serde_json::from_value(self.body)?)
    }
}

/// One field of a multipart payload.
#[derive(Debug, Clone)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        bytes: Vec<u8>,
        mime: Option<String>,
    },
}

impl FormPart {
    #[must_use]
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.to_owned(),
            value: value.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

impl ApiClient {
    /// Create a client for the configured backend, without a token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
            }),
            token: None,
        })
    }

    /// A clone of this client that authenticates as `session`.
    #[must_use]
    pub fn with_session(&self, session: &Session) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            token: Some(session.token().clone()),
        }
    }

    /// Whether requests from this client carry a bearer token.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// `GET path?query`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if no response arrives, `ApiError::Http`
    /// on a non-2xx status.
    #[instrument(
        level = "debug",
        skip(self, query),
        fields(authenticated = self.is_authenticated())
    )]
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<ApiResponse, ApiError> {
        let mut url = self.url(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        self.send(self.inner.client.get(url)).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get`].
    #[instrument(
        level = "debug",
        skip(self, body),
        fields(authenticated = self.is_authenticated())
    )]
    pub async fn post_json<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.url(path)?;
        self.send(self.inner.client.post(url).json(body)).await
    }

    /// `POST path` with a multipart body.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get`]. An unparseable part MIME type is reported
    /// as `ApiError::Network`, since reqwest surfaces it as a builder error.
    #[instrument(
        level = "debug",
        skip(self, parts),
        fields(authenticated = self.is_authenticated(), fields = parts.len())
    )]
    pub async fn post_multipart(
        &self,
        path: &str,
        parts: Vec<FormPart>,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.url(path)?;
        let form = build_form(parts)?;
        self.send(self.inner.client.post(url).multipart(form)).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::get`].
    #[instrument(level = "debug", skip(self), fields(authenticated = self.is_authenticated()))]
    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        let url = self.url(path)?;
        self.send(self.inner.client.delete(url)).await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|source| ApiError::InvalidPath {
                path: path.to_owned(),
                source,
            })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<ApiResponse, ApiError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            let body = if bytes.iter().all(u8::is_ascii_whitespace) {
                serde_json::Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                    serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
                })
            };
            tracing::debug!(%status, "Request succeeded");
            return Ok(ApiResponse { status, body });
        }

        let text = String::from_utf8_lossy(&bytes);
        let body = serde_json::from_slice::<serde_json::Value>(&bytes).ok();
        let message = error_message(status, body.as_ref(), &text);
        tracing::warn!(%status, %message, "Request failed");
        Err(ApiError::Http {
            status,
            message,
            body,
        })
    }
}

fn build_form(parts: Vec<FormPart>) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File {
                name,
                file_name,
                bytes,
                mime,
            } => {
                let mut file = Part::bytes(bytes).file_name(file_name);
                if let Some(mime) = mime {
                    file = file.mime_str(&mime)?;
                }
                form.part(name, file)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marketplace_core::UserId;

    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ClientConfig::for_api_url(base).unwrap()).unwrap()
    }

    #[test]
    fn test_url_joins_under_base_path() {
        let api = client("http://localhost:8000/api");
        assert_eq!(
            api.url("/products/3").unwrap().as_str(),
            "http://localhost:8000/api/products/3"
        );
        assert_eq!(
            api.url("total_pages").unwrap().as_str(),
            "http://localhost:8000/api/total_pages"
        );
    }

    #[test]
    fn test_with_session_shares_transport() {
        let anonymous = client("http://localhost:8000");
        assert!(!anonymous.is_authenticated());

        let session = Session::new(SecretString::from("t"), UserId::new(1), "A");
        let authed = anonymous.with_session(&session);
        assert!(authed.is_authenticated());
        assert!(Arc::ptr_eq(&anonymous.inner, &authed.inner));
    }

    #[test]
    fn test_build_form_rejects_bad_mime() {
        let parts = vec![FormPart::File {
            name: "image".to_owned(),
            file_name: "a.png".to_owned(),
            bytes: vec![1, 2, 3],
            mime: Some("not a mime".to_owned()),
        }];
        assert!(build_form(parts).is_err());
    }

    #[test]
    fn test_typed_decode_of_text_body_fails() {
        let response = ApiResponse {
            status: StatusCode::OK,
            body: serde_json::Value::String("Deleted".to_owned()),
        };
        let err = response.json::<Vec<u32>>().unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_form_part_name() {
        assert_eq!(FormPart::text("price", "9.99").name(), "price");
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let api = client(&format!("http://127.0.0.1:{port}"));
        let err = api.get("total_pages", &[]).await.unwrap_err();
        assert!(err.is_network());
        assert!(err.status().is_none());
    }
}
