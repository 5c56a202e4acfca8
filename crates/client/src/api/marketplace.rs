//! Typed marketplace endpoints.

use std::num::NonZeroU32;
use std::path::Path;

use marketplace_core::{Email, Product, ProductId, Session, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ApiClient, ApiError, FormPart};

/// Typed access to the marketplace REST endpoints.
#[derive(Clone)]
pub struct MarketplaceApi {
    client: ApiClient,
}

/// Response body of `GET /total_pages`.
#[derive(Debug, Deserialize)]
struct TotalPagesResponse {
    total_pages: u32,
}

/// Credentials for `POST /login`.
pub struct LoginRequest {
    pub email: Email,
    pub password: SecretString,
}

impl Serialize for LoginRequest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("LoginRequest", 2)?;
        state.serialize_field("email", &self.email)?;
        state.serialize_field("password", self.password.expose_secret())?;
        state.end()
    }
}

/// Response body of a successful `POST /login`.
///
/// Every field is optional on the wire; a response missing any of them
/// does not yield a session.
#[derive(Debug, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    user_id: Option<WireId>,
}

/// The backend sends user ids as numbers, but older builds sent strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Number(i64),
    Text(String),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

impl LoginResponse {
    /// The session described by this response, if it is complete.
    #[must_use]
    pub fn into_session(self) -> Option<Session> {
        Session::from_parts(
            self.token,
            self.user_id.map(WireId::into_string),
            self.first_name,
        )
    }
}

/// Signup form for `POST /register`.
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub full_address: String,
    pub email: Email,
    pub password: SecretString,
}

impl Serialize for RegisterRequest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("RegisterRequest", 5)?;
        state.serialize_field("first_name", &self.first_name)?;
        state.serialize_field("last_name", &self.last_name)?;
        state.serialize_field("full_address", &self.full_address)?;
        state.serialize_field("email", &self.email)?;
        state.serialize_field("password", self.password.expose_secret())?;
        state.end()
    }
}

/// An image attached to a new product.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

impl ImageFile {
    /// Read an image from disk, guessing its MIME type from the extension.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be read.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_owned(), |n| n.to_string_lossy().into_owned());
        let mime = path
            .extension()
            .and_then(|ext| image_mime(&ext.to_string_lossy()))
            .map(str::to_owned);
        Ok(Self {
            file_name,
            bytes,
            mime,
        })
    }
}

fn image_mime(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// The "add product" form.
///
/// Text fields are sent exactly as entered; the backend does all
/// validation. The image is optional on the client side.
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: String,
    pub quantity: String,
    pub image: Option<ImageFile>,
}

impl NewProduct {
    /// Multipart fields in submission order.
    ///
    /// Without an image there is simply no `image` part.
    #[must_use]
    pub fn into_parts(self) -> Vec<FormPart> {
        let mut parts = vec![
            FormPart::text("name", self.name),
            FormPart::text("description", self.description),
            FormPart::text("price", self.price),
            FormPart::text("quantity", self.quantity),
        ];
        if let Some(image) = self.image {
            parts.push(FormPart::File {
                name: "image".to_owned(),
                file_name: image.file_name,
                bytes: image.bytes,
                mime: image.mime,
            });
        }
        parts
    }
}

impl MarketplaceApi {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// A clone of this API that authenticates as `session`.
    #[must_use]
    pub fn with_session(&self, session: &Session) -> Self {
        Self::new(self.client.with_session(session))
    }

    /// `GET /total_pages?limit=N`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body lacks `total_pages`.
    #[instrument(level = "debug", skip(self))]
    pub async fn total_pages(&self, limit: NonZeroU32) -> Result<u32, ApiError> {
        let response = self
            .client
            .get("total_pages", &[("limit", limit.to_string())])
            .await?;
        Ok(response.json::<TotalPagesResponse>()?.total_pages)
    }

    /// `GET /products?skip=N&limit=N`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is not a product list.
    #[instrument(level = "debug", skip(self))]
    pub async fn products(&self, skip: u64, limit: NonZeroU32) -> Result<Vec<Product>, ApiError> {
        self.client
            .get(
                "products",
                &[("skip", skip.to_string()), ("limit", limit.to_string())],
            )
            .await?
            .json()
    }

    /// `GET /user_products/{user_id}`. Requires a session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is not a product list.
    #[instrument(level = "debug", skip(self))]
    pub async fn user_products(&self, user_id: UserId) -> Result<Vec<Product>, ApiError> {
        self.client
            .get(&format!("user_products/{user_id}"), &[])
            .await?
            .json()
    }

    /// `POST /products` as multipart. Requires a session.
    ///
    /// Returns the created product when the backend echoes one back in a
    /// recognisable shape.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(level = "debug", skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&self, product: NewProduct) -> Result<Option<Product>, ApiError> {
        let response = self
            .client
            .post_multipart("products", product.into_parts())
            .await?;
        match serde_json::from_value::<Product>(response.body) {
            Ok(created) => Ok(Some(created)),
            Err(e) => {
                tracing::debug!(error = %e, "Create response did not contain a product");
                Ok(None)
            }
        }
    }

    /// `DELETE /products/{id}`. Requires a session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.client.delete(&format!("products/{id}")).await?;
        Ok(())
    }

    /// `POST /login`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` when the credentials are rejected.
    #[instrument(level = "debug", skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.client.post_json("login", request).await?.json()
    }

    /// `POST /register`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` when the backend refuses the signup.
    #[instrument(level = "debug", skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        self.client.post_json("register", request).await?;
        Ok(())
    }
}
