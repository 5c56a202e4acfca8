//! Integration tests for the marketplace client.
//!
//! The tests drive the client library against [`StubBackend`], an in-process
//! `axum` server that speaks the marketplace REST contract and counts the
//! requests it receives.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p marketplace-integration-tests
//! ```
//!
//! Each test starts its own backend on an ephemeral port, so tests run in
//! parallel without sharing state.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Multipart, Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use marketplace_client::{ApiClient, ClientConfig, MarketplaceApi};
use marketplace_core::{Session, UserId};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Email of the account every backend starts with.
pub const USER_EMAIL: &str = "noa@example.com";
/// Password of the seeded account.
pub const USER_PASSWORD: &str = "correct horse";
/// Token issued for the seeded account.
pub const USER_TOKEN: &str = "stub-token-7";
/// Id of the seeded account.
pub const USER_ID: i32 = 7;
/// First name of the seeded account.
pub const USER_FIRST_NAME: &str = "Noa";

type Reject = (StatusCode, Json<Value>);

struct StubUser {
    email: String,
    password: String,
    first_name: String,
    user_id: i32,
    token: String,
}

#[derive(Default)]
struct Inner {
    users: Vec<StubUser>,
    /// Public listing, in display order.
    listing: Vec<Value>,
    /// Products owned by the seeded user.
    owned: Vec<Value>,
    next_id: i32,
    tokens_revoked: bool,
    plain_text_replies: bool,
    hits: HashMap<&'static str, usize>,
    listing_queries: Vec<(usize, usize)>,
    upload_fields: Vec<Vec<String>>,
}

/// Shared state behind the stub's handlers.
#[derive(Default)]
pub struct StubState {
    inner: Mutex<Inner>,
}

impl StubState {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn hit(&self, endpoint: &'static str) -> MutexGuard<'_, Inner> {
        let mut inner = self.lock();
        *inner.hits.entry(endpoint).or_default() += 1;
        inner
    }
}

/// An in-process marketplace backend.
pub struct StubBackend {
    addr: SocketAddr,
    state: Arc<StubState>,
    server: JoinHandle<()>,
}

impl StubBackend {
    /// Start a backend with the seeded account and no products.
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        {
            let mut inner = state.lock();
            inner.next_id = 1;
            inner.users.push(StubUser {
                email: USER_EMAIL.to_owned(),
                password: USER_PASSWORD.to_owned(),
                first_name: USER_FIRST_NAME.to_owned(),
                user_id: USER_ID,
                token: USER_TOKEN.to_owned(),
            });
        }

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub backend");
        let addr = listener.local_addr().expect("Stub backend has no address");
        let app = router(Arc::clone(&state));
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                panic!("Stub backend stopped: {e}");
            }
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL, e.g. `http://127.0.0.1:41234`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointing at this backend.
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::for_api_url(&self.url()).expect("Stub URL is valid")
    }

    /// An unauthenticated API handle for this backend.
    #[must_use]
    pub fn api(&self) -> MarketplaceApi {
        MarketplaceApi::new(ApiClient::new(&self.config()).expect("Failed to build client"))
    }

    /// The session a successful login of the seeded account yields.
    #[must_use]
    pub fn session() -> Session {
        Session::new(
            SecretString::from(USER_TOKEN),
            UserId::new(USER_ID),
            USER_FIRST_NAME,
        )
    }

    /// Append `count` products to the public listing.
    pub fn seed_listing(&self, count: usize) {
        let mut inner = self.state.lock();
        for _ in 0..count {
            let id = inner.next_id;
            inner.next_id += 1;
            let product = product_json(id, &format!("Product {id}"), 10.5, None);
            inner.listing.push(product);
        }
    }

    /// Give the seeded account a product and return its id.
    pub fn seed_owned(&self, name: &str) -> i32 {
        let mut inner = self.state.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        let product = product_json(id, name, 25.0, Some(&format!("{id}.png")));
        inner.owned.push(product);
        id
    }

    /// Reject every bearer token from now on.
    pub fn revoke_tokens(&self) {
        self.state.lock().tokens_revoked = true;
    }

    /// Answer successful deletes and signups with a plain-text body.
    pub fn reply_in_plain_text(&self) {
        self.state.lock().plain_text_replies = true;
    }

    /// Number of requests received by `endpoint`, e.g. `"GET /products"`.
    #[must_use]
    pub fn hits(&self, endpoint: &str) -> usize {
        self.state.lock().hits.get(endpoint).copied().unwrap_or(0)
    }

    /// Total number of requests received.
    #[must_use]
    pub fn total_hits(&self) -> usize {
        self.state.lock().hits.values().sum()
    }

    /// `(skip, limit)` of every `GET /products`, in arrival order.
    #[must_use]
    pub fn listing_queries(&self) -> Vec<(usize, usize)> {
        self.state.lock().listing_queries.clone()
    }

    /// Multipart field names of every `POST /products`, in arrival order.
    #[must_use]
    pub fn upload_fields(&self) -> Vec<Vec<String>> {
        self.state.lock().upload_fields.clone()
    }

    /// Ids of the seeded account's products.
    #[must_use]
    pub fn owned_ids(&self) -> Vec<i64> {
        self.state
            .lock()
            .owned
            .iter()
            .filter_map(|p| p["id"].as_i64())
            .collect()
    }
}

impl Drop for StubBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn router(state: Arc<StubState>) -> Router {
    Router::new()
        .route("/total_pages", get(total_pages))
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", delete(delete_product))
        .route("/user_products/{user_id}", get(user_products))
        .route("/login", post(login))
        .route("/register", post(register))
        .with_state(state)
}

fn product_json(id: i32, name: &str, price: f64, image: Option<&str>) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": format!("Description of {name}"),
        "price": price,
        "quantity": 3,
        "image": image,
    })
}

/// Success body for endpoints whose reply carries no data.
fn acknowledge(inner: &Inner, message: &str) -> Response {
    if inner.plain_text_replies {
        message.to_owned().into_response()
    } else {
        Json(json!({ "message": message })).into_response()
    }
}

fn reject(status: StatusCode, detail: &str) -> Reject {
    (status, Json(json!({ "detail": detail })))
}

/// Resolve the bearer token to a user id.
fn authorize(inner: &Inner, headers: &HeaderMap) -> Result<i32, Reject> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let user = token
        .filter(|_| !inner.tokens_revoked)
        .and_then(|token| inner.users.iter().find(|u| u.token == token));
    user.map(|u| u.user_id)
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Not authenticated"))
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: usize,
}

async fn total_pages(
    State(state): State<Arc<StubState>>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Value>, Reject> {
    let inner = state.hit("GET /total_pages");
    if query.limit == 0 {
        return Err(reject(StatusCode::UNPROCESSABLE_ENTITY, "limit must be positive"));
    }
    let total = inner.listing.len().div_ceil(query.limit);
    Ok(Json(json!({ "total_pages": total })))
}

#[derive(Deserialize)]
struct ListingQuery {
    skip: usize,
    limit: usize,
}

async fn list_products(
    State(state): State<Arc<StubState>>,
    Query(query): Query<ListingQuery>,
) -> Json<Value> {
    let mut inner = state.hit("GET /products");
    inner.listing_queries.push((query.skip, query.limit));
    let page: Vec<Value> = inner
        .listing
        .iter()
        .skip(query.skip)
        .take(query.limit)
        .cloned()
        .collect();
    Json(Value::Array(page))
}

async fn user_products(
    State(state): State<Arc<StubState>>,
    Path(user_id): Path<i32>,
    headers: HeaderMap,
) -> Result<Json<Value>, Reject> {
    let inner = state.hit("GET /user_products");
    let caller = authorize(&inner, &headers)?;
    if caller != user_id {
        return Err(reject(StatusCode::FORBIDDEN, "Not your products"));
    }
    Ok(Json(Value::Array(inner.owned.clone())))
}

async fn create_product(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Value>, Reject> {
    authorize(&state.hit("POST /products"), &headers)?;

    let mut fields = Vec::new();
    let mut text = HashMap::new();
    let mut image = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| reject(StatusCode::BAD_REQUEST, &e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        let file_name = field.file_name().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| reject(StatusCode::BAD_REQUEST, &e.to_string()))?;
        if name == "image" {
            image = file_name;
        } else {
            text.insert(name.clone(), String::from_utf8_lossy(&bytes).into_owned());
        }
        fields.push(name);
    }

    let mut inner = state.lock();
    inner.upload_fields.push(fields);

    let price = text
        .get("price")
        .and_then(|p| p.trim().parse::<f64>().ok())
        .ok_or_else(|| reject(StatusCode::UNPROCESSABLE_ENTITY, "Invalid price"))?;
    let name = text.get("name").cloned().unwrap_or_default();

    let id = inner.next_id;
    inner.next_id += 1;
    let product = product_json(id, &name, price, image.as_deref());
    inner.owned.push(product.clone());
    Ok(Json(product))
}

async fn delete_product(
    State(state): State<Arc<StubState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Response, Reject> {
    let mut inner = state.hit("DELETE /products");
    authorize(&inner, &headers)?;
    let before = inner.owned.len();
    inner.owned.retain(|p| p["id"].as_i64() != Some(id));
    if inner.owned.len() == before {
        return Err(reject(StatusCode::NOT_FOUND, "Product not found"));
    }
    Ok(acknowledge(&inner, "Product deleted"))
}

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

async fn login(
    State(state): State<Arc<StubState>>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<Value>, Reject> {
    let inner = state.hit("POST /login");
    let user = inner
        .users
        .iter()
        .find(|u| u.email == credentials.email && u.password == credentials.password)
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Invalid credentials"))?;
    Ok(Json(json!({
        "token": user.token,
        "first_name": user.first_name,
        "user_id": user.user_id,
    })))
}

#[derive(Deserialize)]
struct Registration {
    first_name: String,
    last_name: String,
    full_address: String,
    email: String,
    password: String,
}

async fn register(
    State(state): State<Arc<StubState>>,
    Json(registration): Json<Registration>,
) -> Result<Response, Reject> {
    let mut inner = state.hit("POST /register");
    if inner.users.iter().any(|u| u.email == registration.email) {
        return Err(reject(StatusCode::BAD_REQUEST, "Email already registered"));
    }
    if registration.last_name.is_empty() || registration.full_address.is_empty() {
        return Err(reject(StatusCode::UNPROCESSABLE_ENTITY, "Missing fields"));
    }

    let user_id = inner.next_id;
    inner.next_id += 1;
    inner.users.push(StubUser {
        email: registration.email,
        password: registration.password,
        first_name: registration.first_name,
        user_id,
        token: format!("stub-token-{user_id}"),
    });
    Ok(acknowledge(&inner, "User registered"))
}
