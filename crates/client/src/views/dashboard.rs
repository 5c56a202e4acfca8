//! Per-user product dashboard.
//!
//! Every action is gated on a stored session. A missing session, or a token
//! the backend rejects with 401, sends the user to the login page instead
//! of showing an error.

use std::sync::Arc;

use marketplace_core::{Product, ProductId, Session};
use tracing::instrument;

use super::{Flash, Navigation, Page};
use crate::api::{ApiError, MarketplaceApi, NewProduct};
use crate::session::{SessionError, SessionStore};

const EMPTY_STATE: &str =
    "You haven't added any products yet. Use the form below to add new products.";
const UPLOADS_PREFIX: &str = "/static/uploads/";

/// Result of opening the dashboard.
pub enum Gate {
    /// Not logged in; go here instead.
    Redirect(Page),
    /// Logged in and the list has been requested.
    Ready(Box<DashboardView>),
}

/// Actions available on a dashboard row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Delete(ProductId),
}

/// One table row of the user's own products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRow {
    pub id: ProductId,
    /// Path to the uploaded image, if the product has one.
    pub image_src: Option<String>,
    pub name: String,
    pub description: String,
    pub price: String,
    pub quantity: i32,
    pub actions: Vec<RowAction>,
}

/// Everything the dashboard displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardViewModel {
    /// First name shown in the header.
    pub greeting: String,
    pub rows: Vec<DashboardRow>,
    /// Shown in place of rows when the user has no products.
    pub empty_message: Option<&'static str>,
    pub flash: Option<Flash>,
}

/// State of the logged-in user's dashboard.
pub struct DashboardView {
    api: MarketplaceApi,
    store: Arc<dyn SessionStore>,
    session: Session,
    products: Vec<Product>,
    loaded: bool,
    flash: Option<Flash>,
}

impl DashboardView {
    /// Open the dashboard.
    ///
    /// Without a usable stored session this redirects to login before any
    /// request is made. An unreadable session store counts as logged out.
    /// Otherwise it fetches the user's products.
    #[instrument(level = "debug", skip_all)]
    pub async fn open(api: &MarketplaceApi, store: Arc<dyn SessionStore>) -> Gate {
        let session = match store.load() {
            Ok(Some(session)) => session,
            Ok(None) => {
                tracing::info!("Dashboard requires login");
                return Gate::Redirect(Page::Login);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Unreadable session; treating as logged out");
                return Gate::Redirect(Page::Login);
            }
        };

        let mut view = Self {
            api: api.with_session(&session),
            store,
            session,
            products: Vec::new(),
            loaded: false,
            flash: None,
        };
        match view.reload().await {
            Navigation::Stay => Gate::Ready(Box::new(view)),
            Navigation::Redirect(page) => Gate::Redirect(page),
        }
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Re-fetch the user's products.
    #[instrument(level = "debug", skip(self), fields(user_id = %self.session.user_id()))]
    pub async fn reload(&mut self) -> Navigation {
        match self.api.user_products(self.session.user_id()).await {
            Ok(products) => {
                tracing::debug!(count = products.len(), "User products fetched");
                self.products = products;
                self.loaded = true;
                Navigation::Stay
            }
            Err(e) => self.fail(&e, "Error fetching your products"),
        }
    }

    /// Submit a new product and reload the list.
    ///
    /// No field is required on the client side. In particular a product
    /// without an image is still submitted; the backend decides.
    #[instrument(level = "debug", skip_all, fields(name = %product.name))]
    pub async fn add_product(&mut self, product: NewProduct) -> Navigation {
        if let Some(redirect) = self.recheck_session() {
            return redirect;
        }
        if product.image.is_none() {
            tracing::debug!("Submitting product without an image");
        }

        match self.api.create_product(product).await {
            Ok(created) => {
                if let Some(created) = created {
                    tracing::info!(product_id = %created.id, "Product added");
                }
                self.flash = Some(Flash::success("Product added successfully"));
                self.reload().await
            }
            Err(e) if e.is_network() => self.fail(&e, "Error adding product!"),
            Err(e) => self.fail(&e, "Failed to add product"),
        }
    }

    /// Delete one of the user's products and reload the list.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete_product(&mut self, id: ProductId) -> Navigation {
        if let Some(redirect) = self.recheck_session() {
            return redirect;
        }

        match self.api.delete_product(id).await {
            Ok(()) => {
                tracing::info!(product_id = %id, "Product deleted");
                self.flash = Some(Flash::success("Product deleted successfully"));
                self.reload().await
            }
            Err(e) => self.fail(&e, "Failed to delete product"),
        }
    }

    /// Forget the session and go to login.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session store cannot be cleared.
    pub fn logout(self) -> Result<Navigation, SessionError> {
        self.store.clear()?;
        tracing::info!(user_id = %self.session.user_id(), "Logged out");
        Ok(Navigation::Redirect(Page::Login))
    }

    #[must_use]
    pub fn view_model(&self) -> DashboardViewModel {
        render_dashboard(
            self.session.first_name(),
            self.loaded.then_some(self.products.as_slice()),
            self.flash.clone(),
        )
    }

    /// Redirect if the session disappeared from the store since opening.
    fn recheck_session(&self) -> Option<Navigation> {
        match self.store.load() {
            Ok(Some(_)) => None,
            Ok(None) => {
                tracing::info!("Session gone; redirecting to login");
                Some(Navigation::Redirect(Page::Login))
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read session");
                Some(Navigation::Redirect(Page::Login))
            }
        }
    }

    /// Turn a failed request into a flash, or a redirect on 401.
    fn fail(&mut self, error: &ApiError, context: &str) -> Navigation {
        if error.is_unauthorized() {
            tracing::info!("Token rejected; clearing session");
            if let Err(e) = self.store.clear() {
                tracing::error!(error = %e, "Failed to clear session");
            }
            return Navigation::Redirect(Page::Login);
        }
        tracing::warn!(error = %error, "{context}");
        self.flash = Some(Flash::error(format!("{context}: {error}")));
        Navigation::Stay
    }
}

/// Map dashboard state to what the page shows.
///
/// `products` is `None` until a list fetch has succeeded, so a failed first
/// fetch does not masquerade as an empty list.
#[must_use]
pub fn render_dashboard(
    first_name: &str,
    products: Option<&[Product]>,
    flash: Option<Flash>,
) -> DashboardViewModel {
    let empty_message = match products {
        Some([]) => Some(EMPTY_STATE),
        _ => None,
    };
    DashboardViewModel {
        greeting: first_name.to_owned(),
        rows: products
            .unwrap_or_default()
            .iter()
            .map(dashboard_row)
            .collect(),
        empty_message,
        flash,
    }
}

fn dashboard_row(product: &Product) -> DashboardRow {
    DashboardRow {
        id: product.id,
        image_src: product
            .image
            .as_deref()
            .map(|image| format!("{UPLOADS_PREFIX}{image}")),
        name: product.name.clone(),
        description: product.description.clone(),
        price: product.price.to_string(),
        quantity: product.quantity,
        actions: vec![RowAction::Delete(product.id)],
    }
}
