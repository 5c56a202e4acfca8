//! Paginated product listing.
//!
//! Load order is total page count first, then page 0. Moving between pages
//! re-fetches only the page; the total is fetched once per load.

use std::num::NonZeroU32;

use marketplace_core::{PageCursor, Product, ProductId};
use tracing::instrument;

use super::{Flash, RequestSeq, Ticket};
use crate::api::{ApiError, MarketplaceApi};

/// One table row of the public listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRow {
    pub id: ProductId,
    pub image: Option<String>,
    pub name: String,
    pub description: String,
    pub price: String,
    pub quantity: i32,
}

/// Everything the listing page displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingViewModel {
    pub rows: Vec<ListingRow>,
    pub page_label: String,
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub flash: Option<Flash>,
}

/// A page fetch that has been issued but not yet applied.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    ticket: Ticket,
    pub page_index: u32,
    pub skip: u64,
    pub limit: NonZeroU32,
}

/// State of the public listing page.
pub struct ListingView {
    api: MarketplaceApi,
    cursor: PageCursor,
    products: Vec<Product>,
    seq: RequestSeq,
    flash: Option<Flash>,
}

impl ListingView {
    #[must_use]
    pub fn new(api: MarketplaceApi, page_size: NonZeroU32) -> Self {
        Self {
            api,
            cursor: PageCursor::new(page_size),
            products: Vec::new(),
            seq: RequestSeq::new(),
            flash: None,
        }
    }

    #[must_use]
    pub const fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    #[must_use]
    pub const fn api(&self) -> &MarketplaceApi {
        &self.api
    }

    /// Initial load: fetch the page count, then the first page if any.
    #[instrument(level = "debug", skip(self))]
    pub async fn load(&mut self) {
        let total = self.api.total_pages(self.cursor.page_size()).await;
        self.apply_total_pages(total);
        if self.cursor.has_pages() {
            self.show_page(0).await;
        }
    }

    /// Record the outcome of the total-pages fetch.
    ///
    /// On failure the total stays unknown, so both directions stay disabled.
    pub fn apply_total_pages(&mut self, result: Result<u32, ApiError>) {
        match result {
            Ok(total) => {
                tracing::debug!(total, "Total pages fetched");
                self.cursor.set_total_pages(total);
                if total == 0 {
                    self.products.clear();
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch total pages");
                self.flash = Some(Flash::error(format!("Error fetching total pages: {e}")));
            }
        }
    }

    /// Issue a fetch for `page_index`.
    ///
    /// Returns `None` if the page is out of range (or the total is unknown).
    /// Issuing a request makes every earlier outstanding request stale.
    #[must_use]
    pub fn request_page(&self, page_index: u32) -> Option<PageRequest> {
        if !self.cursor.contains(page_index) {
            return None;
        }
        Some(PageRequest {
            ticket: self.seq.issue(),
            page_index,
            skip: self.cursor.offset_of(page_index),
            limit: self.cursor.page_size(),
        })
    }

    /// Apply the response to `request`.
    ///
    /// Returns `false` if a newer request has been issued since, in which
    /// case the response is dropped and nothing changes. A failed fetch
    /// keeps the current rows and page.
    pub fn apply_page(
        &mut self,
        request: PageRequest,
        result: Result<Vec<Product>, ApiError>,
    ) -> bool {
        if !self.seq.is_current(request.ticket) {
            tracing::debug!(page = request.page_index, "Discarding stale page response");
            return false;
        }
        match result {
            Ok(products) => {
                self.cursor.move_to(request.page_index);
                self.products = products;
                self.flash = None;
            }
            Err(e) => {
                tracing::warn!(page = request.page_index, error = %e, "Failed to fetch products");
                self.flash = Some(Flash::error(format!("Error fetching products: {e}")));
            }
        }
        true
    }

    /// Fetch and display `page_index`. Returns `false` if it was out of range.
    pub async fn show_page(&mut self, page_index: u32) -> bool {
        let Some(request) = self.request_page(page_index) else {
            return false;
        };
        let result = self.api.products(request.skip, request.limit).await;
        self.apply_page(request, result)
    }

    /// Advance one page. Does nothing when the next button is disabled.
    pub async fn next(&mut self) -> bool {
        match self.cursor.next_index() {
            Some(index) => self.show_page(index).await,
            None => false,
        }
    }

    /// Go back one page. Does nothing when the previous button is disabled.
    pub async fn prev(&mut self) -> bool {
        match self.cursor.prev_index() {
            Some(index) => self.show_page(index).await,
            None => false,
        }
    }

    #[must_use]
    pub fn view_model(&self) -> ListingViewModel {
        render_listing(&self.cursor, &self.products, self.flash.clone())
    }
}

/// Map listing state to what the page shows.
#[must_use]
pub fn render_listing(
    cursor: &PageCursor,
    products: &[Product],
    flash: Option<Flash>,
) -> ListingViewModel {
    let rows = if cursor.has_pages() {
        products.iter().map(listing_row).collect()
    } else {
        Vec::new()
    };
    ListingViewModel {
        rows,
        page_label: cursor.label(),
        prev_enabled: cursor.can_prev(),
        next_enabled: cursor.can_next(),
        flash,
    }
}

fn listing_row(product: &Product) -> ListingRow {
    ListingRow {
        id: product.id,
        image: product.image.clone(),
        name: product.name.clone(),
        description: product.description.clone(),
        price: product.price.to_string(),
        quantity: product.quantity,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use marketplace_core::Price;
    use reqwest::StatusCode;

    use super::*;
    use crate::api::ApiClient;
    use crate::config::ClientConfig;

    fn view(page_size: u32) -> ListingView {
        let config = ClientConfig::for_api_url("http://127.0.0.1:1").unwrap();
        let api = MarketplaceApi::new(ApiClient::new(&config).unwrap());
        ListingView::new(api, NonZeroU32::new(page_size).unwrap())
    }

    fn product(id: i32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Item {id}"),
            description: "desc".to_owned(),
            price: "3.5".parse::<Price>().unwrap(),
            quantity: id,
            image: Some(format!("{id}.png")),
            owner_address: None,
        }
    }

    fn http_error() -> ApiError {
        ApiError::Http {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "boom".to_owned(),
            body: None,
        }
    }

    #[test]
    fn test_initial_state_disables_everything() {
        let model = view(10).view_model();
        assert!(model.rows.is_empty());
        assert!(!model.prev_enabled);
        assert!(!model.next_enabled);
        assert_eq!(model.page_label, "Page: 0 of 0");
    }

    #[test]
    fn test_zero_total_pages_issues_no_page_request() {
        let mut view = view(10);
        view.apply_total_pages(Ok(0));
        assert!(view.request_page(0).is_none());

        let model = view.view_model();
        assert!(model.rows.is_empty());
        assert!(!model.prev_enabled);
        assert!(!model.next_enabled);
    }

    #[test]
    fn test_request_page_computes_skip() {
        let mut view = view(10);
        view.apply_total_pages(Ok(5));
        let request = view.request_page(3).unwrap();
        assert_eq!(request.skip, 30);
        assert_eq!(request.limit.get(), 10);
        assert!(view.request_page(5).is_none());
    }

    #[test]
    fn test_apply_page_renders_rows_and_buttons() {
        let mut view = view(2);
        view.apply_total_pages(Ok(3));

        let request = view.request_page(0).unwrap();
        assert!(view.apply_page(request, Ok(vec![product(1), product(2)])));

        let model = view.view_model();
        assert_eq!(model.page_label, "Page: 1 of 3");
        assert!(!model.prev_enabled);
        assert!(model.next_enabled);
        assert_eq!(model.rows.len(), 2);
        assert_eq!(model.rows[0].price, "3.50");
        assert_eq!(model.rows[1].image.as_deref(), Some("2.png"));
    }

    #[test]
    fn test_walk_to_last_page_disables_next() {
        let mut view = view(1);
        view.apply_total_pages(Ok(3));
        for index in 0..3 {
            let request = view.request_page(index).unwrap();
            view.apply_page(request, Ok(vec![product(i32::try_from(index).unwrap())]));
        }
        let model = view.view_model();
        assert_eq!(view.cursor().page_index(), 2);
        assert_eq!(model.page_label, "Page: 3 of 3");
        assert!(model.prev_enabled);
        assert!(!model.next_enabled);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut view = view(1);
        view.apply_total_pages(Ok(3));

        let older = view.request_page(1).unwrap();
        let newer = view.request_page(2).unwrap();

        assert!(view.apply_page(newer, Ok(vec![product(3)])));
        assert!(!view.apply_page(older, Ok(vec![product(2)])));

        assert_eq!(view.cursor().page_index(), 2);
        assert_eq!(view.view_model().rows[0].id, ProductId::new(3));
    }

    #[test]
    fn test_failed_page_keeps_previous_rows() {
        let mut view = view(1);
        view.apply_total_pages(Ok(2));
        let first = view.request_page(0).unwrap();
        view.apply_page(first, Ok(vec![product(1)]));

        let second = view.request_page(1).unwrap();
        assert!(view.apply_page(second, Err(http_error())));

        let model = view.view_model();
        assert_eq!(view.cursor().page_index(), 0);
        assert_eq!(model.rows[0].id, ProductId::new(1));
        assert!(model.flash.unwrap().text.contains("boom"));
    }

    #[test]
    fn test_failed_total_pages_sets_flash() {
        let mut view = view(10);
        view.apply_total_pages(Err(http_error()));
        let model = view.view_model();
        assert!(model.flash.is_some());
        assert!(!model.next_enabled);
    }

    #[tokio::test]
    async fn test_next_and_prev_are_noops_when_disabled() {
        let mut view = view(10);
        view.apply_total_pages(Ok(1));
        assert!(!view.next().await);
        assert!(!view.prev().await);
    }
}
