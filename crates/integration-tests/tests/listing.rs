//! Integration tests for the public product listing.

use std::num::NonZeroU32;

use marketplace_client::views::ListingView;
use marketplace_client::{ApiClient, ClientConfig, MarketplaceApi};
use marketplace_integration_tests::StubBackend;

fn page_size(n: u32) -> NonZeroU32 {
    NonZeroU32::new(n).expect("page size is positive")
}

// ============================================================================
// Pagination
// ============================================================================

#[tokio::test]
async fn test_load_fetches_total_then_first_page() {
    let backend = StubBackend::start().await;
    backend.seed_listing(25);

    let mut view = ListingView::new(backend.api(), page_size(10));
    view.load().await;

    assert_eq!(backend.hits("GET /total_pages"), 1);
    assert_eq!(backend.listing_queries(), vec![(0, 10)]);

    let model = view.view_model();
    assert_eq!(model.rows.len(), 10);
    assert_eq!(model.rows[0].name, "Product 1");
    assert_eq!(model.rows[0].price, "10.50");
    assert_eq!(model.page_label, "Page: 1 of 3");
    assert!(!model.prev_enabled);
    assert!(model.next_enabled);
    assert_eq!(model.flash, None);
}

#[tokio::test]
async fn test_next_twice_reaches_last_page() {
    let backend = StubBackend::start().await;
    backend.seed_listing(25);

    let mut view = ListingView::new(backend.api(), page_size(10));
    view.load().await;
    assert!(view.next().await);
    assert!(view.next().await);

    assert_eq!(backend.listing_queries(), vec![(0, 10), (10, 10), (20, 10)]);
    let model = view.view_model();
    assert_eq!(model.page_label, "Page: 3 of 3");
    assert_eq!(model.rows.len(), 5);
    assert!(model.prev_enabled);
    assert!(!model.next_enabled);

    // Disabled button: no request is made.
    assert!(!view.next().await);
    assert_eq!(backend.hits("GET /products"), 3);
    // The total is only fetched on load.
    assert_eq!(backend.hits("GET /total_pages"), 1);
}

#[tokio::test]
async fn test_prev_on_first_page_does_nothing() {
    let backend = StubBackend::start().await;
    backend.seed_listing(15);

    let mut view = ListingView::new(backend.api(), page_size(10));
    view.load().await;
    assert!(!view.prev().await);
    assert_eq!(backend.hits("GET /products"), 1);

    assert!(view.next().await);
    assert!(view.prev().await);
    assert_eq!(backend.listing_queries(), vec![(0, 10), (10, 10), (0, 10)]);
    assert_eq!(view.view_model().page_label, "Page: 1 of 2");
}

#[tokio::test]
async fn test_empty_listing_fetches_no_page() {
    let backend = StubBackend::start().await;

    let mut view = ListingView::new(backend.api(), page_size(10));
    view.load().await;

    assert_eq!(backend.hits("GET /total_pages"), 1);
    assert_eq!(backend.hits("GET /products"), 0);

    let model = view.view_model();
    assert!(model.rows.is_empty());
    assert_eq!(model.page_label, "Page: 0 of 0");
    assert!(!model.prev_enabled);
    assert!(!model.next_enabled);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn test_stale_page_response_is_discarded() {
    let backend = StubBackend::start().await;
    backend.seed_listing(30);

    let mut view = ListingView::new(backend.api(), page_size(10));
    view.load().await;

    // Two clicks in quick succession: page 2 is issued after page 1, and
    // page 1's response arrives last.
    let older = view.request_page(1).expect("page 1 exists");
    let newer = view.request_page(2).expect("page 2 exists");
    let api = view.api().clone();
    let (older_result, newer_result) = tokio::join!(
        api.products(older.skip, older.limit),
        api.products(newer.skip, newer.limit),
    );

    assert!(view.apply_page(newer, newer_result));
    assert!(!view.apply_page(older, older_result));

    assert_eq!(view.cursor().page_index(), 2);
    let model = view.view_model();
    assert_eq!(model.page_label, "Page: 3 of 3");
    assert_eq!(model.rows[0].name, "Product 21");
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_unreachable_backend_disables_navigation() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let addr = listener.local_addr().expect("Listener has no address");
    drop(listener);

    let config = ClientConfig::for_api_url(&format!("http://{addr}")).expect("Valid URL");
    let api = MarketplaceApi::new(ApiClient::new(&config).expect("Failed to build client"));
    let mut view = ListingView::new(api, page_size(10));
    view.load().await;

    let model = view.view_model();
    assert!(model.rows.is_empty());
    assert_eq!(model.page_label, "Page: 0 of 0");
    assert!(!model.prev_enabled);
    assert!(!model.next_enabled);
    let flash = model.flash.expect("failure is reported");
    assert!(flash.text.starts_with("Error fetching total pages"));
}
