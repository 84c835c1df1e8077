//! Favorites, orders, and cancellation records across session restarts.

use rust_decimal::dec;
use tamarind_core::{LocalOrderId, ProductId};
use tamarind_integration_tests::{FakeBackend, init_tracing, product};
use tamarind_storefront::cart::ProductSelection;
use tamarind_storefront::gateway::{MemoryGateway, keys};
use tamarind_storefront::orders::OrdersError;
use tamarind_storefront::session::StorefrontSession;

#[test]
fn favorites_survive_restart_and_toggle_back_off() {
    init_tracing();
    let gateway = MemoryGateway::new();

    {
        let mut session = StorefrontSession::new(&gateway);
        assert!(session.toggle_favorite(&ProductId::new("A")));
        assert!(session.toggle_favorite(&ProductId::new("B")));
        // Toggle A back off before the "reload".
        assert!(!session.toggle_favorite(&ProductId::new("A")));
    }

    let session = StorefrontSession::new(&gateway);
    assert!(!session.favorites.is_favorite(&ProductId::new("A")));
    assert!(session.favorites.is_favorite(&ProductId::new("B")));
    assert_eq!(session.favorites.len(), 1);
}

#[test]
fn corrupt_storage_degrades_to_empty_stores() {
    let gateway = MemoryGateway::new();
    gateway.insert_raw(keys::FAVORITES, "42");
    gateway.insert_raw(keys::ORDERS, "{\"orders\": true}");

    let session = StorefrontSession::new(&gateway);
    assert!(session.favorites.is_empty());
    assert!(session.orders.orders().is_empty());
}

#[tokio::test]
async fn cancellation_request_is_durable_on_both_sides() {
    let gateway = MemoryGateway::new();
    let backend = FakeBackend::new();
    let mut session = StorefrontSession::new(&gateway);

    session
        .cart
        .add_item(&product("A", "Shirt", dec!(25), "tops"), ProductSelection::default());
    let form = session.checkout.form_mut();
    form.name = "Jo Shopper".to_owned();
    form.email = "jo@example.com".to_owned();
    form.phone = "555-0100".to_owned();
    form.address = "1 Main St".to_owned();
    assert!(session.place_order(&backend).await.is_placed());

    let id = session
        .orders
        .orders()
        .first()
        .expect("recorded")
        .order
        .local_id
        .clone();

    session
        .request_order_cancellation(&backend, &id)
        .await
        .expect("cancellation accepted");

    // Remote record captured.
    let requests = backend.cancellation_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests.first().expect("request").local_id, id);

    // Local flag and request record survive a reload.
    let restarted = StorefrontSession::new(&gateway);
    assert!(
        restarted
            .orders
            .order(&id)
            .expect("persisted")
            .cancellation_requested
    );
    assert!(
        gateway
            .raw(keys::CANCELLATION_REQUESTS)
            .expect("requests persisted")
            .contains(id.as_str())
    );
}

#[tokio::test]
async fn cancellation_with_unknown_id_fails_loudly_and_changes_nothing() {
    let gateway = MemoryGateway::new();
    let backend = FakeBackend::new();
    let mut session = StorefrontSession::new(&gateway);

    let err = session
        .request_order_cancellation(&backend, &LocalOrderId::new("ghost"))
        .await
        .expect_err("precondition failure");
    assert!(matches!(err, OrdersError::Precondition(_)));
    assert!(backend.cancellation_requests().is_empty());
    assert!(gateway.raw(keys::CANCELLATION_REQUESTS).is_none());
}

#[test]
fn write_failures_cost_durability_not_session_state() {
    let gateway = MemoryGateway::new();
    let mut session = StorefrontSession::new(&gateway);

    gateway.set_fail_writes(true);
    assert!(session.toggle_favorite(&ProductId::new("A")));
    assert!(session.favorites.is_favorite(&ProductId::new("A")));
    gateway.set_fail_writes(false);

    // The toggle never reached storage.
    let restarted = StorefrontSession::new(&gateway);
    assert!(restarted.favorites.is_empty());
}
