//! End-to-end checkout scenarios through the session root.

use std::time::Duration;

use rust_decimal::dec;
use tamarind_integration_tests::{CreateBehavior, FakeBackend, init_tracing, product};
use tamarind_storefront::cart::ProductSelection;
use tamarind_storefront::checkout::{CheckoutOutcome, CheckoutState};
use tamarind_storefront::gateway::MemoryGateway;
use tamarind_storefront::notice::NoticeKind;
use tamarind_storefront::session::StorefrontSession;

fn fill_contact_form(session: &mut StorefrontSession<&MemoryGateway>) {
    let form = session.checkout.form_mut();
    form.name = "Jo Shopper".to_owned();
    form.email = "jo@example.com".to_owned();
    form.phone = "555-0100".to_owned();
    form.address = "1 Main St".to_owned();
}

#[tokio::test]
async fn placing_an_order_records_it_and_starts_a_watch() {
    init_tracing();
    let gateway = MemoryGateway::new();
    let backend = FakeBackend::new();
    let mut session = StorefrontSession::new(&gateway);

    let shirt = product("A", "Shirt", dec!(25), "tops");
    session.cart.add_item(&shirt, ProductSelection::default());
    session.cart.add_item(&shirt, ProductSelection::default());
    fill_contact_form(&mut session);

    let outcome = session.place_order(&backend).await;
    assert!(outcome.is_placed());
    assert_eq!(outcome.notice().kind, NoticeKind::Success);

    // Cart cleared, form reset, flow back to Idle.
    assert!(session.cart.is_empty());
    assert!(session.checkout.form().name.is_empty());
    assert_eq!(session.checkout.state(), CheckoutState::Idle);

    // Exactly one backend write with the full snapshot.
    let created = backend.created_orders();
    assert_eq!(created.len(), 1);
    let draft = created.first().expect("one draft");
    assert_eq!(draft.items.len(), 1);
    assert_eq!(draft.items.first().expect("one line").qty, 2);
    assert_eq!(draft.total.amount, dec!(50));

    // Recorded locally with an active watch.
    assert_eq!(session.orders.orders().len(), 1);
    assert_eq!(session.orders.active_watch_count(), 1);
    assert_eq!(backend.open_watches(), 1);

    // And the order list survives a reload.
    let restarted = StorefrontSession::new(&gateway);
    assert_eq!(restarted.orders.orders().len(), 1);
}

#[tokio::test]
async fn failed_submission_preserves_cart_and_allows_reattempt() {
    init_tracing();
    let gateway = MemoryGateway::new();
    let backend = FakeBackend::new();
    backend.set_behavior(CreateBehavior::Fail);
    let mut session = StorefrontSession::new(&gateway);

    session
        .cart
        .add_item(&product("A", "Shirt", dec!(25), "tops"), ProductSelection::default());
    fill_contact_form(&mut session);

    let outcome = session.place_order(&backend).await;
    assert!(matches!(outcome, CheckoutOutcome::Failed { .. }));
    assert_eq!(outcome.notice().kind, NoticeKind::Error);

    // Nothing recorded, nothing cleared; the shopper does not re-type.
    assert!(session.orders.orders().is_empty());
    assert_eq!(session.cart.len(), 1);
    assert_eq!(session.checkout.form().name, "Jo Shopper");

    // A second click is an independent attempt.
    backend.set_behavior(CreateBehavior::Succeed);
    let outcome = session.place_order(&backend).await;
    assert!(outcome.is_placed());
    assert_eq!(backend.created_orders().len(), 1);
    assert_eq!(session.orders.orders().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn hung_submission_times_out_instead_of_wedging() {
    let gateway = MemoryGateway::new();
    let backend = FakeBackend::new();
    backend.set_behavior(CreateBehavior::Hang);
    let mut session = StorefrontSession::new(&gateway);

    session
        .cart
        .add_item(&product("A", "Shirt", dec!(25), "tops"), ProductSelection::default());
    fill_contact_form(&mut session);

    let outcome = session.place_order(&backend).await;
    assert!(matches!(outcome, CheckoutOutcome::Failed { .. }));
    assert_eq!(session.checkout.state(), CheckoutState::Idle);
    assert_eq!(session.cart.len(), 1);
    assert!(session.orders.orders().is_empty());
}

#[tokio::test]
async fn validation_rejection_never_reaches_the_backend() {
    let gateway = MemoryGateway::new();
    let backend = FakeBackend::new();
    let mut session = StorefrontSession::new(&gateway);

    // Empty form AND empty cart: the missing-field check fires first.
    let outcome = session.place_order(&backend).await;
    let CheckoutOutcome::Rejected { error } = outcome else {
        panic!("expected a validation rejection");
    };
    assert!(error.to_string().contains("name"));
    assert!(backend.created_orders().is_empty());
}

#[tokio::test]
async fn submitted_snapshot_is_isolated_from_the_cart() {
    let gateway = MemoryGateway::new();
    let backend = FakeBackend::new();
    let mut session = StorefrontSession::new(&gateway);

    session
        .cart
        .add_item(&product("A", "Shirt", dec!(10), "tops"), ProductSelection::default());
    fill_contact_form(&mut session);

    let outcome = session.place_order(&backend).await;
    assert!(outcome.is_placed());

    // Refill the cleared cart; the recorded order must not move.
    session
        .cart
        .add_item(&product("B", "Hat", dec!(99), "accessories"), ProductSelection::default());
    session.cart.increase_qty(&tamarind_core::ProductId::new("B"));

    let recorded = session.orders.orders().first().expect("recorded order");
    assert_eq!(recorded.order.items.len(), 1);
    assert_eq!(recorded.order.items.first().expect("line").id.as_str(), "A");
    assert_eq!(recorded.order.total.amount, dec!(10));
}

#[tokio::test(start_paused = true)]
async fn submission_timeout_is_configurable() {
    let gateway = MemoryGateway::new();
    let backend = FakeBackend::new();
    backend.set_behavior(CreateBehavior::Hang);
    let mut session = StorefrontSession::new(&gateway);
    session.checkout = tamarind_storefront::checkout::CheckoutFlow::new(Duration::from_secs(1));

    session
        .cart
        .add_item(&product("A", "Shirt", dec!(25), "tops"), ProductSelection::default());
    fill_contact_form(&mut session);

    let started = tokio::time::Instant::now();
    let outcome = session.place_order(&backend).await;
    assert!(matches!(outcome, CheckoutOutcome::Failed { .. }));
    assert_eq!(started.elapsed(), Duration::from_secs(1));
}
