//! Session root: the explicitly constructed composition of all stores.
//!
//! One `StorefrontSession` exists per running UI session. It owns the
//! persistence gateway and every store, giving them a clear init/teardown
//! lifecycle tied to the application root. There are no module-level
//! singletons; tests construct as many independent sessions as they like.

use tamarind_core::{LocalOrderId, ProductId};

use crate::backend::Backend;
use crate::cart::CartStore;
use crate::checkout::{CheckoutFlow, CheckoutOutcome};
use crate::favorites::FavoritesStore;
use crate::gateway::PersistenceGateway;
use crate::orders::{OrdersError, OrdersStore};

/// The per-session application root.
///
/// The cart is memory-only and starts empty; favorites and orders are
/// loaded from the gateway at construction.
#[derive(Debug)]
pub struct StorefrontSession<G: PersistenceGateway> {
    gateway: G,
    /// The session's cart.
    pub cart: CartStore,
    /// The session's favorites.
    pub favorites: FavoritesStore,
    /// The session's local order list.
    pub orders: OrdersStore,
    /// The session's checkout flow.
    pub checkout: CheckoutFlow,
}

impl<G: PersistenceGateway> StorefrontSession<G> {
    /// Construct a session over `gateway`, loading persisted state.
    #[must_use]
    pub fn new(gateway: G) -> Self {
        let favorites = FavoritesStore::load(&gateway);
        let orders = OrdersStore::load(&gateway);
        Self {
            gateway,
            cart: CartStore::new(),
            favorites,
            orders,
            checkout: CheckoutFlow::default(),
        }
    }

    /// The gateway this session persists through.
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Toggle a favorite, persisting through the session's gateway.
    pub fn toggle_favorite(&mut self, id: &ProductId) -> bool {
        self.favorites.toggle(&self.gateway, id)
    }

    /// Run the checkout flow against the session's cart.
    ///
    /// On success the placed order is recorded in the orders store and a
    /// watch is started for it.
    pub async fn place_order(&mut self, backend: &impl Backend) -> CheckoutOutcome {
        let outcome = self.checkout.submit(&mut self.cart, backend).await;

        if let CheckoutOutcome::Placed { order } = &outcome {
            self.orders.record_placed(&self.gateway, order.clone());
            self.orders.reconcile_watches(backend);
        }

        outcome
    }

    /// Remove an order from the local list (never from the backend).
    ///
    /// Destructive to local state; hosts should ask the shopper to confirm
    /// before calling.
    pub fn remove_order(&mut self, local_id: &LocalOrderId) {
        self.orders.remove(&self.gateway, local_id);
    }

    /// Ask the backend to cancel an order.
    ///
    /// # Errors
    ///
    /// See [`OrdersStore::request_cancellation`].
    pub async fn request_order_cancellation(
        &mut self,
        backend: &impl Backend,
        local_id: &LocalOrderId,
    ) -> Result<(), OrdersError> {
        self.orders
            .request_cancellation(&self.gateway, backend, local_id)
            .await
    }

    /// Merge any pending order status updates into local state.
    pub fn pump_order_updates(&mut self) {
        self.orders.pump_updates(&self.gateway);
    }

    /// Tear the session down, dropping all order watches.
    ///
    /// Dropping the session has the same effect; this exists for hosts
    /// that keep the session alive but leave the views that need watches.
    pub fn teardown(&mut self) {
        self.orders.teardown();
    }
}
