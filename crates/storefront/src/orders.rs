//! Orders store.
//!
//! Maintains the shopper's locally visible order list and keeps each
//! order's status in sync with the backend. Every order in the list has
//! exactly one active watch subscription; removing an order (or tearing the
//! store down) drops its watch, so no dangling subscriptions survive the
//! list they belong to.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tamarind_core::LocalOrderId;
use thiserror::Error;
use tracing::instrument;

use crate::backend::{Backend, BackendError, CancellationRequest, OrderRecord, OrderWatch};
use crate::gateway::{self, PersistenceGateway, keys};

/// A required precondition did not hold; fatal to that single operation,
/// surfaced immediately, and corrupts nothing else.
#[derive(Debug, Clone, Error)]
pub enum PreconditionError {
    /// The caller passed an empty order id.
    #[error("no order id provided")]
    MissingOrderId,

    /// The id does not match any order in the local list.
    #[error("order {0} is not in your order list")]
    UnknownOrder(LocalOrderId),
}

/// Errors surfaced by orders-store operations.
#[derive(Debug, Error)]
pub enum OrdersError {
    /// A precondition check failed before anything happened.
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    /// The backend write failed; the operation can be re-attempted.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// An order as the shopper sees it locally.
///
/// The record is the snapshot taken at placement; only `status` and
/// `timestamp` are ever refreshed from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalOrder {
    /// The placed-order snapshot.
    #[serde(flatten)]
    pub order: OrderRecord,
    /// Whether the shopper has asked for this order to be cancelled.
    #[serde(default)]
    pub cancellation_requested: bool,
}

/// The locally persisted order list plus its active status watches.
#[derive(Debug, Default)]
pub struct OrdersStore {
    orders: Vec<LocalOrder>,
    watches: HashMap<LocalOrderId, OrderWatch>,
}

impl OrdersStore {
    /// Load the persisted order list, falling back to empty on any failure.
    ///
    /// Watches are not started here; call
    /// [`reconcile_watches`](Self::reconcile_watches) once a backend is
    /// available.
    #[must_use]
    pub fn load(gateway: &impl PersistenceGateway) -> Self {
        Self {
            orders: gateway::load_collection(gateway, keys::ORDERS),
            watches: HashMap::new(),
        }
    }

    /// The local orders, oldest first.
    #[must_use]
    pub fn orders(&self) -> &[LocalOrder] {
        &self.orders
    }

    /// Look up a local order by its local id.
    #[must_use]
    pub fn order(&self, local_id: &LocalOrderId) -> Option<&LocalOrder> {
        self.orders.iter().find(|o| o.order.local_id == *local_id)
    }

    /// Number of active watch subscriptions.
    ///
    /// After a reconcile this always equals the number of local orders.
    #[must_use]
    pub fn active_watch_count(&self) -> usize {
        self.watches.len()
    }

    /// Record a freshly placed order and persist the list.
    pub fn record_placed(&mut self, gateway: &impl PersistenceGateway, order: OrderRecord) {
        self.orders.push(LocalOrder {
            order,
            cancellation_requested: false,
        });
        self.persist(gateway);
    }

    /// Remove an order from the local view only.
    ///
    /// Tears down its watch and persists the shrunken list. The remote
    /// record is never deleted. No-op if the id is absent.
    pub fn remove(&mut self, gateway: &impl PersistenceGateway, local_id: &LocalOrderId) {
        let before = self.orders.len();
        self.orders.retain(|o| o.order.local_id != *local_id);
        self.watches.remove(local_id);
        if self.orders.len() != before {
            self.persist(gateway);
        }
    }

    /// Ask the backend to cancel an order.
    ///
    /// Appends a cancellation record remotely and locally, and marks the
    /// order. The id must be non-empty and present in the local list;
    /// otherwise this fails loudly with a [`PreconditionError`] before
    /// contacting anything.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersError::Precondition`] on a bad id and
    /// [`OrdersError::Backend`] if the remote write fails (state untouched,
    /// safe to re-attempt).
    #[instrument(skip(self, gateway, backend))]
    pub async fn request_cancellation(
        &mut self,
        gateway: &impl PersistenceGateway,
        backend: &impl Backend,
        local_id: &LocalOrderId,
    ) -> Result<(), OrdersError> {
        if local_id.as_str().is_empty() {
            return Err(PreconditionError::MissingOrderId.into());
        }
        if self.order(local_id).is_none() {
            return Err(PreconditionError::UnknownOrder(local_id.clone()).into());
        }

        let request = CancellationRequest {
            local_id: local_id.clone(),
            timestamp: Utc::now(),
        };
        backend.create_cancellation_request(request.clone()).await?;

        // Remote write acknowledged; now mark and persist locally.
        if let Some(order) = self
            .orders
            .iter_mut()
            .find(|o| o.order.local_id == *local_id)
        {
            order.cancellation_requested = true;
        }
        self.persist(gateway);

        let mut requests: Vec<CancellationRequest> =
            gateway::load_collection(gateway, keys::CANCELLATION_REQUESTS);
        requests.push(request);
        gateway::store_collection(gateway, keys::CANCELLATION_REQUESTS, &requests);

        Ok(())
    }

    /// Bring the watch set in line with the order list.
    ///
    /// Subscribes every order that lacks a watch and drops every watch
    /// whose order is gone. Afterwards the watch count equals the order
    /// count.
    pub fn reconcile_watches(&mut self, backend: &impl Backend) {
        let orders = &self.orders;
        self.watches
            .retain(|id, _| orders.iter().any(|o| o.order.local_id == *id));

        for order in &self.orders {
            let id = &order.order.local_id;
            if !self.watches.contains_key(id) {
                self.watches.insert(id.clone(), backend.watch_order(id));
            }
        }
    }

    /// Drain all watches and merge pending status changes.
    ///
    /// Only `status` and `timestamp` are merged; items and client info are
    /// the local snapshot and are never overwritten. Persists once if
    /// anything changed.
    pub fn pump_updates(&mut self, gateway: &impl PersistenceGateway) {
        let mut changed = false;

        for (id, watch) in &mut self.watches {
            let Some(update) = watch.try_latest() else {
                continue;
            };
            let Some(order) = self.orders.iter_mut().find(|o| o.order.local_id == *id) else {
                continue;
            };
            if order.order.status != update.status || order.order.timestamp != update.timestamp {
                order.order.status = update.status;
                order.order.timestamp = update.timestamp;
                changed = true;
            }
        }

        if changed {
            self.persist(gateway);
        }
    }

    /// Drop every watch subscription.
    ///
    /// Called when the store goes away (e.g., navigating off the orders
    /// view). Dropping the store has the same effect.
    pub fn teardown(&mut self) {
        self.watches.clear();
    }

    fn persist(&self, gateway: &impl PersistenceGateway) {
        gateway::store_collection(gateway, keys::ORDERS, &self.orders);
    }
}
