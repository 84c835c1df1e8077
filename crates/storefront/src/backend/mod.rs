//! External document-store boundary.
//!
//! The backend owns all remote persistence: the products, orders, and
//! cancellation-request collections. This module defines the interface the
//! stores need ([`Backend`]), the wire types, the push-based order watch
//! handle, and a JSON REST client implementation
//! ([`DocumentStoreClient`]).
//!
//! Everything here is fallible and reports failure as a [`BackendError`];
//! nothing panics on remote misbehavior.

mod document;
mod types;

pub use document::DocumentStoreClient;
pub use types::{
    CancellationRequest, ClientInfo, Cursor, OrderDraft, OrderRecord, OrderUpdate, Product,
    ProductFilters, ProductPage,
};

use std::time::Duration;

use tamarind_core::{LocalOrderId, OrderId};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur when talking to the document store.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Backend returned a non-success status.
    #[error("backend returned status {code}: {body}")]
    Status {
        /// HTTP status code.
        code: u16,
        /// Truncated response body for diagnostics.
        body: String,
    },

    /// Rate limited by the backend.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The call did not complete within the deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The backend could not be reached or refused the operation.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// The remote document store, as the stores see it.
///
/// Creation is append-only; status mutation on orders is performed
/// exclusively by the external order-management side and observed through
/// [`Backend::watch_order`].
#[allow(async_fn_in_trait)]
pub trait Backend {
    /// Append an order to the order collection.
    ///
    /// Returns the backend-assigned order id on an acknowledged write.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the write is not acknowledged.
    async fn create_order(&self, draft: OrderDraft) -> Result<OrderId, BackendError>;

    /// Append a cancellation request to its collection.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the write is not acknowledged.
    async fn create_cancellation_request(
        &self,
        request: CancellationRequest,
    ) -> Result<(), BackendError>;

    /// Query the product collection with `filters`.
    ///
    /// # Errors
    ///
    /// Returns a [`BackendError`] if the query fails.
    async fn query_products(&self, filters: &ProductFilters) -> Result<ProductPage, BackendError>;

    /// Subscribe to status changes for the order with `local_id`.
    ///
    /// Updates are pushed into the returned handle until it is dropped;
    /// dropping the handle is the unsubscribe.
    fn watch_order(&self, local_id: &LocalOrderId) -> OrderWatch;
}

/// A live subscription to one order's status changes.
///
/// Owned by the orders store, one per local order. Dropping the handle
/// tears the subscription down; the backend observes the closed channel and
/// stops delivering.
#[derive(Debug)]
pub struct OrderWatch {
    local_id: LocalOrderId,
    rx: mpsc::UnboundedReceiver<OrderUpdate>,
}

impl OrderWatch {
    /// Create a watch handle and the sender the backend delivers into.
    #[must_use]
    pub fn channel(local_id: LocalOrderId) -> (Self, mpsc::UnboundedSender<OrderUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { local_id, rx }, tx)
    }

    /// The order this watch is keyed by.
    #[must_use]
    pub const fn local_id(&self) -> &LocalOrderId {
        &self.local_id
    }

    /// Drain pending updates without blocking, returning the newest.
    ///
    /// Intermediate updates are superseded; only the latest status
    /// matters to the local record.
    pub fn try_latest(&mut self) -> Option<OrderUpdate> {
        let mut latest = None;
        while let Ok(update) = self.rx.try_recv() {
            latest = Some(update);
        }
        latest
    }
}
