//! Wire types for the external document store.
//!
//! Field names serialize in camelCase to match the backend's existing
//! collections; this crate does not own the wire shape, it follows it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tamarind_core::{CategoryId, Email, LocalOrderId, OrderId, OrderStatus, Price, ProductId};

use crate::cart::CartLine;

/// A product document from the products collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Backend-assigned product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Image URL, if any.
    pub image: Option<String>,
    /// Category the product is browsed under.
    #[serde(default)]
    pub category: Option<CategoryId>,
    /// Available sizes, possibly empty.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Available colors, possibly empty.
    #[serde(default)]
    pub colors: Vec<String>,
}

/// Contact details captured by the checkout form, validated before
/// submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Full name.
    pub name: String,
    /// Validated email address.
    pub email: Email,
    /// Phone number (free-form, only checked non-empty).
    pub phone: String,
    /// Delivery address (free-form, only checked non-empty).
    pub address: String,
}

/// An order as submitted to the backend's create-order operation.
///
/// `items` and `total` are deep copies of the cart at submission time;
/// later cart mutations never affect a submitted draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    /// Client-generated identifier, used as the watch key.
    pub local_id: LocalOrderId,
    /// Contact details.
    pub client: ClientInfo,
    /// Snapshot of the cart's line items.
    pub items: Vec<CartLine>,
    /// Snapshot of the cart subtotal.
    pub total: Price,
    /// Submission time.
    pub timestamp: DateTime<Utc>,
}

/// An order as it exists after the backend acknowledged the write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// Backend-assigned identifier.
    pub id: OrderId,
    /// Client-generated identifier, used as the watch key.
    pub local_id: LocalOrderId,
    /// Contact details snapshot.
    pub client: ClientInfo,
    /// Line item snapshot.
    pub items: Vec<CartLine>,
    /// Subtotal snapshot.
    pub total: Price,
    /// Last status change time (creation time until the backend updates it).
    pub timestamp: DateTime<Utc>,
    /// Fulfillment status, owned by the order-management side.
    #[serde(default)]
    pub status: OrderStatus,
}

impl OrderRecord {
    /// Build the record for a freshly acknowledged draft.
    #[must_use]
    pub fn placed(id: OrderId, draft: OrderDraft) -> Self {
        Self {
            id,
            local_id: draft.local_id,
            client: draft.client,
            items: draft.items,
            total: draft.total,
            timestamp: draft.timestamp,
            status: OrderStatus::Pending,
        }
    }
}

/// A cancellation-request record appended to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationRequest {
    /// Local id of the order the shopper wants cancelled.
    pub local_id: LocalOrderId,
    /// When the request was made.
    pub timestamp: DateTime<Utc>,
}

/// A status change pushed by an order watch.
///
/// Only these two fields are ever merged into the local order record;
/// items and client info remain the local snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    /// New fulfillment status.
    pub status: OrderStatus,
    /// When the backend recorded the change.
    pub timestamp: DateTime<Utc>,
}

/// Opaque pagination cursor handed back by product queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a raw cursor string.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw cursor string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Filters for a product query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductFilters {
    /// Restrict to one category.
    pub category: Option<CategoryId>,
    /// Restrict to names starting with this prefix.
    pub name_prefix: Option<String>,
    /// Resume from an earlier page's cursor.
    pub cursor: Option<Cursor>,
    /// Maximum products per page.
    pub page_size: u32,
}

impl Default for ProductFilters {
    fn default() -> Self {
        Self {
            category: None,
            name_prefix: None,
            cursor: None,
            page_size: 24,
        }
    }
}

/// One page of a product query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    /// Products on this page.
    pub products: Vec<Product>,
    /// Cursor for the next page, if there is one.
    pub next_cursor: Option<Cursor>,
}
