//! JSON REST client for the external document store.
//!
//! Speaks plain JSON to the store's collection endpoints with `reqwest`.
//! Product query responses are cached in a client-owned `moka` TTL cache;
//! there is no module-level cache state. Order watches are implemented by
//! polling the order document and pushing changes into the watch channel
//! until the handle is dropped.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tamarind_core::{LocalOrderId, OrderId};
use tracing::{debug, instrument};
use url::Url;

use crate::config::BackendConfig;

use super::types::{
    CancellationRequest, OrderDraft, OrderUpdate, ProductFilters, ProductPage,
};
use super::{Backend, BackendError, OrderWatch};

const ORDERS_COLLECTION: &str = "orders";
const CANCELLATIONS_COLLECTION: &str = "cancellationRequests";
const PRODUCTS_COLLECTION: &str = "products";

/// Query-response envelope used by every collection endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentsResponse<T> {
    documents: Vec<T>,
    #[serde(default)]
    next_cursor: Option<super::Cursor>,
}

/// Acknowledgement of an append-only write.
#[derive(Debug, Deserialize)]
struct CreatedDocument {
    id: String,
}

/// Order document projection used by the watch poller.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderStatusDocument {
    #[serde(default)]
    status: tamarind_core::OrderStatus,
    timestamp: chrono::DateTime<chrono::Utc>,
}

/// Client for the external document store's REST API.
///
/// Cheaply cloneable via `Arc`. Product queries are cached for the
/// configured TTL, keyed by the full filter shape.
#[derive(Clone)]
pub struct DocumentStoreClient {
    inner: Arc<DocumentStoreClientInner>,
}

struct DocumentStoreClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
    product_cache: moka::future::Cache<ProductFilters, ProductPage>,
    poll_interval: Duration,
}

impl DocumentStoreClient {
    /// Create a new client from backend configuration.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let product_cache = moka::future::Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.product_cache_ttl)
            .build();

        Self {
            inner: Arc::new(DocumentStoreClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                api_key: config.api_key.clone(),
                product_cache,
                poll_interval: config.poll_interval,
            }),
        }
    }

    fn collection_url(&self, collection: &str) -> Result<Url, BackendError> {
        self.inner
            .base_url
            .join(&format!("collections/{collection}/documents"))
            .map_err(|e| BackendError::Unavailable(format!("invalid collection URL: {e}")))
    }

    /// Read a response body, mapping non-success statuses before parsing.
    async fn read_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited(retry_after));
        }

        // Body first, so error diagnostics can include it.
        let body = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(body.chars().take(200).collect()));
        }

        if !status.is_success() {
            return Err(BackendError::Status {
                code: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn post_document<B, T>(&self, collection: &str, body: &B) -> Result<T, BackendError>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.collection_url(collection)?;
        let response = self
            .inner
            .client
            .post(url)
            .header("X-Api-Key", self.inner.api_key.expose_secret())
            .json(body)
            .send()
            .await?;
        Self::read_response(response).await
    }

    async fn get_documents<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &[(&str, String)],
    ) -> Result<DocumentsResponse<T>, BackendError> {
        let url = self.collection_url(collection)?;
        let response = self
            .inner
            .client
            .get(url)
            .header("X-Api-Key", self.inner.api_key.expose_secret())
            .query(query)
            .send()
            .await?;
        Self::read_response(response).await
    }

    async fn fetch_products(&self, filters: &ProductFilters) -> Result<ProductPage, BackendError> {
        let mut query: Vec<(&str, String)> = vec![("pageSize", filters.page_size.to_string())];
        if let Some(category) = &filters.category {
            query.push(("category", category.to_string()));
        }
        if let Some(prefix) = &filters.name_prefix {
            query.push(("namePrefix", prefix.clone()));
        }
        if let Some(cursor) = &filters.cursor {
            query.push(("cursor", cursor.as_str().to_owned()));
        }

        let response = self.get_documents(PRODUCTS_COLLECTION, &query).await?;
        Ok(ProductPage {
            products: response.documents,
            next_cursor: response.next_cursor,
        })
    }

    /// Fetch the latest status projection for an order, if it exists yet.
    async fn fetch_order_update(
        &self,
        local_id: &LocalOrderId,
    ) -> Result<Option<OrderUpdate>, BackendError> {
        let query = [("localId", local_id.to_string())];
        let response: DocumentsResponse<OrderStatusDocument> =
            self.get_documents(ORDERS_COLLECTION, &query).await?;

        Ok(response.documents.into_iter().next().map(|doc| OrderUpdate {
            status: doc.status,
            timestamp: doc.timestamp,
        }))
    }
}

impl Backend for DocumentStoreClient {
    #[instrument(skip(self, draft), fields(local_id = %draft.local_id))]
    async fn create_order(&self, draft: OrderDraft) -> Result<OrderId, BackendError> {
        let created: CreatedDocument = self.post_document(ORDERS_COLLECTION, &draft).await?;
        debug!(order_id = %created.id, "order created");
        Ok(OrderId::new(created.id))
    }

    #[instrument(skip(self, request), fields(local_id = %request.local_id))]
    async fn create_cancellation_request(
        &self,
        request: CancellationRequest,
    ) -> Result<(), BackendError> {
        let _: CreatedDocument = self
            .post_document(CANCELLATIONS_COLLECTION, &request)
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn query_products(&self, filters: &ProductFilters) -> Result<ProductPage, BackendError> {
        if let Some(page) = self.inner.product_cache.get(filters).await {
            debug!("product query served from cache");
            return Ok(page);
        }

        let page = self.fetch_products(filters).await?;
        self.inner
            .product_cache
            .insert(filters.clone(), page.clone())
            .await;
        Ok(page)
    }

    /// Subscribe by polling the order document on the configured interval.
    ///
    /// Must be called from within a Tokio runtime. The poll task exits as
    /// soon as it observes the handle's channel closed.
    fn watch_order(&self, local_id: &LocalOrderId) -> OrderWatch {
        let (watch, tx) = OrderWatch::channel(local_id.clone());
        let client = self.clone();
        let local_id = local_id.clone();

        tokio::spawn(async move {
            let mut last: Option<OrderUpdate> = None;
            loop {
                if tx.is_closed() {
                    break;
                }

                match client.fetch_order_update(&local_id).await {
                    Ok(Some(update)) => {
                        if last.as_ref() != Some(&update) {
                            if tx.send(update.clone()).is_err() {
                                break;
                            }
                            last = Some(update);
                        }
                    }
                    // Not written yet, or already gone; keep polling.
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(order = %local_id, error = %e, "order watch poll failed");
                    }
                }

                tokio::time::sleep(client.inner.poll_interval).await;
            }
            debug!(order = %local_id, "order watch torn down");
        });

        watch
    }
}

impl std::fmt::Debug for DocumentStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStoreClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
