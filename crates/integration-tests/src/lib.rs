//! Shared test support for Tamarind integration tests.
//!
//! Provides a scripted in-process backend that implements the full
//! [`Backend`] seam: acknowledged order creation with generated ids,
//! cancellation capture, cursor-paginated product queries over a seeded
//! catalog, and real watch channels whose senders the tests can drive.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;

use tamarind_core::{CurrencyCode, LocalOrderId, OrderId, Price, ProductId};
use tamarind_storefront::backend::{
    Backend, BackendError, CancellationRequest, Cursor, OrderDraft, OrderUpdate, OrderWatch,
    Product, ProductFilters, ProductPage,
};
use tokio::sync::mpsc::UnboundedSender;

/// How the fake handles the next create-order call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreateBehavior {
    /// Acknowledge with a generated id.
    #[default]
    Succeed,
    /// Fail with a backend error.
    Fail,
    /// Never resolve (exercises the submission timeout).
    Hang,
}

/// Scripted document-store backend.
#[derive(Debug, Default)]
pub struct FakeBackend {
    behavior: Mutex<CreateBehavior>,
    created: Mutex<Vec<OrderDraft>>,
    cancellations: Mutex<Vec<CancellationRequest>>,
    catalog: Mutex<Vec<Product>>,
    watch_senders: Mutex<HashMap<LocalOrderId, UnboundedSender<OrderUpdate>>>,
}

impl FakeBackend {
    /// A backend that acknowledges everything.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the next create-order behavior.
    pub fn set_behavior(&self, behavior: CreateBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// Seed the product catalog served by queries.
    pub fn seed_catalog(&self, products: Vec<Product>) {
        *self.catalog.lock().unwrap() = products;
    }

    /// Order drafts the backend has acknowledged, in arrival order.
    #[must_use]
    pub fn created_orders(&self) -> Vec<OrderDraft> {
        self.created.lock().unwrap().clone()
    }

    /// Cancellation requests received, in arrival order.
    #[must_use]
    pub fn cancellation_requests(&self) -> Vec<CancellationRequest> {
        self.cancellations.lock().unwrap().clone()
    }

    /// Push a status update into an order's watch channel.
    ///
    /// Returns false if no open watch exists for the id.
    pub fn push_update(&self, local_id: &LocalOrderId, update: OrderUpdate) -> bool {
        self.watch_senders
            .lock()
            .unwrap()
            .get(local_id)
            .is_some_and(|tx| tx.send(update).is_ok())
    }

    /// Number of watch channels whose handles are still alive.
    #[must_use]
    pub fn open_watches(&self) -> usize {
        self.watch_senders
            .lock()
            .unwrap()
            .values()
            .filter(|tx| !tx.is_closed())
            .count()
    }
}

impl Backend for FakeBackend {
    async fn create_order(&self, draft: OrderDraft) -> Result<OrderId, BackendError> {
        match *self.behavior.lock().unwrap() {
            CreateBehavior::Succeed => {}
            CreateBehavior::Fail => {
                return Err(BackendError::Unavailable("scripted failure".to_owned()));
            }
            CreateBehavior::Hang => std::future::pending().await,
        }

        let mut created = self.created.lock().unwrap();
        let id = OrderId::new(format!("ord-{}", created.len() + 1));
        created.push(draft);
        Ok(id)
    }

    async fn create_cancellation_request(
        &self,
        request: CancellationRequest,
    ) -> Result<(), BackendError> {
        self.cancellations.lock().unwrap().push(request);
        Ok(())
    }

    async fn query_products(&self, filters: &ProductFilters) -> Result<ProductPage, BackendError> {
        let catalog = self.catalog.lock().unwrap();

        let matching: Vec<Product> = catalog
            .iter()
            .filter(|p| {
                filters
                    .category
                    .as_ref()
                    .is_none_or(|category| p.category.as_ref() == Some(category))
            })
            .filter(|p| {
                filters
                    .name_prefix
                    .as_ref()
                    .is_none_or(|prefix| p.name.starts_with(prefix.as_str()))
            })
            .cloned()
            .collect();

        // The cursor is an offset into the filtered result set.
        let offset: usize = filters
            .cursor
            .as_ref()
            .and_then(|c| c.as_str().parse().ok())
            .unwrap_or(0);
        let page_size = usize::try_from(filters.page_size).unwrap_or(usize::MAX);

        let page: Vec<Product> = matching.iter().skip(offset).take(page_size).cloned().collect();
        let next_offset = offset + page.len();
        let next_cursor =
            (next_offset < matching.len()).then(|| Cursor::new(next_offset.to_string()));

        Ok(ProductPage {
            products: page,
            next_cursor,
        })
    }

    fn watch_order(&self, local_id: &LocalOrderId) -> OrderWatch {
        let (watch, tx) = OrderWatch::channel(local_id.clone());
        self.watch_senders
            .lock()
            .unwrap()
            .insert(local_id.clone(), tx);
        watch
    }
}

/// Build a catalog product for tests.
#[must_use]
pub fn product(id: &str, name: &str, price: rust_decimal::Decimal, category: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        price: Price::new(price, CurrencyCode::USD),
        image: None,
        category: Some(category.into()),
        sizes: Vec::new(),
        colors: Vec::new(),
    }
}

/// Install a test tracing subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tamarind_storefront=debug".into()),
        )
        .with_test_writer()
        .try_init();
}
