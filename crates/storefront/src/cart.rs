//! Shopping cart store.
//!
//! Single source of truth for the current session's prospective purchase
//! set. The cart is memory-only by design: it lives for the UI session and
//! is not persisted across reloads. Totals are derived fresh on every read,
//! never cached.

use serde::{Deserialize, Serialize};
use tamarind_core::{CurrencyCode, Price, ProductId};

use crate::backend::Product;

/// One product's entry in the cart, with its quantity and selected
/// variant options.
///
/// Field names serialize in camelCase because placed orders snapshot these
/// lines into the backend's order collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product identifier; the cart holds at most one line per id.
    pub id: ProductId,
    /// Display name copied from the product at add time.
    pub name: String,
    /// Unit price copied from the product at add time.
    pub price: Price,
    /// Product image URL, if the product has one.
    pub image: Option<String>,
    /// Quantity, always at least 1.
    pub qty: u32,
    /// Size chosen by the shopper, if the product has sizes.
    #[serde(default)]
    pub selected_size: Option<String>,
    /// Colors chosen by the shopper, in selection order.
    #[serde(default)]
    pub selected_colors: Vec<String>,
}

impl CartLine {
    /// Price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.line_total(self.qty)
    }
}

/// Variant options chosen on the product page when adding to the cart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductSelection {
    /// Chosen size, if any.
    pub size: Option<String>,
    /// Chosen colors, possibly empty.
    pub colors: Vec<String>,
}

/// Derived cart totals, recomputed from the line items on every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartTotals {
    /// Sum of all line quantities.
    pub total_items: u32,
    /// Sum of unit price times quantity over all lines.
    pub subtotal: Price,
}

/// The in-memory cart aggregate.
///
/// Lines keep insertion order (first-added first); order matters only for
/// display. Adding a product already in the cart increments its quantity
/// instead of duplicating the line.
#[derive(Debug, Default, Clone)]
pub struct CartStore {
    lines: Vec<CartLine>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product to the cart.
    ///
    /// If a line with the same product id already exists its quantity is
    /// incremented and `selection` is ignored; otherwise a new line is
    /// appended with quantity 1. Always succeeds.
    pub fn add_item(&mut self, product: &Product, selection: ProductSelection) {
        if let Some(line) = self.line_mut(&product.id) {
            line.qty += 1;
            return;
        }

        self.lines.push(CartLine {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            qty: 1,
            selected_size: selection.size,
            selected_colors: selection.colors,
        });
    }

    /// Increment the quantity of the line with `id`. No-op if absent.
    pub fn increase_qty(&mut self, id: &ProductId) {
        if let Some(line) = self.line_mut(id) {
            line.qty += 1;
        }
    }

    /// Decrement the quantity of the line with `id`, flooring at 1.
    ///
    /// Never removes the line; removal is a separate explicit action.
    /// No-op if absent.
    pub fn decrease_qty(&mut self, id: &ProductId) {
        if let Some(line) = self.line_mut(id) {
            line.qty = line.qty.saturating_sub(1).max(1);
        }
    }

    /// Remove the line with `id` entirely. No-op if absent.
    pub fn remove_item(&mut self, id: &ProductId) {
        self.lines.retain(|line| line.id != *id);
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// The current line items, in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Look up a line by product id.
    #[must_use]
    pub fn line(&self, id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == *id)
    }

    /// Number of distinct lines (not total quantity).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Compute the derived totals from the current lines.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        let currency = self
            .lines
            .first()
            .map_or(CurrencyCode::default(), |line| line.price.currency_code);

        let mut totals = CartTotals {
            total_items: 0,
            subtotal: Price::zero(currency),
        };
        for line in &self.lines {
            totals.total_items += line.qty;
            totals.subtotal += line.line_total();
        }
        totals
    }

    fn line_mut(&mut self, id: &ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.id == *id)
    }
}
