//! Favorites store.
//!
//! Tracks which products the shopper has marked, surviving page reloads.
//! The set is loaded once at mount and written back in full on every
//! toggle; favorites are non-critical, so corrupt or unreadable storage
//! degrades to an empty set and failed writes only cost durability, never
//! the current session's state.

use tamarind_core::ProductId;

use crate::gateway::{self, PersistenceGateway, keys};

/// Durable set of favorited product ids.
///
/// Stored as an ordered JSON array (insertion order) with no duplicates.
#[derive(Debug, Default, Clone)]
pub struct FavoritesStore {
    ids: Vec<ProductId>,
}

impl FavoritesStore {
    /// Load the persisted set, falling back to empty on any failure.
    ///
    /// Duplicates in the stored array (possible if an older session wrote
    /// them) are dropped on load, keeping first occurrences.
    #[must_use]
    pub fn load(gateway: &impl PersistenceGateway) -> Self {
        let mut ids: Vec<ProductId> = Vec::new();
        for id in gateway::load_collection::<ProductId>(gateway, keys::FAVORITES) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Self { ids }
    }

    /// Whether `id` is currently favorited.
    #[must_use]
    pub fn is_favorite(&self, id: &ProductId) -> bool {
        self.ids.contains(id)
    }

    /// Flip membership of `id` and persist the full set synchronously.
    ///
    /// Returns the new membership state. A failed write is logged by the
    /// gateway and swallowed; the in-memory set still reflects the toggle.
    pub fn toggle(&mut self, gateway: &impl PersistenceGateway, id: &ProductId) -> bool {
        let now_favorite = if self.is_favorite(id) {
            self.ids.retain(|existing| existing != id);
            false
        } else {
            self.ids.push(id.clone());
            true
        };

        gateway::store_collection(gateway, keys::FAVORITES, &self.ids);
        now_favorite
    }

    /// Iterate the favorited ids in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ProductId> {
        self.ids.iter()
    }

    /// Number of favorited products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no products are favorited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
