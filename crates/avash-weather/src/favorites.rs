//! Durable, ordered list of favorite place names.
//!
//! The list is stored as a JSON array of strings under [`FAVORITES_KEY`].
//! Every mutation is written through before it returns, and an empty list
//! removes the key entirely, so the stored value and the in-memory list
//! never drift apart.

use std::sync::Arc;

use avash_core::{DatabaseError, KeyValueStore, WeatherError};

/// Storage key holding the serialized favorites.
pub const FAVORITES_KEY: &str = "favoriteLocations";

pub struct FavoritesStore {
    store: Arc<dyn KeyValueStore>,
    items: Vec<String>,
}

impl FavoritesStore {
    /// Create an empty store; call [`FavoritesStore::load`] to read persisted state.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            items: Vec::new(),
        }
    }

    /// Read persisted favorites. Absent, unreadable or corrupt data yields an
    /// empty list rather than an error.
    pub fn load(&mut self) -> &[String] {
        self.items = match self.store.get(FAVORITES_KEY) {
            Ok(Some(raw)) => match parse(&raw) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!("Ignoring stored favorites: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Could not read favorites, starting empty: {}", e);
                Vec::new()
            }
        };

        tracing::info!("Loaded {} favorite location(s)", self.items.len());
        &self.items
    }

    /// Append `identifier` unless an identical entry exists.
    ///
    /// If the write fails, the in-memory list is left unchanged.
    pub fn add(&mut self, identifier: &str) -> Result<&[String], DatabaseError> {
        if self.contains(identifier) {
            return Ok(&self.items);
        }

        let mut next = self.items.clone();
        next.push(identifier.to_string());
        self.commit(next)?;
        Ok(&self.items)
    }

    /// Remove `identifier` if present.
    pub fn remove(&mut self, identifier: &str) -> Result<&[String], DatabaseError> {
        if !self.contains(identifier) {
            return Ok(&self.items);
        }

        let next: Vec<String> = self
            .items
            .iter()
            .filter(|item| item.as_str() != identifier)
            .cloned()
            .collect();
        self.commit(next)?;
        Ok(&self.items)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.items.iter().any(|item| item == identifier)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    fn commit(&mut self, next: Vec<String>) -> Result<(), DatabaseError> {
        if next.is_empty() {
            self.store.remove(FAVORITES_KEY)?;
        } else {
            let raw = serde_json::to_string(&next)
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            self.store.set(FAVORITES_KEY, &raw)?;
        }
        self.items = next;
        Ok(())
    }
}

/// Decode the stored array, dropping duplicate entries while keeping order.
fn parse(raw: &str) -> Result<Vec<String>, WeatherError> {
    let decoded: Vec<String> = serde_json::from_str(raw)
        .map_err(|e| WeatherError::PersistenceCorrupt(e.to_string()))?;

    let mut items: Vec<String> = Vec::with_capacity(decoded.len());
    for item in decoded {
        if !items.contains(&item) {
            items.push(item);
        }
    }
    Ok(items)
}
