//! Persistence adapter for cart state.
//!
//! A session's cart lives under two well-known keys in a scoped key-value
//! store, serialized as JSON. The adapter never owns state; it round-trips
//! snapshots on demand. Missing or unparseable payloads load as empty state
//! so a corrupt row can never take down a session.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::cart::{CartItem, Purchase};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgSessionStore;

/// Key holding the serialized items of the active cart.
pub const CART_KEY: &str = "meraki-cart";
/// Key holding the serialized purchase history.
pub const PURCHASES_KEY: &str = "meraki-purchases";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// What a session restore yields.
#[derive(Clone, Debug, Default)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    pub purchases: Vec<Purchase>,
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads both keys for a session. Absent data is an empty snapshot.
    async fn load(&self, session: &str) -> Result<CartSnapshot, StoreError>;

    async fn save_items(&self, session: &str, items: &[CartItem]) -> Result<(), StoreError>;

    async fn save_purchases(&self, session: &str, purchases: &[Purchase]) -> Result<(), StoreError>;

    /// Writes both keys together. Checkout uses this so a reader never sees
    /// a cleared cart without its archived purchase.
    async fn save_snapshot(
        &self,
        session: &str,
        items: &[CartItem],
        purchases: &[Purchase],
    ) -> Result<(), StoreError>;

    /// Drops everything stored for the session.
    async fn clear(&self, session: &str) -> Result<(), StoreError>;
}

/// Decodes a stored payload, falling back to empty on any shape mismatch.
pub(crate) fn parse_or_empty<T: serde::de::DeserializeOwned + Default>(
    session: &str,
    key: &str,
    raw: Option<String>,
) -> T {
    match raw {
        None => T::default(),
        Some(text) => match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(session, key, %err, "discarding unparseable stored payload");
                T::default()
            }
        },
    }
}
