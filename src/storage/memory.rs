//! In-memory session store, used by tests and local development without a
//! database. Same JSON round-trip as the Postgres backend so the defensive
//! parsing path is exercised identically.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{parse_or_empty, CartSnapshot, SessionStore, StoreError, CART_KEY, PURCHASES_KEY};
use crate::domain::cart::{CartItem, Purchase};

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<(String, String), String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn get(&self, session: &str, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(&(session.to_string(), key.to_string())).cloned()
    }

    fn put(&self, session: &str, key: &str, value: String) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert((session.to_string(), key.to_string()), value);
    }

    /// Seeds a raw payload, bypassing serialization. Lets tests plant
    /// corrupt data the way a broken client could.
    pub fn put_raw(&self, session: &str, key: &str, value: impl Into<String>) {
        self.put(session, key, value.into());
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load(&self, session: &str) -> Result<CartSnapshot, StoreError> {
        Ok(CartSnapshot {
            items: parse_or_empty(session, CART_KEY, self.get(session, CART_KEY)),
            purchases: parse_or_empty(session, PURCHASES_KEY, self.get(session, PURCHASES_KEY)),
        })
    }

    async fn save_items(&self, session: &str, items: &[CartItem]) -> Result<(), StoreError> {
        self.put(session, CART_KEY, serde_json::to_string(items)?);
        Ok(())
    }

    async fn save_purchases(&self, session: &str, purchases: &[Purchase]) -> Result<(), StoreError> {
        self.put(session, PURCHASES_KEY, serde_json::to_string(purchases)?);
        Ok(())
    }

    async fn save_snapshot(
        &self,
        session: &str,
        items: &[CartItem],
        purchases: &[Purchase],
    ) -> Result<(), StoreError> {
        let items_value = serde_json::to_string(items)?;
        let purchases_value = serde_json::to_string(purchases)?;
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert((session.to_string(), CART_KEY.to_string()), items_value);
        entries.insert((session.to_string(), PURCHASES_KEY.to_string()), purchases_value);
        Ok(())
    }

    async fn clear(&self, session: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|(s, _), _| s != session);
        Ok(())
    }
}
