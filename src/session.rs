//! Per-session cart orchestration.
//!
//! [`CartSession`] owns a [`CartState`] value, dispatches reducer actions,
//! and persists the outcome through a [`SessionStore`]. Saves are suppressed
//! until the initial restore has resolved once; after that every mutation
//! re-saves unconditionally.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::cart::{CartAction, CartError, CartItem, CartState, Purchase};
use crate::domain::catalog::Product;
use crate::storage::{SessionStore, StoreError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct CartSession {
    session_id: String,
    state: CartState,
    store: Arc<dyn SessionStore>,
}

impl CartSession {
    /// Creates an unloaded session. Mutations apply in memory but are not
    /// persisted until [`CartSession::restore`] has run.
    pub fn new(session_id: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Self { session_id: session_id.into(), state: CartState::default(), store }
    }

    /// Restores persisted state and lifts the save suppression.
    pub async fn restore(&mut self) -> Result<(), SessionError> {
        let snapshot = self.store.load(&self.session_id).await?;
        self.state = std::mem::take(&mut self.state).apply(CartAction::Restore {
            items: snapshot.items,
            purchases: snapshot.purchases,
        });
        Ok(())
    }

    /// Loads a ready-to-use session in one step.
    pub async fn load(
        session_id: impl Into<String>,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, SessionError> {
        let mut session = Self::new(session_id, store);
        session.restore().await?;
        Ok(session)
    }

    pub fn state(&self) -> &CartState {
        &self.state
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub async fn add_item(&mut self, product: Product, quantity: u32) -> Result<(), SessionError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity.into());
        }
        self.dispatch(CartAction::AddItem { product, quantity, added_at: Utc::now() }).await
    }

    pub async fn remove_item(&mut self, product_id: i64) -> Result<(), SessionError> {
        self.dispatch(CartAction::RemoveItem { product_id }).await
    }

    /// Sets the quantity exactly; zero removes the item.
    pub async fn update_quantity(&mut self, product_id: i64, quantity: u32) -> Result<(), SessionError> {
        self.dispatch(CartAction::UpdateQuantity { product_id, quantity }).await
    }

    pub async fn clear_cart(&mut self) -> Result<(), SessionError> {
        self.dispatch(CartAction::ClearCart).await
    }

    pub async fn clear_purchases(&mut self) -> Result<(), SessionError> {
        self.dispatch(CartAction::ClearPurchases).await
    }

    /// Archives the current items as a purchase and empties the cart, then
    /// persists both keys in one store write.
    pub async fn complete_purchase(&mut self, total: Decimal) -> Result<Purchase, SessionError> {
        let purchase = Purchase::from_snapshot(self.state.items.clone(), total);
        self.state = std::mem::take(&mut self.state)
            .apply(CartAction::PurchaseComplete { purchase: purchase.clone() });
        if self.state.loaded {
            self.store
                .save_snapshot(&self.session_id, &self.state.items, &self.state.purchases)
                .await?;
        }
        Ok(purchase)
    }

    /// Current items, for composing totals and messages.
    pub fn items(&self) -> &[CartItem] {
        &self.state.items
    }

    async fn dispatch(&mut self, action: CartAction) -> Result<(), SessionError> {
        let touches_items = !matches!(action, CartAction::ClearPurchases);
        self.state = std::mem::take(&mut self.state).apply(action);
        if self.state.loaded {
            if touches_items {
                self.store.save_items(&self.session_id, &self.state.items).await?;
            } else {
                self.store.save_purchases(&self.session_id, &self.state.purchases).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Product;
    use crate::storage::{MemoryStore, CART_KEY, PURCHASES_KEY};
    use rust_decimal_macros::dec;

    fn product(id: i64, price: i64) -> Product {
        Product {
            id,
            handle: format!("product-{id}"),
            title: format!("Product {id}"),
            description: String::new(),
            image: String::new(),
            price,
            category: "Fragrances".into(),
            subcategory: "Unisex".into(),
            highlights: vec![],
            tags: vec![],
            brand: "Meraki".into(),
            condition: "New".into(),
            inventory: 2,
            seo_title: None,
            seo_description: None,
        }
    }

    #[tokio::test]
    async fn round_trips_items_through_the_store() {
        let store = Arc::new(MemoryStore::new());
        let mut session = CartSession::load("s1", store.clone()).await.unwrap();
        session.add_item(product(1, 2499), 2).await.unwrap();

        let reloaded = CartSession::load("s1", store).await.unwrap();
        assert_eq!(reloaded.items().len(), 1);
        assert_eq!(reloaded.items()[0].quantity, 2);
    }

    #[tokio::test]
    async fn sessions_are_isolated_by_id() {
        let store = Arc::new(MemoryStore::new());
        let mut a = CartSession::load("a", store.clone()).await.unwrap();
        a.add_item(product(1, 100), 1).await.unwrap();

        let b = CartSession::load("b", store).await.unwrap();
        assert!(b.items().is_empty());
    }

    #[tokio::test]
    async fn mutations_before_restore_are_not_persisted() {
        let store = Arc::new(MemoryStore::new());
        store.save_items("s1", &[CartItem { product: product(9, 900), quantity: 1, added_at: Utc::now() }])
            .await
            .unwrap();

        let mut unloaded = CartSession::new("s1", store.clone());
        unloaded.clear_cart().await.unwrap();

        // The genuine prior data must survive the premature write.
        let reloaded = CartSession::load("s1", store).await.unwrap();
        assert_eq!(reloaded.items().len(), 1);
        assert_eq!(reloaded.items()[0].product.id, 9);
    }

    #[tokio::test]
    async fn corrupt_payload_loads_as_empty_state() {
        let store = Arc::new(MemoryStore::new());
        store.put_raw("s1", CART_KEY, "{not json");
        store.put_raw("s1", PURCHASES_KEY, "[{\"wrong\": \"shape\"}]");

        let session = CartSession::load("s1", store).await.unwrap();
        assert!(session.items().is_empty());
        assert!(session.state().purchases.is_empty());
    }

    #[tokio::test]
    async fn add_rejects_zero_quantity() {
        let store = Arc::new(MemoryStore::new());
        let mut session = CartSession::load("s1", store).await.unwrap();
        let err = session.add_item(product(1, 100), 0).await.unwrap_err();
        assert!(matches!(err, SessionError::Cart(CartError::InvalidQuantity)));
        assert!(session.items().is_empty());
    }

    #[tokio::test]
    async fn complete_purchase_saves_both_keys_together() {
        let store = Arc::new(MemoryStore::new());
        let mut session = CartSession::load("s1", store.clone()).await.unwrap();
        session.add_item(product(1, 1000), 2).await.unwrap();
        session.add_item(product(2, 500), 1).await.unwrap();

        let purchase = session.complete_purchase(dec!(2950)).await.unwrap();
        assert!(session.items().is_empty());
        assert_eq!(session.state().purchases.len(), 1);

        let reloaded = CartSession::load("s1", store).await.unwrap();
        assert!(reloaded.items().is_empty());
        assert_eq!(reloaded.state().purchases.len(), 1);
        assert_eq!(reloaded.state().purchases[0].id, purchase.id);
        assert_eq!(reloaded.state().purchases[0].total, dec!(2950));
        assert_eq!(reloaded.state().purchases[0].items.len(), 2);
    }

    #[tokio::test]
    async fn clear_purchases_keeps_cart_items() {
        let store = Arc::new(MemoryStore::new());
        let mut session = CartSession::load("s1", store.clone()).await.unwrap();
        session.add_item(product(1, 1000), 1).await.unwrap();
        session.complete_purchase(dec!(1679)).await.unwrap();
        session.add_item(product(2, 500), 1).await.unwrap();
        session.clear_purchases().await.unwrap();

        let reloaded = CartSession::load("s1", store).await.unwrap();
        assert!(reloaded.state().purchases.is_empty());
        assert_eq!(reloaded.items().len(), 1);
    }
}
