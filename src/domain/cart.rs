//! Cart state machine.
//!
//! State is a plain value; every transition is a pure reducer from
//! `(CartState, CartAction)` to a new `CartState`. Timestamps and purchase
//! ids ride in on the action payload, so applying the same action to the
//! same state is deterministic. Persistence lives elsewhere
//! ([`crate::session::CartSession`] dispatches actions and saves snapshots).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::catalog::Product;

/// A product snapshot plus the desired quantity.
///
/// The product is owned by value: once an item is in the cart, catalog edits
/// no longer affect it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

/// An immutable record of a completed checkout. Only ever appended to the
/// purchase history or cleared along with it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: String,
    pub items: Vec<CartItem>,
    pub total: Decimal,
    pub timestamp: DateTime<Utc>,
    pub whatsapp_sent: bool,
}

impl Purchase {
    /// Builds a purchase from a cart snapshot. The hand-off is dispatched
    /// unconditionally once checkout runs, so `whatsapp_sent` is fixed true.
    pub fn from_snapshot(items: Vec<CartItem>, total: Decimal) -> Self {
        Self {
            id: format!("purchase-{}", Uuid::new_v4()),
            items,
            total,
            timestamp: Utc::now(),
            whatsapp_sent: true,
        }
    }
}

/// Aggregate root for one shopping session. Items and purchases persist
/// under separate keys; the aggregate itself never hits the wire.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CartState {
    /// Insertion order is display order.
    pub items: Vec<CartItem>,
    /// Append-only log of completed checkouts.
    pub purchases: Vec<Purchase>,
    /// True once persisted state has been restored. Saves are suppressed
    /// until then so an empty initial state cannot clobber prior data.
    pub loaded: bool,
}

#[derive(Clone, Debug)]
pub enum CartAction {
    Restore { items: Vec<CartItem>, purchases: Vec<Purchase> },
    AddItem { product: Product, quantity: u32, added_at: DateTime<Utc> },
    RemoveItem { product_id: i64 },
    UpdateQuantity { product_id: i64, quantity: u32 },
    ClearCart,
    PurchaseComplete { purchase: Purchase },
    ClearPurchases,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,
}

impl CartState {
    /// Applies a transition, consuming the prior state.
    pub fn apply(mut self, action: CartAction) -> CartState {
        match action {
            CartAction::Restore { items, purchases } => CartState { items, purchases, loaded: true },
            CartAction::AddItem { product, quantity, added_at } => {
                if quantity == 0 {
                    return self;
                }
                match self.items.iter_mut().find(|i| i.product.id == product.id) {
                    // Merge keeps the original added_at.
                    Some(existing) => existing.quantity += quantity,
                    None => self.items.push(CartItem { product, quantity, added_at }),
                }
                self
            }
            CartAction::RemoveItem { product_id } => {
                self.items.retain(|i| i.product.id != product_id);
                self
            }
            CartAction::UpdateQuantity { product_id, quantity } => {
                if quantity == 0 {
                    self.items.retain(|i| i.product.id != product_id);
                } else if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product_id) {
                    item.quantity = quantity;
                }
                self
            }
            CartAction::ClearCart => {
                self.items.clear();
                self
            }
            // Archive and clear in one transition; no intermediate state.
            CartAction::PurchaseComplete { purchase } => {
                self.purchases.push(purchase);
                self.items.clear();
                self
            }
            CartAction::ClearPurchases => {
                self.purchases.clear();
                self
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}
