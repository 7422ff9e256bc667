//! Domain module: pure types and transitions, no I/O.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod events;

pub use cart::{CartAction, CartError, CartItem, CartState, Purchase};
pub use catalog::{CatalogFilter, Category, Product, SortKey};
pub use checkout::{CheckoutPolicy, Totals};
