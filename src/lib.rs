//! Meraki Storefront
//!
//! Luxury-goods storefront service: product catalog with a pure query/filter
//! layer, per-session shopping carts with persisted snapshots, and a checkout
//! flow that hands the order off to WhatsApp.
//!
//! ## Features
//! - Product and category catalog with search, subcategory, and sort filters
//! - Session-scoped cart state machine with durable snapshots
//! - WhatsApp order hand-off (message composition + deep link)
//! - Admin API for catalog CRUD, order tracking, and dashboard stats

use std::sync::Arc;

use sqlx::PgPool;

pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod seed;
pub mod session;
pub mod storage;

pub use config::AppConfig;
pub use error::{ApiError, Result};

/// Shared handles constructed once in `main` and passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub nats: Option<async_nats::Client>,
    pub config: Arc<AppConfig>,
    pub sessions: Arc<dyn storage::SessionStore>,
}
