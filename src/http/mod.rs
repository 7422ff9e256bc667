//! HTTP surface: route table, shared pagination, handler modules.

use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod admin;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub pages: u32,
}

/// In-memory pagination for listings that were filtered after the fetch.
pub(crate) fn paginate<T>(items: Vec<T>, page: Option<u32>, limit: Option<u32>) -> PaginatedResponse<T> {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(100).clamp(1, 100);
    let total = items.len() as i64;
    let pages = (items.len() as u64).div_ceil(u64::from(limit)) as u32;
    let data = items
        .into_iter()
        .skip(((page - 1) * limit) as usize)
        .take(limit as usize)
        .collect();
    PaginatedResponse { data, total, page, pages }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({"status": "healthy", "service": "meraki-storefront"})) }),
        )
        .route("/api/products", get(products::list_products).post(products::create_product))
        .route(
            "/api/products/:id",
            get(products::get_product).put(products::update_product).delete(products::delete_product),
        )
        .route("/api/products/handle/:handle", get(products::get_product_by_handle))
        .route("/api/categories", get(categories::list_categories).post(categories::create_category))
        .route(
            "/api/categories/:id",
            put(categories::update_category).delete(categories::delete_category),
        )
        .route(
            "/api/cart/:session",
            get(cart::get_cart).post(cart::add_to_cart).delete(cart::clear_cart),
        )
        .route(
            "/api/cart/:session/items/:product_id",
            put(cart::update_item).delete(cart::remove_item),
        )
        .route("/api/cart/:session/checkout", post(cart::checkout))
        .route(
            "/api/cart/:session/purchases",
            get(cart::list_purchases).delete(cart::clear_purchases),
        )
        .route("/api/track-purchase", post(orders::track_purchase))
        .route("/api/orders", get(orders::list_orders))
        .route("/api/orders/:id/status", put(orders::update_order_status))
        .route("/api/admin/login", post(admin::login))
        .route("/api/dashboard/stats", get(admin::dashboard_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_slices_and_counts_pages() {
        let out = paginate((1..=25).collect::<Vec<i32>>(), Some(2), Some(10));
        assert_eq!(out.data, (11..=20).collect::<Vec<i32>>());
        assert_eq!(out.total, 25);
        assert_eq!(out.page, 2);
        assert_eq!(out.pages, 3);
    }

    #[test]
    fn paginate_defaults_and_clamps() {
        let out = paginate(vec![1, 2, 3], None, Some(500));
        assert_eq!(out.data.len(), 3);
        assert_eq!(out.pages, 1);

        let past_end = paginate(vec![1, 2, 3], Some(9), Some(2));
        assert!(past_end.data.is_empty());
        assert_eq!(past_end.total, 3);
    }
}
