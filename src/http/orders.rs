//! Order tracking and admin order management.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::auth::AdminClaims;
use crate::domain::cart::Purchase;
use crate::error::{ApiError, Result};
use crate::http::cart::record_order;
use crate::http::PaginatedResponse;
use crate::AppState;

pub const ORDER_STATUSES: &[&str] = &["PENDING", "CONFIRMED", "SHIPPED", "DELIVERED", "CANCELLED"];

/// A persisted order: a purchase snapshot plus a fulfillment status the
/// admin walks forward by hand.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct OrderRecord {
    pub id: String,
    pub items: serde_json::Value,
    pub total: Decimal,
    pub status: String,
    pub whatsapp_sent: bool,
    pub created_at: DateTime<Utc>,
}

/// Accepts a Purchase-shaped body from a checkout client and records it.
/// The caller treats this as fire-and-forget; the response is advisory.
pub async fn track_purchase(
    State(state): State<AppState>,
    Json(purchase): Json<Purchase>,
) -> Json<serde_json::Value> {
    record_order(&state, &purchase).await;
    tracing::info!(
        purchase_id = %purchase.id,
        total = %purchase.total,
        item_count = purchase.items.len(),
        "purchase tracked"
    );
    Json(serde_json::json!({
        "success": true,
        "message": "Purchase tracked successfully",
        "purchaseId": purchase.id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct OrderListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<String>,
}

pub async fn list_orders(
    _claims: AdminClaims,
    State(state): State<AppState>,
    Query(params): Query<OrderListParams>,
) -> Result<Json<PaginatedResponse<OrderRecord>>> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * limit;

    let (orders, total): (Vec<OrderRecord>, i64) = match &params.status {
        Some(status) => {
            let orders = sqlx::query_as(
                "SELECT id, items, total, status, whatsapp_sent, created_at FROM orders \
                 WHERE status = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            )
            .bind(status)
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&state.db)
            .await?;
            let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders WHERE status = $1")
                .bind(status)
                .fetch_one(&state.db)
                .await?;
            (orders, total)
        }
        None => {
            let orders = sqlx::query_as(
                "SELECT id, items, total, status, whatsapp_sent, created_at FROM orders \
                 ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            )
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&state.db)
            .await?;
            let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders").fetch_one(&state.db).await?;
            (orders, total)
        }
    };

    let pages = (total as u64).div_ceil(u64::from(limit)) as u32;
    Ok(Json(PaginatedResponse { data: orders, total, page, pages }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_order_status(
    _claims: AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<OrderRecord>> {
    let status = request.status.to_uppercase();
    if !ORDER_STATUSES.contains(&status.as_str()) {
        return Err(ApiError::BadRequest(format!("unknown order status: {}", request.status)));
    }
    let order: Option<OrderRecord> = sqlx::query_as(
        "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 \
         RETURNING id, items, total, status, whatsapp_sent, created_at",
    )
    .bind(&id)
    .bind(&status)
    .fetch_optional(&state.db)
    .await?;
    order.map(Json).ok_or(ApiError::NotFound("order"))
}
