//! Admin login and dashboard.

use axum::extract::State;
use axum::Json;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::{issue_token, verify_password, AdminClaims};
use crate::error::{ApiError, Result};
use crate::http::orders::OrderRecord;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub admin: AdminInfo,
}

#[derive(Debug, Serialize)]
pub struct AdminInfo {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    request.validate()?;
    let row: Option<(i64, String, Option<String>, String)> =
        sqlx::query_as("SELECT id, email, name, password_hash FROM admins WHERE email = $1")
            .bind(&request.email)
            .fetch_optional(&state.db)
            .await?;

    let Some((id, email, name, password_hash)) = row else {
        return Err(ApiError::InvalidCredentials);
    };
    if !verify_password(&request.password, &password_hash) {
        return Err(ApiError::InvalidCredentials);
    }

    let token = issue_token(
        &state.config.auth.token_secret,
        &email,
        Duration::hours(state.config.auth.token_ttl_hours),
    );
    tracing::info!(%email, "admin login");
    Ok(Json(LoginResponse { token, admin: AdminInfo { id, email, name } }))
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_categories: i64,
    pub recent_orders: Vec<OrderRecord>,
}

pub async fn dashboard_stats(
    _claims: AdminClaims,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>> {
    let (total_products,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM products").fetch_one(&state.db).await?;
    let (total_orders,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM orders").fetch_one(&state.db).await?;
    let (total_categories,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM categories").fetch_one(&state.db).await?;
    let recent_orders: Vec<OrderRecord> = sqlx::query_as(
        "SELECT id, items, total, status, whatsapp_sent, created_at FROM orders \
         ORDER BY created_at DESC LIMIT 5",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(DashboardStats { total_products, total_orders, total_categories, recent_orders }))
}
