//! Category read and admin CRUD handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::auth::AdminClaims;
use crate::domain::catalog::Category;
use crate::error::{conflict_on_unique, ApiError, Result};
use crate::AppState;

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories: Vec<Category> = sqlx::query_as(
        "SELECT c.id, c.name, c.description, COUNT(p.id) AS product_count \
         FROM categories c LEFT JOIN products p ON p.category_id = c.id \
         GROUP BY c.id ORDER BY c.name",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(categories))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryPayload {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
}

pub async fn create_category(
    _claims: AdminClaims,
    State(state): State<AppState>,
    Json(payload): Json<CategoryPayload>,
) -> Result<(StatusCode, Json<Category>)> {
    payload.validate()?;
    let category: Category = sqlx::query_as(
        "INSERT INTO categories (name, description) VALUES ($1, $2) \
         RETURNING id, name, description, 0::BIGINT AS product_count",
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .fetch_one(&state.db)
    .await
    .map_err(|e| conflict_on_unique(e, "category"))?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    _claims: AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<Category>> {
    payload.validate()?;
    let category: Option<Category> = sqlx::query_as(
        "UPDATE categories SET name = $2, description = $3, updated_at = NOW() WHERE id = $1 \
         RETURNING id, name, description, \
         (SELECT COUNT(*) FROM products WHERE category_id = categories.id) AS product_count",
    )
    .bind(id)
    .bind(&payload.name)
    .bind(&payload.description)
    .fetch_optional(&state.db)
    .await
    .map_err(|e| conflict_on_unique(e, "category"))?;
    category.map(Json).ok_or(ApiError::NotFound("category"))
}

pub async fn delete_category(
    _claims: AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                ApiError::BadRequest("category still has products".into())
            }
            _ => ApiError::Database(e),
        })?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("category"));
    }
    Ok(Json(serde_json::json!({ "message": "Category deleted successfully" })))
}
