//! Product read and admin CRUD handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::auth::AdminClaims;
use crate::domain::catalog::{slugify, CatalogFilter, Product, SortKey};
use crate::error::{conflict_on_unique, ApiError, Result};
use crate::http::{paginate, PaginatedResponse};
use crate::AppState;

const PRODUCT_COLUMNS: &str = "p.id, p.handle, p.title, p.description, p.image, p.price, \
     c.name AS category, p.subcategory, p.highlights, p.tags, p.brand, p.condition, \
     p.inventory, p.seo_title, p.seo_description";

/// Catalog listing with the full filter surface: category, subcategory,
/// search, sort, pagination. Rows come back in catalog order (insertion
/// order) and the pure filter layer does the rest.
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> Result<Json<PaginatedResponse<Product>>> {
    let products: Vec<Product> = sqlx::query_as(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products p JOIN categories c ON c.id = p.category_id ORDER BY p.id"
    ))
    .fetch_all(&state.db)
    .await?;

    let filter = CatalogFilter {
        category: params.category,
        subcategory: params.subcategory,
        search: params.search,
        sort: params.sort.unwrap_or_default(),
    };
    let matched = filter.apply(&products);
    Ok(Json(paginate(matched, params.page, params.limit)))
}

#[derive(Debug, Deserialize)]
pub struct ProductListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub search: Option<String>,
    pub sort: Option<SortKey>,
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>> {
    fetch_product(&state, id).await?.map(Json).ok_or(ApiError::NotFound("product"))
}

pub async fn get_product_by_handle(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<Product>> {
    let product: Option<Product> = sqlx::query_as(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products p JOIN categories c ON c.id = p.category_id WHERE p.handle = $1"
    ))
    .bind(&handle)
    .fetch_optional(&state.db)
    .await?;
    product.map(Json).ok_or(ApiError::NotFound("product"))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ProductPayload {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1))]
    pub image: String,
    #[validate(range(min = 0))]
    pub price: i64,
    pub category_id: i64,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(length(min = 1))]
    pub brand: String,
    #[validate(length(min = 1))]
    pub condition: String,
    #[serde(default)]
    pub inventory: i32,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
}

pub async fn create_product(
    _claims: AdminClaims,
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>)> {
    payload.validate()?;
    let handle = slugify(&payload.title);
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO products (handle, title, description, image, price, category_id, subcategory, \
         highlights, tags, brand, condition, inventory, seo_title, seo_description) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING id",
    )
    .bind(&handle)
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.image)
    .bind(payload.price)
    .bind(payload.category_id)
    .bind(&payload.subcategory)
    .bind(&payload.highlights)
    .bind(&payload.tags)
    .bind(&payload.brand)
    .bind(&payload.condition)
    .bind(payload.inventory)
    .bind(&payload.seo_title)
    .bind(&payload.seo_description)
    .fetch_one(&state.db)
    .await
    .map_err(|e| conflict_on_unique(e, "product handle"))?;

    let product = fetch_product(&state, id).await?.ok_or(ApiError::NotFound("product"))?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// Full-row update. The handle stays stable so existing links keep working.
pub async fn update_product(
    _claims: AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductPayload>,
) -> Result<Json<Product>> {
    payload.validate()?;
    let updated = sqlx::query(
        "UPDATE products SET title = $2, description = $3, image = $4, price = $5, \
         category_id = $6, subcategory = $7, highlights = $8, tags = $9, brand = $10, \
         condition = $11, inventory = $12, seo_title = $13, seo_description = $14, \
         updated_at = NOW() WHERE id = $1",
    )
    .bind(id)
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.image)
    .bind(payload.price)
    .bind(payload.category_id)
    .bind(&payload.subcategory)
    .bind(&payload.highlights)
    .bind(&payload.tags)
    .bind(&payload.brand)
    .bind(&payload.condition)
    .bind(payload.inventory)
    .bind(&payload.seo_title)
    .bind(&payload.seo_description)
    .execute(&state.db)
    .await?;
    if updated.rows_affected() == 0 {
        return Err(ApiError::NotFound("product"));
    }
    let product = fetch_product(&state, id).await?.ok_or(ApiError::NotFound("product"))?;
    Ok(Json(product))
}

pub async fn delete_product(
    _claims: AdminClaims,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>> {
    let deleted = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&state.db).await?;
    if deleted.rows_affected() == 0 {
        return Err(ApiError::NotFound("product"));
    }
    Ok(Json(serde_json::json!({ "message": "Product deleted successfully" })))
}

pub(crate) async fn fetch_product(state: &AppState, id: i64) -> Result<Option<Product>> {
    let product: Option<Product> = sqlx::query_as(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products p JOIN categories c ON c.id = p.category_id WHERE p.id = $1"
    ))
    .bind(id)
    .fetch_optional(&state.db)
    .await?;
    Ok(product)
}
