//! Session cart handlers and the checkout flow.
//!
//! Every handler loads the session snapshot, applies one state-machine
//! transition, and answers with the resulting cart view. Checkout is the
//! compound transition: archive the snapshot as a purchase, clear the cart,
//! hand back the WhatsApp deep link.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::cart::{CartItem, Purchase};
use crate::domain::checkout::{compose_order_message, whatsapp_link, Totals};
use crate::domain::events::StorefrontEvent;
use crate::error::{ApiError, Result};
use crate::session::CartSession;
use crate::AppState;

/// Cart contents plus the derived order summary.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub totals: Totals,
}

impl CartView {
    fn of(state: &AppState, session: &CartSession) -> Self {
        Self {
            items: session.items().to_vec(),
            totals: state.config.checkout.compute_totals(session.items()),
        }
    }
}

pub async fn get_cart(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<CartView>> {
    let session = CartSession::load(&session_id, state.sessions.clone()).await?;
    Ok(Json(CartView::of(&state, &session)))
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartView>)> {
    let product = super::products::fetch_product(&state, request.product_id)
        .await?
        .ok_or(ApiError::NotFound("product"))?;

    let mut session = CartSession::load(&session_id, state.sessions.clone()).await?;
    session.add_item(product, request.quantity).await?;
    Ok((StatusCode::CREATED, Json(CartView::of(&state, &session))))
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

pub async fn update_item(
    State(state): State<AppState>,
    Path((session_id, product_id)): Path<(String, i64)>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>> {
    let mut session = CartSession::load(&session_id, state.sessions.clone()).await?;
    session.update_quantity(product_id, request.quantity).await?;
    Ok(Json(CartView::of(&state, &session)))
}

pub async fn remove_item(
    State(state): State<AppState>,
    Path((session_id, product_id)): Path<(String, i64)>,
) -> Result<Json<CartView>> {
    let mut session = CartSession::load(&session_id, state.sessions.clone()).await?;
    session.remove_item(product_id).await?;
    Ok(Json(CartView::of(&state, &session)))
}

pub async fn clear_cart(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<CartView>> {
    let mut session = CartSession::load(&session_id, state.sessions.clone()).await?;
    session.clear_cart().await?;
    Ok(Json(CartView::of(&state, &session)))
}

pub async fn list_purchases(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<Purchase>>> {
    let session = CartSession::load(&session_id, state.sessions.clone()).await?;
    Ok(Json(session.state().purchases.clone()))
}

pub async fn clear_purchases(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode> {
    let mut session = CartSession::load(&session_id, state.sessions.clone()).await?;
    session.clear_purchases().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub purchase: Purchase,
    pub totals: Totals,
    pub message: String,
    pub whatsapp_url: String,
}

/// Finalizes the session cart. The local transition always applies; order
/// recording and event publishing are best-effort and never fail checkout.
pub async fn checkout(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<CheckoutResponse>> {
    let mut session = CartSession::load(&session_id, state.sessions.clone()).await?;
    if session.state().is_empty() {
        return Err(ApiError::EmptyCart);
    }

    let totals = state.config.checkout.compute_totals(session.items());
    let message = compose_order_message(session.items(), totals.total);
    let url = whatsapp_link(&state.config.checkout.whatsapp_phone, &message);

    let purchase = session.complete_purchase(totals.total).await?;
    record_order(&state, &purchase).await;
    publish_purchase(&state, &purchase).await;

    tracing::info!(purchase_id = %purchase.id, total = %totals.total, "checkout complete");
    Ok(Json(CheckoutResponse { purchase, totals, message, whatsapp_url: url }))
}

/// Inserts the purchase into the orders table. Idempotent on purchase id;
/// failure is logged and swallowed.
pub(crate) async fn record_order(state: &AppState, purchase: &Purchase) {
    let items = match serde_json::to_value(&purchase.items) {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(purchase_id = %purchase.id, %err, "failed to serialize order items");
            return;
        }
    };
    let result = sqlx::query(
        "INSERT INTO orders (id, items, total, whatsapp_sent, created_at) \
         VALUES ($1, $2, $3, $4, $5) ON CONFLICT (id) DO NOTHING",
    )
    .bind(&purchase.id)
    .bind(&items)
    .bind(purchase.total)
    .bind(purchase.whatsapp_sent)
    .bind(purchase.timestamp)
    .execute(&state.db)
    .await;
    if let Err(err) = result {
        tracing::warn!(purchase_id = %purchase.id, %err, "failed to record order");
    }
}

async fn publish_purchase(state: &AppState, purchase: &Purchase) {
    let Some(nats) = &state.nats else { return };
    let event = StorefrontEvent::purchase_completed(purchase);
    let payload = match serde_json::to_vec(&event) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(purchase_id = %purchase.id, %err, "failed to serialize purchase event");
            return;
        }
    };
    if let Err(err) = nats.publish(event.subject().to_string(), payload.into()).await {
        tracing::warn!(purchase_id = %purchase.id, %err, "failed to publish purchase event");
    }
}
