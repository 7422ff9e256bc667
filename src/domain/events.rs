//! Domain events published to the message bus.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::cart::Purchase;

/// Events other systems may care about. Delivery is best-effort: publishing
/// never blocks or fails a user-facing flow.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorefrontEvent {
    PurchaseCompleted {
        purchase_id: String,
        total: Decimal,
        item_count: usize,
        whatsapp_sent: bool,
        timestamp: DateTime<Utc>,
    },
}

impl StorefrontEvent {
    pub fn purchase_completed(purchase: &Purchase) -> Self {
        Self::PurchaseCompleted {
            purchase_id: purchase.id.clone(),
            total: purchase.total,
            item_count: purchase.items.len(),
            whatsapp_sent: purchase.whatsapp_sent,
            timestamp: purchase.timestamp,
        }
    }

    /// NATS subject the event is published under.
    pub fn subject(&self) -> &'static str {
        match self {
            Self::PurchaseCompleted { .. } => "storefront.purchase.completed",
        }
    }
}
