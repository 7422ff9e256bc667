//! Postgres-backed session store: one row per (session, key).

use async_trait::async_trait;
use sqlx::PgPool;

use super::{parse_or_empty, CartSnapshot, SessionStore, StoreError, CART_KEY, PURCHASES_KEY};
use crate::domain::cart::{CartItem, Purchase};

#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, session: &str, key: &str) -> Result<Option<String>, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM cart_store WHERE session_id = $1 AND key = $2")
                .bind(session)
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(value,)| value))
    }
}

const UPSERT: &str = "INSERT INTO cart_store (session_id, key, value, updated_at) \
     VALUES ($1, $2, $3, NOW()) \
     ON CONFLICT (session_id, key) DO UPDATE SET value = $3, updated_at = NOW()";

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn load(&self, session: &str) -> Result<CartSnapshot, StoreError> {
        let items = self.fetch(session, CART_KEY).await?;
        let purchases = self.fetch(session, PURCHASES_KEY).await?;
        Ok(CartSnapshot {
            items: parse_or_empty(session, CART_KEY, items),
            purchases: parse_or_empty(session, PURCHASES_KEY, purchases),
        })
    }

    async fn save_items(&self, session: &str, items: &[CartItem]) -> Result<(), StoreError> {
        let value = serde_json::to_string(items)?;
        sqlx::query(UPSERT).bind(session).bind(CART_KEY).bind(&value).execute(&self.pool).await?;
        Ok(())
    }

    async fn save_purchases(&self, session: &str, purchases: &[Purchase]) -> Result<(), StoreError> {
        let value = serde_json::to_string(purchases)?;
        sqlx::query(UPSERT).bind(session).bind(PURCHASES_KEY).bind(&value).execute(&self.pool).await?;
        Ok(())
    }

    async fn save_snapshot(
        &self,
        session: &str,
        items: &[CartItem],
        purchases: &[Purchase],
    ) -> Result<(), StoreError> {
        let items_value = serde_json::to_string(items)?;
        let purchases_value = serde_json::to_string(purchases)?;
        let mut tx = self.pool.begin().await?;
        sqlx::query(UPSERT).bind(session).bind(CART_KEY).bind(&items_value).execute(&mut *tx).await?;
        sqlx::query(UPSERT)
            .bind(session)
            .bind(PURCHASES_KEY)
            .bind(&purchases_value)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn clear(&self, session: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM cart_store WHERE session_id = $1")
            .bind(session)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
