//! First-run seeding: default categories and the single admin account.
//! Runs after migrations; every insert is guarded by an emptiness check so
//! restarts never duplicate data.

use sqlx::PgPool;

use crate::auth::hash_password;
use crate::config::AuthConfig;

const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Leather Goods", "Handcrafted leather accessories and bags"),
    ("Electronics", "Cutting-edge technology and gadgets"),
    ("Fragrances", "Curated scents for men, women, and unisex"),
    ("Used/Refurbished", "Quality restored items at exceptional value"),
];

pub async fn ensure_defaults(pool: &PgPool, auth: &AuthConfig) -> Result<(), sqlx::Error> {
    let (categories,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM categories").fetch_one(pool).await?;
    if categories == 0 {
        for (name, description) in DEFAULT_CATEGORIES {
            sqlx::query("INSERT INTO categories (name, description) VALUES ($1, $2)")
                .bind(name)
                .bind(description)
                .execute(pool)
                .await?;
        }
        tracing::info!(count = DEFAULT_CATEGORIES.len(), "seeded default categories");
    }

    let (admins,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admins").fetch_one(pool).await?;
    if admins == 0 {
        sqlx::query("INSERT INTO admins (email, password_hash, name) VALUES ($1, $2, $3)")
            .bind(&auth.admin_email)
            .bind(hash_password(&auth.admin_password))
            .bind("Admin User")
            .execute(pool)
            .await?;
        tracing::info!(email = %auth.admin_email, "seeded admin account");
    }

    Ok(())
}
