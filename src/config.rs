//! Runtime configuration, collected from the environment in `main` and
//! passed down through [`crate::AppState`]. Nothing in the crate reads env
//! vars after startup.

use anyhow::Context;
use rust_decimal::Decimal;

use crate::domain::checkout::CheckoutPolicy;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub nats_url: Option<String>,
    pub auth: AuthConfig,
    pub checkout: CheckoutPolicy,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub token_secret: String,
    pub token_ttl_hours: i64,
    /// Seed credential for the single admin account, created on first run.
    pub admin_email: String,
    pub admin_password: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env_or("PORT", "8080").parse().context("PORT must be a number")?;
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is required")?;
        let nats_url = std::env::var("NATS_URL").ok();

        let auth = AuthConfig {
            token_secret: env_or("ADMIN_TOKEN_SECRET", "your-secret-key"),
            token_ttl_hours: env_or("ADMIN_TOKEN_TTL_HOURS", "24")
                .parse()
                .context("ADMIN_TOKEN_TTL_HOURS must be a number")?,
            admin_email: env_or("ADMIN_EMAIL", "admin@meraki.com"),
            admin_password: env_or("ADMIN_PASSWORD", "admin123"),
        };

        let defaults = CheckoutPolicy::default();
        let checkout = CheckoutPolicy {
            tax_rate: parse_or("TAX_RATE", defaults.tax_rate)?,
            shipping_fee: parse_or("SHIPPING_FEE", defaults.shipping_fee)?,
            free_shipping_threshold: parse_or("FREE_SHIPPING_THRESHOLD", defaults.free_shipping_threshold)?,
            fallback_unit_price: parse_or("FALLBACK_UNIT_PRICE", defaults.fallback_unit_price)?,
            whatsapp_phone: env_or("WHATSAPP_PHONE", &defaults.whatsapp_phone),
        };
        if checkout.tax_rate < Decimal::ZERO {
            anyhow::bail!("TAX_RATE must not be negative");
        }

        Ok(Self { port, database_url, nats_url, auth, checkout })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw.parse().map_err(|e| anyhow::anyhow!("{key} is invalid: {e}")),
    }
}
