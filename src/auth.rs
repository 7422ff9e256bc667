//! Admin authentication: one shared credential, HMAC-signed bearer tokens.
//!
//! Tokens are `base64url(claims-json) . base64url(hmac-sha256(sig))` with an
//! expiry claim. Passwords are stored as `salt$sha256(salt:password)` hex.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("access token required")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    Expired,
}

/// Claims carried by an admin bearer token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub exp: i64,
}

fn mac_for(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size")
}

pub fn issue_token(secret: &str, email: &str, ttl: Duration) -> String {
    let claims = AdminClaims { sub: email.to_string(), exp: (Utc::now() + ttl).timestamp() };
    let payload =
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap_or_default());
    let mut mac = mac_for(secret);
    mac.update(payload.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    format!("{payload}.{signature}")
}

pub fn verify_token(secret: &str, token: &str) -> Result<AdminClaims, AuthError> {
    let (payload, signature) = token.split_once('.').ok_or(AuthError::InvalidToken)?;
    let signature = URL_SAFE_NO_PAD.decode(signature).map_err(|_| AuthError::InvalidToken)?;

    let mut mac = mac_for(secret);
    mac.update(payload.as_bytes());
    mac.verify_slice(&signature).map_err(|_| AuthError::InvalidToken)?;

    let claims_bytes = URL_SAFE_NO_PAD.decode(payload).map_err(|_| AuthError::InvalidToken)?;
    let claims: AdminClaims =
        serde_json::from_slice(&claims_bytes).map_err(|_| AuthError::InvalidToken)?;
    if claims.exp < Utc::now().timestamp() {
        return Err(AuthError::Expired);
    }
    Ok(claims)
}

/// Hashes a password with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    let digest = Sha256::digest(format!("{salt}:{password}").as_bytes());
    format!("{salt}${}", hex::encode(digest))
}

/// Checks a password against a stored `salt$digest` pair.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        return false;
    };
    let computed = hex::encode(Sha256::digest(format!("{salt}:{password}").as_bytes()));
    computed == digest
}

/// Extractor gating admin routes. Missing credentials map to 401, a bad or
/// expired token to 403, mirroring the storefront's public error contract.
#[axum::async_trait]
impl FromRequestParts<AppState> for AdminClaims {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Auth(AuthError::MissingToken))?;
        let token = header.strip_prefix("Bearer ").ok_or(ApiError::Auth(AuthError::MissingToken))?;
        verify_token(&state.config.auth.token_secret, token).map_err(ApiError::Auth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips() {
        let token = issue_token("secret", "admin@meraki.com", Duration::hours(24));
        let claims = verify_token("secret", &token).unwrap();
        assert_eq!(claims.sub, "admin@meraki.com");
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = issue_token("secret", "admin@meraki.com", Duration::hours(24));
        let mut forged = token.clone();
        forged.replace_range(0..1, "X");
        assert_eq!(verify_token("secret", &forged), Err(AuthError::InvalidToken));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("secret", "admin@meraki.com", Duration::hours(24));
        assert_eq!(verify_token("other", &token), Err(AuthError::InvalidToken));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token("secret", "admin@meraki.com", Duration::hours(-1));
        assert_eq!(verify_token("secret", &token), Err(AuthError::Expired));
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert_eq!(verify_token("secret", "no-dot-here"), Err(AuthError::InvalidToken));
    }

    #[test]
    fn password_hash_verifies_and_salts() {
        let a = hash_password("admin123");
        let b = hash_password("admin123");
        assert_ne!(a, b);
        assert!(verify_password("admin123", &a));
        assert!(verify_password("admin123", &b));
        assert!(!verify_password("letmein", &a));
        assert!(!verify_password("admin123", "garbage"));
    }
}
