//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs minted by the identity provider with a shared
//! secret. Verification is local: signature, optional expiry, and a subject
//! claim carrying the provider's user id. Handlers opt in by taking a
//! [`CallerIdentity`] argument; read-only routes simply don't.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use hmac::{Hmac, Mac};
use jwt::{Claims, Header, Token, VerifyWithKey};
use sha2::Sha256;

use crate::state::AppState;
use crate::utils::error::AppError;

#[derive(Clone)]
pub struct AuthVerifier {
    key: Hmac<Sha256>,
}

impl AuthVerifier {
    pub fn new(secret: &str) -> Self {
        let key = Hmac::new_from_slice(secret.as_bytes()).expect("hmac accepts keys of any length");
        Self { key }
    }

    /// Returns the external user id named by a valid token.
    pub fn verify(&self, token: &str) -> Option<String> {
        let token: Token<Header, Claims, _> = token.verify_with_key(&self.key).ok()?;
        let claims = token.claims();

        if let Some(expiry) = claims.registered.expiration {
            if (expiry as i64) < Utc::now().timestamp() {
                return None;
            }
        }

        claims.registered.subject.clone()
    }
}

/// The authenticated caller, as identified by the provider.
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub external_id: String,
}

#[async_trait]
impl FromRequestParts<AppState> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::AuthError("missing bearer token".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::AuthError("malformed authorization header".to_string()))?;

        let external_id = state
            .auth
            .verify(token)
            .ok_or_else(|| AppError::AuthError("invalid or expired token".to_string()))?;

        Ok(CallerIdentity { external_id })
    }
}
