//! Helpers shared by handler and router tests.

use std::sync::Arc;

use hmac::{Hmac, Mac};
use jwt::{Claims, RegisteredClaims, SignWithKey};
use sha2::Sha256;

use crate::auth::AuthVerifier;
use crate::config::{Config, StorageBackend};
use crate::models::{UserRole, UserUpsert};
use crate::state::AppState;
use crate::store::{MemEventStore, MemUserStore};
use crate::webhook::WebhookVerifier;

pub const AUTH_SECRET: &str = "test-auth-secret";
pub const WEBHOOK_SECRET: &str = "whsec_dGVzdC1zaWduaW5nLWtleQ==";

pub fn test_config() -> Config {
    Config {
        port: 0,
        storage: StorageBackend::Memory,
        database_url: String::new(),
        auth_secret: AUTH_SECRET.to_string(),
        webhook_secret: WEBHOOK_SECRET.to_string(),
        cors_origins: vec!["http://localhost:3000".to_string()],
        production: false,
    }
}

/// Fresh state over empty in-memory stores.
pub fn mem_state() -> AppState {
    AppState::new(
        test_config(),
        Arc::new(MemEventStore::new()),
        Arc::new(MemUserStore::new()),
        AuthVerifier::new(AUTH_SECRET),
        WebhookVerifier::new(WEBHOOK_SECRET).unwrap(),
    )
}

/// Mints a bearer token the state's verifier will accept.
pub fn bearer_for(external_id: &str) -> String {
    let key = Hmac::<Sha256>::new_from_slice(AUTH_SECRET.as_bytes()).unwrap();
    let claims = Claims::new(RegisteredClaims {
        issuer: None,
        subject: Some(external_id.to_string()),
        audience: None,
        expiration: None,
        not_before: None,
        issued_at: None,
        json_web_token_id: None,
    });
    claims.sign_with_key(&key).unwrap()
}

pub async fn seed_user(state: &AppState, external_id: &str, role: UserRole) {
    state
        .users
        .upsert(UserUpsert {
            external_id: external_id.to_string(),
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            role: Some(role),
        })
        .await
        .unwrap();
}
