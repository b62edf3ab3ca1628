//! Identity-provider webhook: one-way user sync.
//!
//! The provider owns accounts; this service only mirrors the bits it needs
//! for role checks. Verification happens against the raw body bytes before
//! any parsing, so the two cannot disagree about what was signed.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::models::UserUpsert;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{message_response, MessageResponse};

/// Provider event envelope. Payloads grow fields without notice, so
/// parsing stays permissive and takes only what the sync needs.
#[derive(Debug, Deserialize)]
struct IdentityEvent {
    #[serde(rename = "type")]
    kind: String,
    data: IdentityData,
}

#[derive(Debug, Deserialize)]
struct IdentityData {
    id: String,
    #[serde(default)]
    email_addresses: Vec<EmailAddress>,
    #[serde(default)]
    first_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmailAddress {
    email_address: String,
}

/// POST /webhooks/identity
pub async fn identity_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<MessageResponse>, AppError> {
    let msg_id = required_header(&headers, "svix-id")?;
    let timestamp = required_header(&headers, "svix-timestamp")?;
    let signatures = required_header(&headers, "svix-signature")?;

    state
        .webhook
        .verify(msg_id, timestamp, signatures, &body, Utc::now())
        .map_err(|err| AppError::ValidationError(format!("webhook verification failed: {err}")))?;

    let event: IdentityEvent = serde_json::from_slice(&body)
        .map_err(|err| AppError::ValidationError(format!("malformed webhook payload: {err}")))?;

    match event.kind.as_str() {
        "user.created" | "user.updated" => {
            let data = event.data;
            let email = data
                .email_addresses
                .first()
                .map(|address| address.email_address.clone())
                .unwrap_or_default();
            let name = data
                .first_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "User".to_string());

            // New accounts always start non-privileged; promotion happens
            // out of band and survives later syncs.
            let user = state
                .users
                .upsert(UserUpsert {
                    external_id: data.id,
                    name,
                    email,
                    role: None,
                })
                .await?;

            info!(external_id = %user.external_id, kind = %event.kind, "Synced user from identity provider");
        }
        other => {
            info!(kind = %other, "Ignoring unhandled identity event");
        }
    }

    Ok(message_response("Webhook processed"))
}

fn required_header<'h>(headers: &'h HeaderMap, name: &'static str) -> Result<&'h str, AppError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::ValidationError(format!("missing {name} header")))
}
