use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::state::AppState;
use crate::utils::error::AppError;

pub mod events;
pub mod webhooks;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

/// GET /health. Probes the event store so a dead backend shows up here
/// before it shows up in user traffic.
pub async fn health_check(State(state): State<AppState>) -> Result<Response, AppError> {
    state.events.ping().await?;

    let payload = HealthPayload {
        status: "ok",
        service: "eventboard-api",
    };

    Ok(Json(payload).into_response())
}
