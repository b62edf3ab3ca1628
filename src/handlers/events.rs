//! Event CRUD and lifecycle transitions.
//!
//! Reads are public; every mutation requires a verified bearer token, and
//! creation additionally requires the admin role. The handlers stay thin:
//! field rules live in the store, status rules in [`crate::lifecycle`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::auth::CallerIdentity;
use crate::lifecycle;
use crate::models::{Event, EventPatch, NewEvent, UserRole};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::extract::AppJson;
use crate::utils::response::{event_response, message_response, EventResponse, MessageResponse};

/// GET /events
pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, AppError> {
    let events = state.events.list().await?;
    Ok(Json(events))
}

/// GET /events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Event>, AppError> {
    let event = state.events.get(id).await?;
    Ok(Json(event))
}

/// POST /events
pub async fn create_event(
    State(state): State<AppState>,
    caller: CallerIdentity,
    AppJson(draft): AppJson<NewEvent>,
) -> Result<Response, AppError> {
    require_admin(&state, &caller).await?;

    let event = state.events.create(draft).await?;
    let body = event_response("Event created successfully", event);
    Ok((StatusCode::CREATED, body).into_response())
}

/// PATCH /events/:id
pub async fn update_event(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Path(id): Path<i64>,
    AppJson(patch): AppJson<EventPatch>,
) -> Result<Json<EventResponse>, AppError> {
    let event = state.events.update(id, patch).await?;
    Ok(event_response("Event updated successfully", event))
}

/// DELETE /events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    state.events.delete(id).await?;
    Ok(message_response("Event deleted successfully"))
}

/// POST /events/:id/complete
pub async fn complete_event(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Path(id): Path<i64>,
) -> Result<Json<EventResponse>, AppError> {
    let event = lifecycle::mark_completed(state.events.as_ref(), id).await?;
    Ok(event_response("Event marked as completed", event))
}

/// POST /events/:id/cancel
pub async fn cancel_event(
    State(state): State<AppState>,
    _caller: CallerIdentity,
    Path(id): Path<i64>,
) -> Result<Json<EventResponse>, AppError> {
    let event = lifecycle::cancel(state.events.as_ref(), id).await?;
    Ok(event_response("Event cancelled", event))
}

/// Creation is restricted to synced users holding the admin role. Callers
/// the webhook has never delivered are refused the same way.
async fn require_admin(state: &AppState, caller: &CallerIdentity) -> Result<(), AppError> {
    let user = state.users.find_by_external_id(&caller.external_id).await?;
    match user {
        Some(user) if user.role == UserRole::Admin => Ok(()),
        _ => Err(AppError::Forbidden(
            "admin role required to create events".to_string(),
        )),
    }
}
