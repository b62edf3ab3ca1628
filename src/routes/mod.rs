use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{events, health_check, webhooks};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/events", get(events::list_events).post(events::create_event))
        .route(
            "/events/:id",
            get(events::get_event)
                .patch(events::update_event)
                .delete(events::delete_event),
        )
        .route("/events/:id/complete", post(events::complete_event))
        .route("/events/:id/cancel", post(events::cancel_event))
        .route("/webhooks/identity", post(webhooks::identity_webhook))
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(state.config.production))
        .layer(create_cors_layer(&state.config.cors_origins))
        .with_state(state)
}
