use std::sync::Arc;

use crate::auth::AuthVerifier;
use crate::config::Config;
use crate::store::{EventStore, UserStore};
use crate::webhook::WebhookVerifier;

/// Shared application state, cloned into every handler by axum. The stores
/// sit behind trait objects so request code never knows which backend was
/// picked at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub events: Arc<dyn EventStore>,
    pub users: Arc<dyn UserStore>,
    pub auth: Arc<AuthVerifier>,
    pub webhook: Arc<WebhookVerifier>,
}

impl AppState {
    pub fn new(
        config: Config,
        events: Arc<dyn EventStore>,
        users: Arc<dyn UserStore>,
        auth: AuthVerifier,
        webhook: WebhookVerifier,
    ) -> Self {
        Self {
            config: Arc::new(config),
            events,
            users,
            auth: Arc::new(auth),
            webhook: Arc::new(webhook),
        }
    }
}
