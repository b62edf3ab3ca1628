use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;

use eventboard_server::auth::AuthVerifier;
use eventboard_server::config::{Config, StorageBackend};
use eventboard_server::routes::create_routes;
use eventboard_server::state::AppState;
use eventboard_server::store::{MemEventStore, MemUserStore, PgEventStore, PgUserStore};
use eventboard_server::webhook::WebhookVerifier;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    let auth = AuthVerifier::new(&config.auth_secret);
    let webhook = WebhookVerifier::new(&config.webhook_secret)
        .expect("WEBHOOK_SECRET must be 'whsec_' followed by base64");

    let state = match config.storage {
        StorageBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&config.database_url)
                .await
                .expect("Failed to connect to database");

            tracing::info!("Successfully connected to database");

            sqlx::migrate!()
                .run(&pool)
                .await
                .expect("Failed to run migrations");

            tracing::info!("Migrations run successfully");

            AppState::new(
                config.clone(),
                Arc::new(PgEventStore::new(pool.clone())),
                Arc::new(PgUserStore::new(pool)),
                auth,
                webhook,
            )
        }
        StorageBackend::Memory => {
            tracing::info!("Using in-memory storage; records do not survive a restart");

            AppState::new(
                config.clone(),
                Arc::new(MemEventStore::new()),
                Arc::new(MemUserStore::new()),
                auth,
                webhook,
            )
        }
    };

    let app: Router = create_routes(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
