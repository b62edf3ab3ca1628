use std::env;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_DATABASE_URL: &str = "postgres://localhost/eventboard";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

// Development fallbacks; deployments override both secrets.
const DEFAULT_AUTH_SECRET: &str = "dev-auth-secret";
const DEFAULT_WEBHOOK_SECRET: &str = "whsec_ZGV2LXdlYmhvb2stc2VjcmV0";

/// Which backend serves the stores, chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub storage: StorageBackend,
    pub database_url: String,
    pub auth_secret: String,
    pub webhook_secret: String,
    pub cors_origins: Vec<String>,
    pub production: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let storage = match env::var("STORAGE_BACKEND").as_deref() {
            Ok("postgres") => StorageBackend::Postgres,
            Ok("memory") | Err(_) => StorageBackend::Memory,
            Ok(other) => {
                tracing::warn!(
                    "Unknown STORAGE_BACKEND '{}', falling back to in-memory storage",
                    other
                );
                StorageBackend::Memory
            }
        };

        let cors_origins = parse_origins(
            &env::var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|_| DEFAULT_ALLOWED_ORIGINS.to_string()),
        );

        let production = env::var("RUST_ENV")
            .map(|value| value.to_lowercase() == "production")
            .unwrap_or(false);

        Self {
            port,
            storage,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            auth_secret: env::var("AUTH_SECRET").unwrap_or_else(|_| DEFAULT_AUTH_SECRET.to_string()),
            webhook_secret: env::var("WEBHOOK_SECRET")
                .unwrap_or_else(|_| DEFAULT_WEBHOOK_SECRET.to_string()),
            cors_origins,
            production,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
