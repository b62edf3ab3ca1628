//! Event-management service: a small REST API over an event collection
//! with a date-derived lifecycle, plus webhook-driven user sync from the
//! identity provider. Storage is in-memory or Postgres behind one trait.

pub mod auth;
pub mod config;
pub mod handlers;
pub mod lifecycle;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;
pub mod webhook;

#[cfg(test)]
pub(crate) mod test_support;
