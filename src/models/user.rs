use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Role of a synced user. New records default to `User`; promotion to
/// `Admin` happens out of band and survives later profile re-syncs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

/// Local copy of an identity-provider user, keyed by the provider's id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub external_id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upsert payload for the identity sync. `role` applies on first insert
/// only; an existing record keeps whatever role it already has.
#[derive(Debug, Clone)]
pub struct UserUpsert {
    pub external_id: String,
    pub name: String,
    pub email: String,
    pub role: Option<UserRole>,
}
