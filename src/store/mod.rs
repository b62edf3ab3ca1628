//! Storage for events and synced identity-provider users.
//!
//! One trait per collection, with two interchangeable backends behind each:
//! a process-local in-memory map and a Postgres table. Handlers hold
//! `Arc<dyn EventStore>` / `Arc<dyn UserStore>`, so the backend is picked
//! once at startup and never leaks into request code.
//!
//! Writes validate before touching the collection, so a rejected request
//! leaves the data untouched. Updates are last-write-wins: two concurrent
//! patches to the same event both succeed and the later one sets the final
//! field values.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::lifecycle;
use crate::models::{Event, EventPatch, EventStatus, NewEvent, User, UserUpsert};

pub mod mem;
pub mod pg;

pub use mem::{MemEventStore, MemUserStore};
pub use pg::{PgEventStore, PgUserStore};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field was missing or blank on a write.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// No event with the given id exists.
    #[error("event {0} not found")]
    NotFound(i64),

    /// The backend could not serve the request. The cause is logged at the
    /// HTTP boundary and never shown to clients.
    #[error("storage unavailable")]
    Unavailable(#[from] sqlx::Error),
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Validates a draft and persists it with server-assigned id and
    /// timestamps. A draft without an explicit status gets one derived
    /// from its date.
    async fn create(&self, draft: NewEvent) -> Result<Event, StoreError>;

    /// Every event, ascending by date with id as the tiebreak.
    async fn list(&self) -> Result<Vec<Event>, StoreError>;

    async fn get(&self, id: i64) -> Result<Event, StoreError>;

    /// Applies the provided fields to an existing event and refreshes
    /// `updated_at`. Fields left out of the patch keep their values; id and
    /// `created_at` are never touched.
    async fn update(&self, id: i64, patch: EventPatch) -> Result<Event, StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;

    /// Cheap connectivity probe for health reporting.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts or refreshes the local copy of a provider-managed user,
    /// matched by external id. Name and email follow the provider on every
    /// sync; the stored role survives re-syncs so a promotion is not lost
    /// when the provider pushes a profile edit.
    async fn upsert(&self, record: UserUpsert) -> Result<User, StoreError>;

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, StoreError>;
}

/// A draft that passed validation, ready to persist.
#[derive(Debug)]
pub(crate) struct CheckedEvent {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub status: EventStatus,
}

/// Shared create-time validation: title, date, and location are required
/// (blank strings count as missing), description defaults to empty, and a
/// missing status falls back to the date-derived default.
pub(crate) fn check_draft(draft: NewEvent, now: DateTime<Utc>) -> Result<CheckedEvent, StoreError> {
    let title = required(draft.title, "title")?;
    let date = draft.date.ok_or(StoreError::MissingField("date"))?;
    let location = required(draft.location, "location")?;
    let status = draft
        .status
        .unwrap_or_else(|| lifecycle::default_status(date, now));

    Ok(CheckedEvent {
        title,
        description: draft.description.unwrap_or_default(),
        date,
        location,
        status,
    })
}

/// Shared update-time validation: fields present in the patch may not be
/// blanked out.
pub(crate) fn check_patch(patch: &EventPatch) -> Result<(), StoreError> {
    if matches!(patch.title.as_deref(), Some(title) if title.trim().is_empty()) {
        return Err(StoreError::MissingField("title"));
    }
    if matches!(patch.location.as_deref(), Some(location) if location.trim().is_empty()) {
        return Err(StoreError::MissingField("location"));
    }
    Ok(())
}

fn required(value: Option<String>, name: &'static str) -> Result<String, StoreError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(StoreError::MissingField(name)),
    }
}
