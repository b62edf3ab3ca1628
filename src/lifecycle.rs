//! Status rules for events.
//!
//! The stored `status` field is authoritative for what the API returns; the
//! event date only feeds the create-time default and the display helpers
//! here. The two can therefore diverge on purpose: a future-dated event that
//! was explicitly marked completed stays completed. Nothing enforces
//! terminality either, so a later update may move a completed or cancelled
//! event back to upcoming.

use chrono::{DateTime, Utc};

use crate::models::{Event, EventPatch, EventStatus};
use crate::store::{EventStore, StoreError};

/// Status assigned when a create request carries none: events scheduled
/// after `now` start out upcoming, anything else is already completed.
pub fn default_status(date: DateTime<Utc>, now: DateTime<Utc>) -> EventStatus {
    if date > now {
        EventStatus::Upcoming
    } else {
        EventStatus::Completed
    }
}

/// True for future-dated events that were not completed or cancelled.
pub fn is_upcoming(event: &Event, now: DateTime<Utc>) -> bool {
    event.date > now
        && event.status != EventStatus::Completed
        && event.status != EventStatus::Cancelled
}

/// True once the date has passed, or as soon as the event is marked
/// completed regardless of its date.
pub fn is_past(event: &Event, now: DateTime<Utc>) -> bool {
    event.date <= now || event.status == EventStatus::Completed
}

/// Display bucket for callers that group events three ways. The predicates
/// are not complements: only a future-dated cancellation lands in
/// `Cancelled`; a cancelled event whose date already passed counts as past,
/// matching how the dashboard lists have always split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Upcoming,
    Past,
    Cancelled,
}

pub fn classify(event: &Event, now: DateTime<Utc>) -> Classification {
    if is_upcoming(event, now) {
        Classification::Upcoming
    } else if is_past(event, now) {
        Classification::Past
    } else {
        Classification::Cancelled
    }
}

/// Marks an event completed. Thin wrapper over a status-only update; no
/// extra rule guards the transition.
pub async fn mark_completed(store: &dyn EventStore, id: i64) -> Result<Event, StoreError> {
    store
        .update(id, EventPatch::with_status(EventStatus::Completed))
        .await
}

/// Cancels an event. Cancelling an already-completed event is permitted.
pub async fn cancel(store: &dyn EventStore, id: i64) -> Result<Event, StoreError> {
    store
        .update(id, EventPatch::with_status(EventStatus::Cancelled))
        .await
}
