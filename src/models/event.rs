use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Persisted status of an event. Only these three values ever reach storage;
/// the "past" label shown to users is computed at read time, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Draft of an event as submitted on create. Required fields are checked by
/// the store so both backends report the same validation failures; unknown
/// keys are rejected at deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewEvent {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub status: Option<EventStatus>,
}

/// Partial update. Absent (or null) fields are left untouched; `id`,
/// `created_at` and `updated_at` are not patchable and show up as unknown
/// keys, which deserialization rejects.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub status: Option<EventStatus>,
}

impl EventPatch {
    /// A patch that only moves the status, used by the lifecycle transitions.
    pub fn with_status(status: EventStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_lowercase_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&EventStatus::Upcoming).unwrap(),
            "\"upcoming\""
        );
        let parsed: EventStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, EventStatus::Cancelled);
    }

    #[test]
    fn status_rejects_values_outside_the_enum() {
        assert!(serde_json::from_str::<EventStatus>("\"past\"").is_err());
        assert!(serde_json::from_str::<EventStatus>("\"done\"").is_err());
    }

    #[test]
    fn new_event_parses_rfc3339_dates() {
        let draft: NewEvent = serde_json::from_str(
            r#"{"title": "Launch", "date": "2025-09-01T18:00:00Z", "location": "Berlin"}"#,
        )
        .unwrap();
        assert_eq!(draft.title.as_deref(), Some("Launch"));
        assert!(draft.date.is_some());
        assert!(draft.status.is_none());
    }

    #[test]
    fn patch_rejects_unknown_fields() {
        let err = serde_json::from_str::<EventPatch>(r#"{"id": 7, "title": "x"}"#);
        assert!(err.is_err());
        let err = serde_json::from_str::<EventPatch>(r#"{"created_at": "2025-01-01T00:00:00Z"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn patch_treats_null_as_absent() {
        let patch: EventPatch = serde_json::from_str(r#"{"title": null}"#).unwrap();
        assert!(patch.title.is_none());
    }
}
