//! In-memory backends. Records live in a `HashMap` behind a `tokio` lock
//! and vanish with the process; the default for local development and the
//! workhorse for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{check_draft, check_patch, EventStore, StoreError, UserStore};
use crate::models::{Event, EventPatch, NewEvent, User, UserRole, UserUpsert};

#[derive(Clone)]
pub struct MemEventStore {
    events: Arc<RwLock<HashMap<i64, Event>>>,
    next_id: Arc<AtomicI64>,
}

impl MemEventStore {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }
}

impl Default for MemEventStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventStore for MemEventStore {
    async fn create(&self, draft: NewEvent) -> Result<Event, StoreError> {
        let now = Utc::now();
        let checked = check_draft(draft, now)?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let event = Event {
            id,
            title: checked.title,
            description: checked.description,
            date: checked.date,
            location: checked.location,
            status: checked.status,
            created_at: now,
            updated_at: now,
        };

        self.events.write().await.insert(id, event.clone());
        Ok(event)
    }

    async fn list(&self) -> Result<Vec<Event>, StoreError> {
        let events = self.events.read().await;
        let mut all: Vec<Event> = events.values().cloned().collect();
        all.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn get(&self, id: i64) -> Result<Event, StoreError> {
        let events = self.events.read().await;
        events.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: i64, patch: EventPatch) -> Result<Event, StoreError> {
        check_patch(&patch)?;

        let mut events = self.events.write().await;
        let event = events.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        if let Some(title) = patch.title {
            event.title = title;
        }
        if let Some(description) = patch.description {
            event.description = description;
        }
        if let Some(date) = patch.date {
            event.date = date;
        }
        if let Some(location) = patch.location {
            event.location = location;
        }
        if let Some(status) = patch.status {
            event.status = status;
        }
        event.updated_at = Utc::now();

        Ok(event.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let mut events = self.events.write().await;
        events.remove(&id).map(|_| ()).ok_or(StoreError::NotFound(id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Users keyed by the provider's external id.
#[derive(Clone)]
pub struct MemUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl MemUserStore {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemUserStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemUserStore {
    async fn upsert(&self, record: UserUpsert) -> Result<User, StoreError> {
        let now = Utc::now();
        let mut users = self.users.write().await;

        let user = match users.get_mut(&record.external_id) {
            Some(existing) => {
                existing.name = record.name;
                existing.email = record.email;
                existing.updated_at = now;
                existing.clone()
            }
            None => {
                let user = User {
                    id: Uuid::new_v4(),
                    external_id: record.external_id.clone(),
                    name: record.name,
                    email: record.email,
                    role: record.role.unwrap_or(UserRole::User),
                    created_at: now,
                    updated_at: now,
                };
                users.insert(record.external_id, user.clone());
                user
            }
        };

        Ok(user)
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.get(external_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventStatus;
    use chrono::{Duration, Utc};

    fn draft(title: &str, offset: Duration) -> NewEvent {
        NewEvent {
            title: Some(title.to_string()),
            description: Some(format!("{title} description")),
            date: Some(Utc::now() + offset),
            location: Some("Main hall".to_string()),
            ..NewEvent::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_ids_and_derives_status() {
        let store = MemEventStore::new();

        let future = store.create(draft("Future", Duration::days(3))).await.unwrap();
        assert_eq!(future.id, 1);
        assert_eq!(future.status, EventStatus::Upcoming);
        assert_eq!(future.created_at, future.updated_at);

        let past = store.create(draft("Past", -Duration::days(3))).await.unwrap();
        assert_eq!(past.id, 2);
        assert_eq!(past.status, EventStatus::Completed);
    }

    #[tokio::test]
    async fn rejected_create_leaves_the_collection_unchanged() {
        let store = MemEventStore::new();
        store.create(draft("Kept", Duration::days(1))).await.unwrap();

        let mut missing_title = draft("ignored", Duration::days(1));
        missing_title.title = None;
        let result = store.create(missing_title).await;
        assert!(matches!(result, Err(StoreError::MissingField("title"))));

        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_orders_by_date_then_id() {
        let store = MemEventStore::new();
        let later = store.create(draft("Later", Duration::days(9))).await.unwrap();
        let sooner = store.create(draft("Sooner", Duration::days(2))).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(
            listed.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![sooner.id, later.id]
        );
    }

    #[tokio::test]
    async fn get_round_trips_the_stored_record() {
        let store = MemEventStore::new();
        let created = store.create(draft("Meetup", Duration::days(5))).await.unwrap();
        let fetched = store.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let store = MemEventStore::new();
        assert!(matches!(store.get(7).await, Err(StoreError::NotFound(7))));
    }

    #[tokio::test]
    async fn update_merges_only_the_provided_fields() {
        let store = MemEventStore::new();
        let created = store.create(draft("Original", Duration::days(5))).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let patch = EventPatch {
            location: Some("Rooftop".to_string()),
            ..EventPatch::default()
        };
        let updated = store.update(created.id, patch).await.unwrap();

        assert_eq!(updated.location, "Rooftop");
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.date, created.date);
        assert_eq!(updated.status, created.status);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn status_only_patch_touches_nothing_else() {
        let store = MemEventStore::new();
        let created = store.create(draft("Gala", Duration::days(5))).await.unwrap();

        let cancelled = store
            .update(created.id, EventPatch::with_status(EventStatus::Cancelled))
            .await
            .unwrap();

        assert_eq!(cancelled.status, EventStatus::Cancelled);
        assert_eq!(cancelled.title, created.title);
        assert_eq!(cancelled.description, created.description);
        assert_eq!(cancelled.date, created.date);
        assert_eq!(cancelled.location, created.location);
        assert_eq!(cancelled.created_at, created.created_at);
    }

    #[tokio::test]
    async fn empty_patch_still_refreshes_updated_at() {
        let store = MemEventStore::new();
        let created = store.create(draft("Untouched", Duration::days(5))).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let updated = store.update(created.id, EventPatch::default()).await.unwrap();
        assert_eq!(updated.title, created.title);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn invalid_patch_leaves_the_record_unchanged() {
        let store = MemEventStore::new();
        let created = store.create(draft("Stable", Duration::days(5))).await.unwrap();

        let blanked = EventPatch {
            title: Some("  ".to_string()),
            ..EventPatch::default()
        };
        assert!(store.update(created.id, blanked).await.is_err());

        let fetched = store.get(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let store = MemEventStore::new();
        let patch = EventPatch {
            title: Some("New".to_string()),
            ..EventPatch::default()
        };
        assert!(matches!(
            store.update(99, patch).await,
            Err(StoreError::NotFound(99))
        ));
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let store = MemEventStore::new();
        let keep = store.create(draft("Keep", Duration::days(1))).await.unwrap();
        let gone = store.create(draft("Drop", Duration::days(2))).await.unwrap();

        store.delete(gone.id).await.unwrap();

        assert!(matches!(
            store.get(gone.id).await,
            Err(StoreError::NotFound(_))
        ));
        let remaining = store.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, keep.id);
    }

    #[tokio::test]
    async fn delete_unknown_id_is_not_found() {
        let store = MemEventStore::new();
        assert!(matches!(store.delete(4).await, Err(StoreError::NotFound(4))));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemEventStore::new();
        let first = store.create(draft("First", Duration::days(1))).await.unwrap();
        store.delete(first.id).await.unwrap();
        let second = store.create(draft("Second", Duration::days(1))).await.unwrap();
        assert!(second.id > first.id);
    }

    fn sync(external_id: &str, name: &str, email: &str) -> UserUpsert {
        UserUpsert {
            external_id: external_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role: None,
        }
    }

    #[tokio::test]
    async fn upsert_inserts_with_the_default_role() {
        let store = MemUserStore::new();
        let user = store.upsert(sync("ext_1", "Ada", "ada@example.com")).await.unwrap();
        assert_eq!(user.role, UserRole::User);
        assert_eq!(user.external_id, "ext_1");

        let found = store.find_by_external_id("ext_1").await.unwrap();
        assert_eq!(found, Some(user));
    }

    #[tokio::test]
    async fn upsert_refreshes_profile_but_keeps_id_and_role() {
        let store = MemUserStore::new();
        let first = store
            .upsert(UserUpsert {
                role: Some(UserRole::Admin),
                ..sync("ext_2", "Grace", "grace@example.com")
            })
            .await
            .unwrap();
        assert_eq!(first.role, UserRole::Admin);

        let second = store
            .upsert(sync("ext_2", "Grace H.", "grace@new.example.com"))
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.role, UserRole::Admin);
        assert_eq!(second.name, "Grace H.");
        assert_eq!(second.email, "grace@new.example.com");
        assert_eq!(second.created_at, first.created_at);
    }

    #[tokio::test]
    async fn find_unknown_external_id_is_none() {
        let store = MemUserStore::new();
        assert_eq!(store.find_by_external_id("nope").await.unwrap(), None);
    }
}
