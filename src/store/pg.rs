//! Postgres backends. Each operation is a single statement, so partial
//! writes cannot be observed; `updated_at` and the insert timestamps come
//! from the database clock. Schema lives under `migrations/`.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{check_draft, check_patch, EventStore, StoreError, UserStore};
use crate::models::{Event, EventPatch, NewEvent, User, UserUpsert};

#[derive(Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn create(&self, draft: NewEvent) -> Result<Event, StoreError> {
        let checked = check_draft(draft, Utc::now())?;

        let event = sqlx::query_as::<_, Event>(
            "INSERT INTO events (title, description, date, location, status) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, title, description, date, location, status, created_at, updated_at",
        )
        .bind(&checked.title)
        .bind(&checked.description)
        .bind(checked.date)
        .bind(&checked.location)
        .bind(checked.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    async fn list(&self) -> Result<Vec<Event>, StoreError> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT id, title, description, date, location, status, created_at, updated_at \
             FROM events ORDER BY date ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn get(&self, id: i64) -> Result<Event, StoreError> {
        sqlx::query_as::<_, Event>(
            "SELECT id, title, description, date, location, status, created_at, updated_at \
             FROM events WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: i64, patch: EventPatch) -> Result<Event, StoreError> {
        check_patch(&patch)?;

        // COALESCE keeps the stored value for fields absent from the patch;
        // updated_at refreshes unconditionally.
        sqlx::query_as::<_, Event>(
            "UPDATE events SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                date = COALESCE($4, date), \
                location = COALESCE($5, location), \
                status = COALESCE($6, status), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id, title, description, date, location, status, created_at, updated_at",
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.date)
        .bind(patch.location)
        .bind(patch.status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn upsert(&self, record: UserUpsert) -> Result<User, StoreError> {
        // On conflict only the provider-owned profile fields move; role and
        // created_at stay as they are.
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, external_id, name, email, role) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 'user'::user_role)) \
             ON CONFLICT (external_id) DO UPDATE SET \
                name = EXCLUDED.name, \
                email = EXCLUDED.email, \
                updated_at = NOW() \
             RETURNING id, external_id, name, email, role, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&record.external_id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(record.role)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, external_id, name, email, role, created_at, updated_at \
             FROM users WHERE external_id = $1",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
