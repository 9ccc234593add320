use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::db::Db;
use crate::error::{StoreError, StoreResult};
use crate::models::Event;

const EVENT_COLUMNS: &str = "id, name, event_type, event_date, start_time, end_time, venue, \
    prefecture, max_participants, entry_fee, beginner_friendly, description, creator_id, \
    status, created_at, updated_at, deleted_at";

#[derive(Debug, FromRow)]
struct EventRecord {
    id: Uuid,
    name: String,
    event_type: String,
    event_date: String,
    start_time: Option<String>,
    end_time: Option<String>,
    venue: String,
    prefecture: String,
    max_participants: Option<i32>,
    entry_fee: Option<i32>,
    beginner_friendly: bool,
    description: Option<String>,
    creator_id: Option<Uuid>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<EventRecord> for Event {
    type Error = StoreError;

    fn try_from(r: EventRecord) -> Result<Self, Self::Error> {
        Ok(Event {
            id: r.id,
            name: r.name,
            event_type: r.event_type.parse().map_err(StoreError::InvalidInput)?,
            event_date: r.event_date,
            start_time: r.start_time,
            end_time: r.end_time,
            venue: r.venue,
            prefecture: r.prefecture,
            max_participants: r.max_participants,
            entry_fee: r.entry_fee,
            beginner_friendly: r.beginner_friendly,
            description: r.description,
            creator_id: r.creator_id,
            status: r.status.parse().map_err(StoreError::InvalidInput)?,
            created_at: r.created_at,
            updated_at: r.updated_at,
            deleted_at: r.deleted_at,
        })
    }
}

/// Events kept in Postgres when a database is configured.
#[derive(Clone)]
pub struct EventRepo {
    pool: Db,
}

impl EventRepo {
    pub fn new(pool: Db) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Db {
        &self.pool
    }

    /// All events that have not been soft-deleted.
    pub async fn list_active(&self) -> StoreResult<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRecord>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE deleted_at IS NULL ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Event::try_from).collect()
    }

    pub async fn get(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let row = sqlx::query_as::<_, EventRecord>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Event::try_from).transpose()
    }

    pub async fn insert(&self, event: &Event) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO events (id, name, event_type, event_date, start_time, end_time, venue,
                                prefecture, max_participants, entry_fee, beginner_friendly,
                                description, creator_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(event.event_type.as_str())
        .bind(&event.event_date)
        .bind(&event.start_time)
        .bind(&event.end_time)
        .bind(&event.venue)
        .bind(&event.prefecture)
        .bind(event.max_participants)
        .bind(event.entry_fee)
        .bind(event.beginner_friendly)
        .bind(&event.description)
        .bind(event.creator_id)
        .bind(event.status.as_str())
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Overwrite the mutable columns of an existing row. Returns whether a row
    /// matched.
    pub async fn update(&self, event: &Event) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET name = $2, event_type = $3, event_date = $4, start_time = $5, end_time = $6,
                venue = $7, prefecture = $8, max_participants = $9, entry_fee = $10,
                beginner_friendly = $11, description = $12, status = $13, updated_at = $14
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(event.event_type.as_str())
        .bind(&event.event_date)
        .bind(&event.start_time)
        .bind(&event.end_time)
        .bind(&event.venue)
        .bind(&event.prefecture)
        .bind(event.max_participants)
        .bind(event.entry_fee)
        .bind(event.beginner_friendly)
        .bind(&event.description)
        .bind(event.status.as_str())
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn soft_delete(&self, id: Uuid, at: DateTime<Utc>) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE events SET deleted_at = $2, updated_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
