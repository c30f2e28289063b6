//! `SQLite` implementation of [`EventStore`], the diagnostics log.

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use geoslot_app::ports::EventStore;
use geoslot_domain::error::GeoSlotError;
use geoslot_domain::event::{Event, EventType};
use geoslot_domain::id::{EventId, SlotId};

use crate::error::{StorageError, decode};

struct Wrapper(Event);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Event> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let event_type: String = row.try_get("event_type")?;
        let slot_id: Option<String> = row.try_get("slot_id")?;
        let timestamp_str: String = row.try_get("timestamp")?;
        let data_json: String = row.try_get("data")?;

        let id = EventId::from_str(&id).map_err(decode)?;
        let event_type = EventType::from_str(&event_type).map_err(decode)?;
        let slot_id = slot_id
            .map(|id| SlotId::from_str(&id).map_err(decode))
            .transpose()?;
        let timestamp = chrono::DateTime::parse_from_rfc3339(&timestamp_str)
            .map_err(decode)?
            .to_utc();
        let data: serde_json::Value = serde_json::from_str(&data_json).map_err(decode)?;

        Ok(Self(Event {
            id,
            event_type,
            slot_id,
            timestamp,
            data,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO events (id, event_type, slot_id, timestamp, data)
    VALUES (?, ?, ?, ?, ?)
";

const SELECT_BY_ID: &str = "SELECT * FROM events WHERE id = ?";
const SELECT_RECENT: &str = "SELECT * FROM events ORDER BY timestamp DESC, rowid DESC LIMIT ?";
const SELECT_BY_SLOT: &str =
    "SELECT * FROM events WHERE slot_id = ? ORDER BY timestamp DESC, rowid DESC LIMIT ?";

/// `SQLite`-backed event store.
pub struct SqliteEventStore {
    pool: SqlitePool,
}

impl SqliteEventStore {
    /// Create a new event store using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl EventStore for SqliteEventStore {
    async fn store(&self, event: Event) -> Result<Event, GeoSlotError> {
        let data_json = serde_json::to_string(&event.data).map_err(StorageError::from)?;

        sqlx::query(INSERT)
            .bind(event.id.to_string())
            .bind(event.event_type.as_str())
            .bind(event.slot_id.map(|id| id.to_string()))
            .bind(
                event
                    .timestamp
                    .to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            )
            .bind(&data_json)
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(event)
    }

    async fn get_by_id(&self, id: EventId) -> Result<Option<Event>, GeoSlotError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(Wrapper::maybe(row))
    }

    async fn get_recent(&self, limit: usize) -> Result<Vec<Event>, GeoSlotError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_RECENT)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn find_by_slot(&self, slot_id: SlotId, limit: usize) -> Result<Vec<Event>, GeoSlotError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_SLOT)
            .bind(slot_id.to_string())
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
