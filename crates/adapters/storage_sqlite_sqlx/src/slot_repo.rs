//! `SQLite` implementation of [`SlotRepository`].
//!
//! One row per slot, following the persisted record layout: the geofence as
//! `latitude`/`longitude`/`radius_meters`, the window as milliseconds since
//! midnight, actions as a JSON array, `active_days` as `"ALL"` or a
//! comma-joined weekday list and `last_executed_day` as `YYYY-MM-DD`.

use std::str::FromStr;

use chrono::NaiveDate;
use sqlx::sqlite::{SqliteQueryResult, SqliteRow};
use sqlx::{FromRow, Row, SqlitePool};

use geoslot_app::ports::SlotRepository;
use geoslot_domain::error::{GeoSlotError, NotFoundError};
use geoslot_domain::geo::GeoPoint;
use geoslot_domain::id::SlotId;
use geoslot_domain::slot::{ActiveDays, AutomationAction, Slot, TimeWindow};

use crate::error::{StorageError, decode};

const DAY_FORMAT: &str = "%Y-%m-%d";

struct Wrapper(Slot);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Slot> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let latitude: f64 = row.try_get("latitude")?;
        let longitude: f64 = row.try_get("longitude")?;
        let radius_meters: f64 = row.try_get("radius_meters")?;
        let start_millis: i64 = row.try_get("start_millis")?;
        let end_millis: i64 = row.try_get("end_millis")?;
        let remind_before_minutes: i64 = row.try_get("remind_before_minutes")?;
        let actions_json: String = row.try_get("actions")?;
        let enabled: bool = row.try_get("enabled")?;
        let active_days: String = row.try_get("active_days")?;
        let is_inside_geofence: bool = row.try_get("is_inside_geofence")?;
        let last_executed_day: Option<String> = row.try_get("last_executed_day")?;

        let id = SlotId::from_str(&id).map_err(decode)?;
        let window = TimeWindow::from_millis(start_millis, end_millis).map_err(decode)?;
        let remind_before_minutes = u32::try_from(remind_before_minutes).map_err(decode)?;
        let actions: Vec<AutomationAction> =
            serde_json::from_str(&actions_json).map_err(decode)?;
        let active_days = ActiveDays::from_str(&active_days).map_err(decode)?;
        let last_executed_day = last_executed_day
            .map(|day| NaiveDate::parse_from_str(&day, DAY_FORMAT).map_err(decode))
            .transpose()?;

        Ok(Self(Slot {
            id,
            center: GeoPoint::new(latitude, longitude),
            radius_meters,
            window,
            remind_before_minutes,
            actions,
            enabled,
            active_days,
            is_inside_geofence,
            last_executed_day,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO slots (
        id, latitude, longitude, radius_meters, start_millis, end_millis,
        remind_before_minutes, actions, enabled, active_days,
        is_inside_geofence, last_executed_day
    )
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";

const UPDATE_CONFIGURATION: &str = r"
    UPDATE slots
    SET latitude = ?, longitude = ?, radius_meters = ?, start_millis = ?, end_millis = ?,
        remind_before_minutes = ?, actions = ?, enabled = ?, active_days = ?
    WHERE id = ?
";

const SELECT_BY_ID: &str = "SELECT * FROM slots WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM slots ORDER BY start_millis, id";
const SELECT_ENABLED: &str = "SELECT * FROM slots WHERE enabled = 1 ORDER BY start_millis, id";
const DELETE: &str = "DELETE FROM slots WHERE id = ?";
const SET_INSIDE: &str = "UPDATE slots SET is_inside_geofence = ? WHERE id = ?";
const SET_LAST_EXECUTED: &str = "UPDATE slots SET last_executed_day = ? WHERE id = ?";
const SET_ENABLED: &str = "UPDATE slots SET enabled = ? WHERE id = ?";

fn not_found(id: SlotId) -> GeoSlotError {
    NotFoundError {
        entity: "Slot",
        id: id.to_string(),
    }
    .into()
}

fn expect_row(result: &SqliteQueryResult, id: SlotId) -> Result<(), GeoSlotError> {
    if result.rows_affected() == 0 {
        Err(not_found(id))
    } else {
        Ok(())
    }
}

/// `SQLite`-backed slot store.
pub struct SqliteSlotRepository {
    pool: SqlitePool,
}

impl SqliteSlotRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl SlotRepository for SqliteSlotRepository {
    async fn create(&self, slot: Slot) -> Result<Slot, GeoSlotError> {
        let actions_json = serde_json::to_string(&slot.actions).map_err(StorageError::from)?;

        sqlx::query(INSERT)
            .bind(slot.id.to_string())
            .bind(slot.center.latitude)
            .bind(slot.center.longitude)
            .bind(slot.radius_meters)
            .bind(slot.window.start_millis())
            .bind(slot.window.end_millis())
            .bind(i64::from(slot.remind_before_minutes))
            .bind(&actions_json)
            .bind(slot.enabled)
            .bind(slot.active_days.to_string())
            .bind(slot.is_inside_geofence)
            .bind(slot.last_executed_day.map(|day| day.format(DAY_FORMAT).to_string()))
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        Ok(slot)
    }

    async fn get_by_id(&self, id: SlotId) -> Result<Option<Slot>, GeoSlotError> {
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(Wrapper::maybe(row))
    }

    async fn get_all(&self) -> Result<Vec<Slot>, GeoSlotError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn get_enabled(&self) -> Result<Vec<Slot>, GeoSlotError> {
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ENABLED)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    /// Replace the configuration columns. Membership and lock are left as stored.
    async fn update(&self, slot: Slot) -> Result<Slot, GeoSlotError> {
        let actions_json = serde_json::to_string(&slot.actions).map_err(StorageError::from)?;

        let result = sqlx::query(UPDATE_CONFIGURATION)
            .bind(slot.center.latitude)
            .bind(slot.center.longitude)
            .bind(slot.radius_meters)
            .bind(slot.window.start_millis())
            .bind(slot.window.end_millis())
            .bind(i64::from(slot.remind_before_minutes))
            .bind(&actions_json)
            .bind(slot.enabled)
            .bind(slot.active_days.to_string())
            .bind(slot.id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        expect_row(&result, slot.id)?;

        self.get_by_id(slot.id)
            .await?
            .ok_or_else(|| not_found(slot.id))
    }

    async fn delete(&self, id: SlotId) -> Result<(), GeoSlotError> {
        let result = sqlx::query(DELETE)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        expect_row(&result, id)
    }

    async fn set_inside_geofence(&self, id: SlotId, inside: bool) -> Result<(), GeoSlotError> {
        let result = sqlx::query(SET_INSIDE)
            .bind(inside)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        expect_row(&result, id)
    }

    async fn set_last_executed_day(&self, id: SlotId, day: NaiveDate) -> Result<(), GeoSlotError> {
        let result = sqlx::query(SET_LAST_EXECUTED)
            .bind(day.format(DAY_FORMAT).to_string())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        expect_row(&result, id)
    }

    async fn set_enabled(&self, id: SlotId, enabled: bool) -> Result<(), GeoSlotError> {
        let result = sqlx::query(SET_ENABLED)
            .bind(enabled)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        expect_row(&result, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use chrono::{NaiveTime, Weekday};

    async fn setup() -> SqliteSlotRepository {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteSlotRepository::new(db.pool().clone())
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn valid_slot() -> Slot {
        Slot::builder()
            .center(10.0, 10.0)
            .radius_meters(50.0)
            .window(TimeWindow::new(hm(9, 0), hm(10, 0)).unwrap())
            .action(AutomationAction::SetDnd { enabled: true })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_and_retrieve_slot_with_every_field() {
        let repo = setup().await;
        let slot = Slot::builder()
            .center(48.8584, 2.2945)
            .radius_meters(120.5)
            .window(TimeWindow::new(hm(7, 30), hm(8, 15)).unwrap())
            .remind_before_minutes(15)
            .action(AutomationAction::SendSms {
                message: "arrived".to_string(),
                contacts_csv: "+33100;+33200".to_string(),
            })
            .action(AutomationAction::SetVolume { ring: 2, media: 5 })
            .active_days(ActiveDays::only([Weekday::Mon, Weekday::Fri]))
            .inside_geofence(true)
            .last_executed_day(day(2026, 1, 12))
            .build()
            .unwrap();
        let id = slot.id;

        repo.create(slot.clone()).await.unwrap();
        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(fetched, slot);
    }

    #[tokio::test]
    async fn should_persist_record_layout_as_text() {
        let repo = setup().await;
        let mut slot = valid_slot();
        slot.active_days = ActiveDays::only([Weekday::Wed, Weekday::Mon]);
        slot.last_executed_day = Some(day(2026, 3, 4));
        let id = slot.id;
        repo.create(slot).await.unwrap();

        let (days, last, start): (String, Option<String>, i64) = sqlx::query_as(
            "SELECT active_days, last_executed_day, start_millis FROM slots WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_one(&repo.pool)
        .await
        .unwrap();
        assert_eq!(days, "MON,WED");
        assert_eq!(last.as_deref(), Some("2026-03-04"));
        assert_eq!(start, 9 * 3_600_000);
    }

    #[tokio::test]
    async fn should_return_none_when_slot_not_found() {
        let repo = setup().await;
        assert!(repo.get_by_id(SlotId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_list_all_and_only_enabled_slots() {
        let repo = setup().await;
        repo.create(valid_slot()).await.unwrap();
        let mut disabled = valid_slot();
        disabled.enabled = false;
        repo.create(disabled).await.unwrap();

        assert_eq!(repo.get_all().await.unwrap().len(), 2);
        let enabled = repo.get_enabled().await.unwrap();
        assert_eq!(enabled.len(), 1);
        assert!(enabled[0].enabled);
    }

    #[tokio::test]
    async fn should_update_configuration_but_keep_runtime_state() {
        let repo = setup().await;
        let slot = valid_slot();
        let id = slot.id;
        repo.create(slot.clone()).await.unwrap();
        repo.set_inside_geofence(id, true).await.unwrap();
        repo.set_last_executed_day(id, day(2026, 1, 13))
            .await
            .unwrap();

        let mut edited = slot;
        edited.radius_meters = 300.0;
        edited.window = TimeWindow::new(hm(18, 0), hm(19, 0)).unwrap();
        edited.is_inside_geofence = false;
        edited.last_executed_day = None;
        let updated = repo.update(edited).await.unwrap();

        assert_eq!(updated.radius_meters, 300.0);
        assert_eq!(updated.window.start, hm(18, 0));
        assert!(updated.is_inside_geofence);
        assert_eq!(updated.last_executed_day, Some(day(2026, 1, 13)));
    }

    #[tokio::test]
    async fn should_return_not_found_when_updating_missing_slot() {
        let repo = setup().await;
        let result = repo.update(valid_slot()).await;
        assert!(matches!(result, Err(GeoSlotError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_delete_slot() {
        let repo = setup().await;
        let slot = valid_slot();
        let id = slot.id;
        repo.create(slot).await.unwrap();

        repo.delete(id).await.unwrap();
        assert!(repo.get_by_id(id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(id).await,
            Err(GeoSlotError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_commit_narrow_mutations() {
        let repo = setup().await;
        let slot = valid_slot();
        let id = slot.id;
        repo.create(slot).await.unwrap();

        repo.set_inside_geofence(id, true).await.unwrap();
        repo.set_last_executed_day(id, day(2026, 1, 13))
            .await
            .unwrap();
        repo.set_enabled(id, false).await.unwrap();

        let fetched = repo.get_by_id(id).await.unwrap().unwrap();
        assert!(fetched.is_inside_geofence);
        assert_eq!(fetched.last_executed_day, Some(day(2026, 1, 13)));
        assert!(!fetched.enabled);
    }

    #[tokio::test]
    async fn should_return_not_found_when_mutating_missing_slot() {
        let repo = setup().await;
        let id = SlotId::new();
        assert!(matches!(
            repo.set_inside_geofence(id, true).await,
            Err(GeoSlotError::NotFound(_))
        ));
        assert!(matches!(
            repo.set_last_executed_day(id, day(2026, 1, 13)).await,
            Err(GeoSlotError::NotFound(_))
        ));
        assert!(matches!(
            repo.set_enabled(id, true).await,
            Err(GeoSlotError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_fail_to_decode_corrupt_active_days() {
        let repo = setup().await;
        let slot = valid_slot();
        let id = slot.id;
        repo.create(slot).await.unwrap();
        sqlx::query("UPDATE slots SET active_days = 'FUNDAY' WHERE id = ?")
            .bind(id.to_string())
            .execute(&repo.pool)
            .await
            .unwrap();

        assert!(matches!(
            repo.get_by_id(id).await,
            Err(GeoSlotError::Storage(_))
        ));
    }
}
