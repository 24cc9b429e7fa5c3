//! Interfaces to the outside world: text recognition, calendar storage and
//! the platform alarm clock.

use crate::error::AppResult;
use crate::schedule::{AlarmTime, ExistingEvent, ShiftRecord};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Turns a screenshot into text
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Fails with `Error::Decode` when the bytes are not an image
    async fn extract(&self, image_data: &[u8]) -> AppResult<String>;
}

/// Calendar storage for shifts
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Fails with `Error::PermissionDenied` when calendar access is missing
    async fn ensure_access(&self) -> AppResult<()>;

    /// Find the writable calendar of an account.
    ///
    /// Fails with `Error::CalendarLookup` when there is none.
    async fn find_writable_calendar(&self, account: &str) -> AppResult<String>;

    /// First event starting on `date` (local day)
    async fn find_event_for_day(
        &self,
        calendar_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<ExistingEvent>>;

    /// Events starting in `[from, to)` local time, read back as shifts
    async fn find_events_in_range(
        &self,
        calendar_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> AppResult<Vec<ShiftRecord>>;

    async fn insert_event(
        &self,
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        title: &str,
        timezone: &str,
    ) -> AppResult<()>;

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        title: &str,
    ) -> AppResult<()>;
}

/// Daily repeating alarm of the platform clock
#[async_trait]
pub trait AlarmScheduler: Send + Sync {
    async fn set_alarm(&self, time: AlarmTime) -> AppResult<()>;

    async fn cancel_alarm(&self, time: AlarmTime) -> AppResult<()>;
}

/// Remembers which alarm we set last so it can be dismissed later
#[async_trait]
pub trait AlarmStateStore: Send + Sync {
    async fn load_last_alarm(&self) -> AppResult<Option<AlarmTime>>;

    async fn save_last_alarm(&self, time: AlarmTime) -> AppResult<()>;

    async fn clear_last_alarm(&self) -> AppResult<()>;
}
