#![allow(dead_code)]

use async_trait::async_trait;
use autoschedule::error::{AppResult, Error};
use autoschedule::ports::{AlarmScheduler, AlarmStateStore, EventStore};
use autoschedule::schedule::{AlarmTime, ExistingEvent, ShiftRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::sync::Mutex;

/// Event kept by the in-memory calendar
#[derive(Debug, Clone)]
pub struct StoredEvent {
    pub id: String,
    pub calendar_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: Option<String>,
    pub cancelled: bool,
}

/// Calendar backed by a `Vec`, with the same day semantics as the real one
pub struct InMemoryEventStore {
    tz: Tz,
    access_granted: bool,
    calendars: Vec<String>,
    events: Mutex<Vec<StoredEvent>>,
    writes: Mutex<usize>,
}

impl InMemoryEventStore {
    pub fn new(tz: Tz, calendar: &str) -> Self {
        Self {
            tz,
            access_granted: true,
            calendars: vec![calendar.to_string()],
            events: Mutex::new(Vec::new()),
            writes: Mutex::new(0),
        }
    }

    pub fn without_access(mut self) -> Self {
        self.access_granted = false;
        self
    }

    pub fn without_calendars(mut self) -> Self {
        self.calendars.clear();
        self
    }

    /// Seed an event given in local wall-clock time
    pub async fn seed(
        &self,
        calendar_id: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
        title: Option<&str>,
        cancelled: bool,
    ) -> String {
        let mut events = self.events.lock().await;
        let id = format!("seed-{}", events.len());
        events.push(StoredEvent {
            id: id.clone(),
            calendar_id: calendar_id.to_string(),
            start: self.to_utc(start),
            end: self.to_utc(end),
            title: title.map(str::to_string),
            cancelled,
        });
        id
    }

    pub async fn events(&self) -> Vec<StoredEvent> {
        self.events.lock().await.clone()
    }

    /// Number of inserts and updates applied
    pub async fn writes(&self) -> usize {
        *self.writes.lock().await
    }

    fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        self.tz
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&local))
    }

    fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.tz).naive_local()
    }

    async fn live_events(&self, calendar_id: &str) -> Vec<StoredEvent> {
        let mut events: Vec<StoredEvent> = self
            .events
            .lock()
            .await
            .iter()
            .filter(|event| event.calendar_id == calendar_id && !event.cancelled)
            .cloned()
            .collect();
        events.sort_by_key(|event| event.start);
        events
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn ensure_access(&self) -> AppResult<()> {
        if self.access_granted {
            Ok(())
        } else {
            Err(Error::PermissionDenied)
        }
    }

    async fn find_writable_calendar(&self, account: &str) -> AppResult<String> {
        self.calendars
            .iter()
            .find(|id| id.eq_ignore_ascii_case(account))
            .cloned()
            .ok_or_else(|| Error::CalendarLookup {
                account: account.to_string(),
            })
    }

    async fn find_event_for_day(
        &self,
        calendar_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<ExistingEvent>> {
        let event = self
            .live_events(calendar_id)
            .await
            .into_iter()
            .find(|event| self.to_local(event.start).date() == date);

        Ok(event.map(|event| ExistingEvent {
            id: event.id,
            start: event.start,
            end: event.end,
            title: event.title.unwrap_or_default(),
        }))
    }

    async fn find_events_in_range(
        &self,
        calendar_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> AppResult<Vec<ShiftRecord>> {
        let shifts = self
            .live_events(calendar_id)
            .await
            .into_iter()
            .filter(|event| {
                let start = self.to_local(event.start);
                start >= from && start < to
            })
            .filter_map(|event| {
                ShiftRecord::new(
                    event.title.unwrap_or_else(|| "Work".to_string()),
                    self.to_local(event.start),
                    self.to_local(event.end),
                )
            })
            .collect();

        Ok(shifts)
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        title: &str,
        _timezone: &str,
    ) -> AppResult<()> {
        let mut events = self.events.lock().await;
        let id = format!("evt-{}", events.len());
        events.push(StoredEvent {
            id,
            calendar_id: calendar_id.to_string(),
            start,
            end,
            // Google drops empty summaries
            title: Some(title.to_string()).filter(|t| !t.is_empty()),
            cancelled: false,
        });
        *self.writes.lock().await += 1;
        Ok(())
    }

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        title: &str,
    ) -> AppResult<()> {
        let mut events = self.events.lock().await;
        let event = events
            .iter_mut()
            .find(|event| event.calendar_id == calendar_id && event.id == event_id)
            .ok_or_else(|| Error::GoogleCalendar(format!("No event {}", event_id)))?;

        event.start = start;
        event.end = end;
        event.title = Some(title.to_string()).filter(|t| !t.is_empty());
        *self.writes.lock().await += 1;
        Ok(())
    }
}

/// What the alarm scheduler was asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmRequest {
    Set(AlarmTime),
    Cancel(AlarmTime),
}

#[derive(Default)]
pub struct RecordingAlarmScheduler {
    requests: Mutex<Vec<AlarmRequest>>,
}

impl RecordingAlarmScheduler {
    pub async fn requests(&self) -> Vec<AlarmRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl AlarmScheduler for RecordingAlarmScheduler {
    async fn set_alarm(&self, time: AlarmTime) -> AppResult<()> {
        self.requests.lock().await.push(AlarmRequest::Set(time));
        Ok(())
    }

    async fn cancel_alarm(&self, time: AlarmTime) -> AppResult<()> {
        self.requests.lock().await.push(AlarmRequest::Cancel(time));
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAlarmState {
    last: Mutex<Option<AlarmTime>>,
}

impl InMemoryAlarmState {
    pub fn with_last(time: AlarmTime) -> Self {
        Self {
            last: Mutex::new(Some(time)),
        }
    }

    pub async fn last(&self) -> Option<AlarmTime> {
        *self.last.lock().await
    }
}

#[async_trait]
impl AlarmStateStore for InMemoryAlarmState {
    async fn load_last_alarm(&self) -> AppResult<Option<AlarmTime>> {
        Ok(*self.last.lock().await)
    }

    async fn save_last_alarm(&self, time: AlarmTime) -> AppResult<()> {
        *self.last.lock().await = Some(time);
        Ok(())
    }

    async fn clear_last_alarm(&self) -> AppResult<()> {
        *self.last.lock().await = None;
        Ok(())
    }
}

/// Local wall-clock time on a given day of September 2025
pub fn sep(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}
