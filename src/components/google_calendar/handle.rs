use super::actor::{
    EventPatch, GoogleCalendarActor, GoogleCalendarActorHandle, GoogleCalendarCommand, NewEvent,
};
use crate::components::redis_service::RedisActorHandle;
use crate::config::Config;
use crate::error::AppResult;
use crate::ports::EventStore;
use crate::schedule::{ExistingEvent, ShiftRecord};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Handle for interacting with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarHandle {
    actor_handle: GoogleCalendarActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl GoogleCalendarHandle {
    /// Create a new GoogleCalendarHandle and spawn the actor
    pub fn new(config: Arc<RwLock<Config>>, redis_handle: RedisActorHandle) -> Self {
        let (mut actor, handle) = GoogleCalendarActor::new(config, redis_handle);

        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        self.actor_handle.shutdown().await
    }
}

#[async_trait]
impl EventStore for GoogleCalendarHandle {
    async fn ensure_access(&self) -> AppResult<()> {
        self.actor_handle
            .request(GoogleCalendarCommand::EnsureAccess)
            .await
    }

    async fn find_writable_calendar(&self, account: &str) -> AppResult<String> {
        let account = account.to_string();
        self.actor_handle
            .request(|tx| GoogleCalendarCommand::FindWritableCalendar(account, tx))
            .await
    }

    async fn find_event_for_day(
        &self,
        calendar_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<ExistingEvent>> {
        let calendar_id = calendar_id.to_string();
        self.actor_handle
            .request(|tx| GoogleCalendarCommand::FindEventForDay(calendar_id, date, tx))
            .await
    }

    async fn find_events_in_range(
        &self,
        calendar_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> AppResult<Vec<ShiftRecord>> {
        let calendar_id = calendar_id.to_string();
        self.actor_handle
            .request(|tx| GoogleCalendarCommand::FindEventsInRange(calendar_id, from, to, tx))
            .await
    }

    async fn insert_event(
        &self,
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        title: &str,
        timezone: &str,
    ) -> AppResult<()> {
        let event = NewEvent {
            calendar_id: calendar_id.to_string(),
            start,
            end,
            title: title.to_string(),
            timezone: timezone.to_string(),
        };
        self.actor_handle
            .request(|tx| GoogleCalendarCommand::InsertEvent(event, tx))
            .await
    }

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        title: &str,
    ) -> AppResult<()> {
        let patch = EventPatch {
            calendar_id: calendar_id.to_string(),
            event_id: event_id.to_string(),
            start,
            end,
            title: title.to_string(),
        };
        self.actor_handle
            .request(|tx| GoogleCalendarCommand::UpdateEvent(patch, tx))
            .await
    }
}
