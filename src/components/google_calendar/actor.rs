use super::models::{CalendarEvent, CalendarList, EventList, EventTime, EventWrite};
use super::token::TokenManager;
use crate::components::redis_service::RedisActorHandle;
use crate::config::Config;
use crate::error::{google_calendar_error, AppResult, Error};
use crate::schedule::{ExistingEvent, ShiftRecord};
use crate::utils::time::{day_bounds, local_to_utc, utc_to_local};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, info};
use url::Url;

/// Base of the Calendar REST API
const API_BASE: &str = "https://www.googleapis.com/calendar/v3/";

/// New event to create
pub struct NewEvent {
    pub calendar_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
    pub timezone: String,
}

/// Changes to an existing event
pub struct EventPatch {
    pub calendar_id: String,
    pub event_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
}

/// The Google Calendar actor that processes messages
pub struct GoogleCalendarActor {
    config: Arc<RwLock<Config>>,
    token_manager: TokenManager,
    client: Client,
    command_rx: mpsc::Receiver<GoogleCalendarCommand>,
}

/// Commands that can be sent to the Google Calendar actor
pub enum GoogleCalendarCommand {
    EnsureAccess(mpsc::Sender<AppResult<()>>),
    FindWritableCalendar(String, mpsc::Sender<AppResult<String>>),
    FindEventForDay(String, NaiveDate, mpsc::Sender<AppResult<Option<ExistingEvent>>>),
    FindEventsInRange(
        String,
        NaiveDateTime,
        NaiveDateTime,
        mpsc::Sender<AppResult<Vec<ShiftRecord>>>,
    ),
    InsertEvent(NewEvent, mpsc::Sender<AppResult<()>>),
    UpdateEvent(EventPatch, mpsc::Sender<AppResult<()>>),
    Shutdown,
}

/// Handle for communicating with the Google Calendar actor
#[derive(Clone)]
pub struct GoogleCalendarActorHandle {
    command_tx: mpsc::Sender<GoogleCalendarCommand>,
}

impl GoogleCalendarActorHandle {
    /// Send a command and wait for its reply
    pub async fn request<T>(
        &self,
        build: impl FnOnce(mpsc::Sender<AppResult<T>>) -> GoogleCalendarCommand,
    ) -> AppResult<T> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(build(response_tx))
            .await
            .map_err(|e| google_calendar_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| google_calendar_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> AppResult<()> {
        let _ = self.command_tx.send(GoogleCalendarCommand::Shutdown).await;
        Ok(())
    }
}

impl GoogleCalendarActor {
    /// Create a new actor and return its handle
    pub fn new(
        config: Arc<RwLock<Config>>,
        redis_handle: RedisActorHandle,
    ) -> (Self, GoogleCalendarActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            config: Arc::clone(&config),
            token_manager: TokenManager::new(config, redis_handle),
            client: Client::new(),
            command_rx,
        };

        let handle = GoogleCalendarActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Google Calendar actor started");

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                GoogleCalendarCommand::EnsureAccess(response_tx) => {
                    let result = self.token_manager.access_token().await.map(|_| ());
                    let _ = response_tx.send(result).await;
                }
                GoogleCalendarCommand::FindWritableCalendar(account, response_tx) => {
                    let result = self.find_writable_calendar(&account).await;
                    let _ = response_tx.send(result).await;
                }
                GoogleCalendarCommand::FindEventForDay(calendar_id, date, response_tx) => {
                    let result = self.find_event_for_day(&calendar_id, date).await;
                    let _ = response_tx.send(result).await;
                }
                GoogleCalendarCommand::FindEventsInRange(calendar_id, from, to, response_tx) => {
                    let result = self.find_events_in_range(&calendar_id, from, to).await;
                    let _ = response_tx.send(result).await;
                }
                GoogleCalendarCommand::InsertEvent(event, response_tx) => {
                    let result = self.insert_event(event).await;
                    let _ = response_tx.send(result).await;
                }
                GoogleCalendarCommand::UpdateEvent(patch, response_tx) => {
                    let result = self.update_event(patch).await;
                    let _ = response_tx.send(result).await;
                }
                GoogleCalendarCommand::Shutdown => {
                    info!("Google Calendar actor shutting down");
                    break;
                }
            }
        }

        info!("Google Calendar actor shut down");
    }

    async fn find_writable_calendar(&self, account: &str) -> AppResult<String> {
        let mut page_token: Option<String> = None;

        loop {
            let mut url = api_url(&["users", "me", "calendarList"])?;
            url.query_pairs_mut().append_pair("minAccessRole", "writer");
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let page: CalendarList = self.get_json(url).await?;
            if let Some(entry) = page
                .items
                .iter()
                .find(|entry| entry.is_writable() && entry.id.eq_ignore_ascii_case(account))
            {
                return Ok(entry.id.clone());
            }

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Err(Error::CalendarLookup {
            account: account.to_string(),
        })
    }

    async fn find_event_for_day(
        &self,
        calendar_id: &str,
        date: NaiveDate,
    ) -> AppResult<Option<ExistingEvent>> {
        let (from, to) = day_bounds(date);
        let events = self.list_events(calendar_id, from, to).await?;

        Ok(events.iter().find_map(CalendarEvent::to_existing))
    }

    async fn find_events_in_range(
        &self,
        calendar_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> AppResult<Vec<ShiftRecord>> {
        let tz = self.config.read().await.tz()?;
        let events = self.list_events(calendar_id, from, to).await?;

        let shifts = events
            .iter()
            .filter_map(|event| {
                let existing = event.to_existing()?;
                ShiftRecord::new(
                    event.title(),
                    utc_to_local(&tz, existing.start),
                    utc_to_local(&tz, existing.end),
                )
            })
            .collect();

        Ok(shifts)
    }

    /// Events starting in `[from, to)` local time that are not cancelled
    async fn list_events(
        &self,
        calendar_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> AppResult<Vec<CalendarEvent>> {
        let tz = self.config.read().await.tz()?;
        let time_min = local_to_utc(&tz, from);
        let time_max = local_to_utc(&tz, to);

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = api_url(&["calendars", calendar_id, "events"])?;
            url.query_pairs_mut()
                .append_pair("timeMin", &time_min.to_rfc3339())
                .append_pair("timeMax", &time_max.to_rfc3339())
                .append_pair("singleEvents", "true")
                .append_pair("orderBy", "startTime");
            if let Some(token) = &page_token {
                url.query_pairs_mut().append_pair("pageToken", token);
            }

            let page: EventList = self.get_json(url).await?;
            events.extend(page.items);

            match page.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        // The API also returns events that merely overlap the range
        events.retain(|event| {
            !event.is_cancelled()
                && event
                    .start
                    .instant()
                    .is_some_and(|start| start >= time_min && start < time_max)
        });
        debug!(
            "Found {} events in {} between {} and {}",
            events.len(),
            calendar_id,
            from,
            to
        );

        Ok(events)
    }

    async fn insert_event(&self, event: NewEvent) -> AppResult<()> {
        let url = api_url(&["calendars", &event.calendar_id, "events"])?;
        let body = EventWrite {
            summary: event.title,
            start: EventTime::at(event.start, Some(&event.timezone)),
            end: EventTime::at(event.end, Some(&event.timezone)),
        };

        let access_token = self.token_manager.access_token().await?;
        let response = self
            .client
            .post(url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;
        check_response(response, "insert event").await?;

        info!("Inserted '{}' at {}", body.summary, event.start);
        Ok(())
    }

    async fn update_event(&self, patch: EventPatch) -> AppResult<()> {
        let url = api_url(&["calendars", &patch.calendar_id, "events", &patch.event_id])?;
        let body = EventWrite {
            summary: patch.title,
            start: EventTime::at(patch.start, None),
            end: EventTime::at(patch.end, None),
        };

        let access_token = self.token_manager.access_token().await?;
        let response = self
            .client
            .patch(url)
            .bearer_auth(access_token)
            .json(&body)
            .send()
            .await?;
        check_response(response, "update event").await?;

        info!("Updated event {} to '{}'", patch.event_id, body.summary);
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> AppResult<T> {
        let access_token = self.token_manager.access_token().await?;
        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = check_response(response, "fetch").await?;
        response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse response: {}", e)))
    }
}

/// Build an API URL, escaping each path segment
fn api_url(segments: &[&str]) -> AppResult<Url> {
    let mut url = Url::parse(API_BASE)
        .map_err(|e| google_calendar_error(&format!("Failed to parse URL: {}", e)))?;

    url.path_segments_mut()
        .map_err(|_| google_calendar_error("API base URL cannot have a path"))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

async fn check_response(response: Response, action: &str) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(Error::PermissionDenied);
    }

    let error_body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response".to_string());
    Err(google_calendar_error(&format!(
        "Failed to {}: HTTP {} - {}",
        action, status, error_body
    )))
}
