use crate::schedule::ExistingEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title given to events that have none
pub const DEFAULT_TITLE: &str = "Work";

/// Event as returned by the Calendar API
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub start: EventTime,
    #[serde(default)]
    pub end: EventTime,
}

/// Start or end of an event. All-day events only carry `date`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    pub fn at(instant: DateTime<Utc>, time_zone: Option<&str>) -> Self {
        Self {
            date_time: Some(instant.to_rfc3339()),
            date: None,
            time_zone: time_zone.map(str::to_string),
        }
    }

    pub fn instant(&self) -> Option<DateTime<Utc>> {
        let date_time = self.date_time.as_deref()?;
        DateTime::parse_from_rfc3339(date_time)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl CalendarEvent {
    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }

    /// Title shown when the event is read back as a shift
    pub fn title(&self) -> &str {
        self.summary.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    /// Timed events only; all-day entries are not shifts.
    ///
    /// The API drops empty summaries, so a missing one compares equal to a
    /// shift without a location.
    pub fn to_existing(&self) -> Option<ExistingEvent> {
        Some(ExistingEvent {
            id: self.id.clone(),
            start: self.start.instant()?,
            end: self.end.instant()?,
            title: self.summary.clone().unwrap_or_default(),
        })
    }
}

/// Page of `events.list`
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventList {
    #[serde(default)]
    pub items: Vec<CalendarEvent>,
    pub next_page_token: Option<String>,
}

/// Entry of `calendarList.list`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarListEntry {
    pub id: String,
    pub summary: Option<String>,
    pub access_role: Option<String>,
}

impl CalendarListEntry {
    pub fn is_writable(&self) -> bool {
        matches!(self.access_role.as_deref(), Some("owner") | Some("writer"))
    }
}

/// Page of `calendarList.list`
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CalendarList {
    #[serde(default)]
    pub items: Vec<CalendarListEntry>,
    pub next_page_token: Option<String>,
}

/// Body of `events.insert` and `events.patch`
#[derive(Debug, Serialize)]
pub struct EventWrite {
    pub summary: String,
    pub start: EventTime,
    pub end: EventTime,
}
