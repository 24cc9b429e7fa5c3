use chrono::{DateTime, Datelike, NaiveDateTime, Utc, Weekday};
use std::fmt;

/// One work interval read from a schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftRecord {
    location: String,
    day_of_week: Weekday,
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl ShiftRecord {
    /// Create a shift whose weekday follows its start date.
    ///
    /// Returns `None` unless `end` is after `start`.
    pub fn new(location: impl Into<String>, start: NaiveDateTime, end: NaiveDateTime) -> Option<Self> {
        Self::with_weekday(location, start.weekday(), start, end)
    }

    /// The parser keeps the weekday printed in the schedule header, which
    /// may disagree with the resolved date.
    pub(crate) fn with_weekday(
        location: impl Into<String>,
        day_of_week: Weekday,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Option<Self> {
        if end <= start {
            return None;
        }

        Some(Self {
            location: location.into(),
            day_of_week,
            start,
            end,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn day_of_week(&self) -> Weekday {
        self.day_of_week
    }

    /// Local wall-clock start
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Local wall-clock end
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }
}

impl fmt::Display for ShiftRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} - {}",
            self.day_of_week,
            self.start.format("%Y-%m-%d"),
            self.start.format("%H:%M"),
            self.end.format("%H:%M"),
        )?;

        if !self.location.is_empty() {
            write!(f, " @ {}", self.location)?;
        }

        Ok(())
    }
}

/// Calendar event already stored for a shift's day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingEvent {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
}

/// Result of comparing a proposed shift against the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    Added,
    Updated,
    Unchanged,
}

/// Write the caller applies to the event store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarMutation {
    Insert {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        title: String,
        timezone: String,
    },
    Update {
        id: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        title: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_derives_weekday_from_start() {
        let shift = ShiftRecord::new("Store A", at(17, 9), at(17, 17)).unwrap();
        assert_eq!(shift.day_of_week(), Weekday::Mon);
    }

    #[test]
    fn test_new_rejects_non_positive_interval() {
        assert!(ShiftRecord::new("Store A", at(17, 9), at(17, 9)).is_none());
        assert!(ShiftRecord::new("Store A", at(17, 9), at(17, 8)).is_none());
    }

    #[test]
    fn test_display_includes_location() {
        let shift = ShiftRecord::new("Store A", at(17, 9), at(17, 17)).unwrap();
        assert_eq!(shift.to_string(), "Mon 2025-03-17 09:00 - 17:00 @ Store A");
    }

    #[test]
    fn test_display_without_location() {
        let shift = ShiftRecord::new("", at(17, 9), at(17, 17)).unwrap();
        assert_eq!(shift.to_string(), "Mon 2025-03-17 09:00 - 17:00");
    }
}
