use super::models::ShiftRecord;
use crate::utils::time::parse_time;
use chrono::{Duration, NaiveDateTime, Timelike};
use std::fmt;
use std::str::FromStr;

/// Hours between the alarm and the first shift of the day
pub const ALARM_LEAD_HOURS: i64 = 2;

/// Pick the wake-up time for today's shifts.
///
/// Returns `None` when there is nothing to wake up for, or when the wake-up
/// time has already passed.
pub fn compute_alarm(todays_shifts: &[ShiftRecord], now: NaiveDateTime) -> Option<NaiveDateTime> {
    // min_by_key keeps the first of equal starts
    let first = todays_shifts.iter().min_by_key(|shift| shift.start())?;
    let trigger = first.start() - Duration::hours(ALARM_LEAD_HOURS);

    if trigger <= now {
        return None;
    }

    Some(trigger)
}

/// Wall-clock time of a daily alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmTime {
    pub hour: u32,
    pub minute: u32,
}

impl AlarmTime {
    pub fn from_trigger(trigger: NaiveDateTime) -> Self {
        Self {
            hour: trigger.hour(),
            minute: trigger.minute(),
        }
    }
}

impl fmt::Display for AlarmTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for AlarmTime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = parse_time(s).ok_or_else(|| format!("Invalid alarm time '{}'", s))?;
        Ok(Self { hour, minute })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 15)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn shift(start: NaiveDateTime, end: NaiveDateTime) -> ShiftRecord {
        ShiftRecord::new("Store", start, end).unwrap()
    }

    #[test]
    fn test_no_shifts_no_alarm() {
        assert_eq!(compute_alarm(&[], at(5, 0)), None);
    }

    #[test]
    fn test_alarm_two_hours_before_earliest_shift() {
        let shifts = [shift(at(13, 0), at(21, 0)), shift(at(9, 30), at(12, 0))];
        assert_eq!(compute_alarm(&shifts, at(5, 0)), Some(at(7, 30)));
    }

    #[test]
    fn test_trigger_at_now_is_too_late() {
        let shifts = [shift(at(9, 0), at(17, 0))];
        assert_eq!(compute_alarm(&shifts, at(7, 0)), None);
        assert_eq!(compute_alarm(&shifts, at(8, 0)), None);
        assert_eq!(compute_alarm(&shifts, at(6, 59)), Some(at(7, 0)));
    }

    #[test]
    fn test_alarm_may_fall_on_previous_day() {
        let shifts = [shift(at(1, 0), at(9, 0))];
        let trigger = compute_alarm(&shifts, at(0, 0) - Duration::hours(4)).unwrap();

        assert_eq!(AlarmTime::from_trigger(trigger).to_string(), "23:00");
    }

    #[test]
    fn test_alarm_time_round_trips_through_text() {
        let parsed: AlarmTime = "07:05".parse().unwrap();
        assert_eq!(parsed, AlarmTime { hour: 7, minute: 5 });
        assert_eq!(parsed.to_string(), "07:05");
        assert!("7h05".parse::<AlarmTime>().is_err());
    }
}
