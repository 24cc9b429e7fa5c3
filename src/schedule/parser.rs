//! Turns OCR text of a schedule table into shifts.
//!
//! The recognizer reads the table column by column, so the expected text is a
//! day-of-month line, a weekday line, then somewhere below a time range line
//! followed by a `Location:` line for each day:
//!
//! ```text
//! 15
//! Mon
//! 16
//! Tue
//! 9:00 AM - 5:00 PM
//! Location: Store A
//! 11:00 PM - 3:00 AM
//! Location: Store B
//! ```
//!
//! Anything that does not fit is dropped instead of reported.

use super::models::ShiftRecord;
use crate::utils::time::{first_of_month, parse_clock_time, shift_month};
use chrono::{Datelike, Duration, Local, Months, NaiveDate, Weekday};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref DAY_NUMBER: Regex =
        Regex::new(r"^\s*([0-9]{1,2})\s*$").expect("valid day number regex");
    static ref WEEKDAY: Regex =
        Regex::new(r"(?i)^(Mon|Tue|Wed|Thu|Fri|Sat|Sun)$").expect("valid weekday regex");
    static ref TIME_RANGE: Regex = Regex::new(
        r"(?i)([0-9]{1,2}:[0-9]{2}\s?[AP]M)\s*-\s*([0-9]{1,2}:[0-9]{2}\s?[AP]M)"
    )
    .expect("valid time range regex");
    static ref LOCATION: Regex =
        Regex::new(r"(?i)^Location:\s*(.+)$").expect("valid location regex");
}

/// Column header of the schedule table, filled in as the text is scanned
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Header {
    pub day_number: u32,
    pub day_of_week: Weekday,
    pub start_text: Option<String>,
    pub end_text: Option<String>,
    pub location: Option<String>,
}

impl Header {
    fn new(day_number: u32, day_of_week: Weekday) -> Self {
        Self {
            day_number,
            day_of_week,
            start_text: None,
            end_text: None,
            location: None,
        }
    }
}

/// Parse recognized schedule text relative to today's local date
pub fn parse(raw: &str) -> Vec<ShiftRecord> {
    parse_with_today(raw, Local::now().date_naive())
}

/// Parse recognized schedule text, resolving day numbers around `today`
pub fn parse_with_today(raw: &str, today: NaiveDate) -> Vec<ShiftRecord> {
    let lines: Vec<&str> = raw.split('\n').map(str::trim).collect();

    let mut headers = discover_headers(&lines);
    if headers.is_empty() {
        debug!("No day headers recognized in {} lines", lines.len());
        return Vec::new();
    }

    attach_fields(&lines, &mut headers);
    resolve_shifts(&headers, today)
}

/// First pass: a day-number line followed by a weekday line opens a header.
pub(crate) fn discover_headers(lines: &[&str]) -> Vec<Header> {
    let mut headers = Vec::new();
    let mut pending_day: Option<u32> = None;

    for line in lines {
        if let Some(captures) = DAY_NUMBER.captures(line) {
            pending_day = captures[1].parse().ok();
            continue;
        }

        let Some(day_number) = pending_day else {
            continue;
        };
        if !WEEKDAY.is_match(line) {
            continue;
        }
        let Some(day_of_week) = weekday_from_abbreviation(line) else {
            continue;
        };

        headers.push(Header::new(day_number, day_of_week));
        pending_day = None;
    }

    headers
}

/// Second pass: time ranges and locations are handed out to headers in
/// order. A location line completes the current header.
pub(crate) fn attach_fields(lines: &[&str], headers: &mut [Header]) {
    let mut current = 0;

    for line in lines {
        let Some(header) = headers.get_mut(current) else {
            break;
        };

        if let Some(captures) = LOCATION.captures(line) {
            header.location = Some(captures[1].trim().to_string());
            current += 1;
            continue;
        }

        if let Some(captures) = TIME_RANGE.captures(line) {
            header.start_text = Some(captures[1].to_string());
            header.end_text = Some(captures[2].to_string());
        }
    }
}

/// Third pass: pin headers to real dates and build the shifts.
fn resolve_shifts(headers: &[Header], today: NaiveDate) -> Vec<ShiftRecord> {
    let Some(first) = headers.first() else {
        return Vec::new();
    };
    let Some(first_date) = resolve_first_date(first, today) else {
        debug!(
            "Day {} does not exist around {}, nothing to import",
            first.day_number, today
        );
        return Vec::new();
    };

    let mut month = first_of_month(first_date);
    let mut last_day_number = 0;
    let mut shifts = Vec::new();

    for header in headers {
        let (Some(start_text), Some(end_text)) = (&header.start_text, &header.end_text) else {
            debug!("Skipping day {} without a time range", header.day_number);
            continue;
        };

        // Day numbers only go down when the table crosses into the next month
        if header.day_number < last_day_number {
            match month.checked_add_months(Months::new(1)) {
                Some(next) => month = next,
                None => break,
            }
        }
        last_day_number = header.day_number;

        let Some(date) = NaiveDate::from_ymd_opt(month.year(), month.month(), header.day_number)
        else {
            debug!("Day {} does not exist in {}", header.day_number, month.format("%Y-%m"));
            continue;
        };

        let (Some(start_time), Some(end_time)) =
            (parse_clock_time(start_text), parse_clock_time(end_text))
        else {
            debug!("Unreadable time range '{} - {}'", start_text, end_text);
            continue;
        };

        let start = date.and_time(start_time);
        let mut end = date.and_time(end_time);
        if end <= start {
            // Overnight shift
            end += Duration::days(1);
        }

        let location = header.location.clone().unwrap_or_default();
        if let Some(shift) = ShiftRecord::with_weekday(location, header.day_of_week, start, end) {
            shifts.push(shift);
        }
    }

    shifts
}

/// Find the month of the first header by trying the previous, current and
/// next month for a date that falls on the printed weekday. Falls back to the
/// current month even when the weekday disagrees.
fn resolve_first_date(first: &Header, today: NaiveDate) -> Option<NaiveDate> {
    let this_month = first_of_month(today);

    for offset in [-1, 0, 1] {
        let Some(month) = shift_month(this_month, offset) else {
            continue;
        };
        let candidate = NaiveDate::from_ymd_opt(month.year(), month.month(), first.day_number);
        if let Some(date) = candidate.filter(|d| d.weekday() == first.day_of_week) {
            return Some(date);
        }
    }

    NaiveDate::from_ymd_opt(today.year(), today.month(), first.day_number)
}

fn weekday_from_abbreviation(text: &str) -> Option<Weekday> {
    match text.to_ascii_uppercase().as_str() {
        "MON" => Some(Weekday::Mon),
        "TUE" => Some(Weekday::Tue),
        "WED" => Some(Weekday::Wed),
        "THU" => Some(Weekday::Thu),
        "FRI" => Some(Weekday::Fri),
        "SAT" => Some(Weekday::Sat),
        "SUN" => Some(Weekday::Sun),
        _ => None,
    }
}
