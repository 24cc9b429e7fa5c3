use chrono::{
    DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};

/// Parse time string in HH:MM format
pub fn parse_time(time_str: &str) -> Option<(u32, u32)> {
    let parts: Vec<&str> = time_str.trim().split(':').collect();
    if parts.len() != 2 {
        return None;
    }
    let hour = parts[0].parse::<u32>().ok()?;
    let minute = parts[1].parse::<u32>().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    Some((hour, minute))
}

/// Parse a 12-hour clock time such as "9:00 AM", "09:00am" or "11:30 pm"
pub fn parse_clock_time(time_str: &str) -> Option<NaiveTime> {
    let compact: String = time_str
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();

    let meridiem_at = compact.len().checked_sub(2)?;
    if !compact.is_char_boundary(meridiem_at) {
        return None;
    }
    let (clock, meridiem) = compact.split_at(meridiem_at);

    NaiveTime::parse_from_str(&format!("{} {}", clock, meridiem), "%I:%M %p").ok()
}

/// First day of the month containing `date`
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Move a date by whole months, keeping it on the first of the month
pub fn shift_month(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let first = first_of_month(date);
    let delta = Months::new(months.unsigned_abs());

    if months >= 0 {
        first.checked_add_months(delta)
    } else {
        first.checked_sub_months(delta)
    }
}

/// Convert a local wall-clock time to an instant.
///
/// Ambiguous times (clocks turned back) resolve to the earlier instant; times
/// inside a gap (clocks turned forward) resolve to the instant one hour later.
pub fn local_to_utc<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local))
}

/// Convert an instant to local wall-clock time
pub fn utc_to_local<Tz: TimeZone>(tz: &Tz, instant: DateTime<Utc>) -> NaiveDateTime {
    instant.with_timezone(tz).naive_local()
}

/// Local midnight of `date` and of the following day
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::MIN);
    (start, start + Duration::days(1))
}

/// Calculate the wait in seconds until `next_time`, never less than a minute
pub fn calculate_wait_duration(now: NaiveDateTime, next_time: NaiveDateTime) -> u64 {
    let seconds = next_time.signed_duration_since(now).num_seconds();

    if seconds <= 0 {
        return 60;
    }

    seconds as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Helsinki;

    #[test]
    fn test_parse_time() {
        assert_eq!(parse_time("06:30"), Some((6, 30)));
        assert_eq!(parse_time("6:05"), Some((6, 5)));
        assert_eq!(parse_time("24:00"), None);
        assert_eq!(parse_time("0630"), None);
    }

    #[test]
    fn test_parse_clock_time_variants() {
        let nine = NaiveTime::from_hms_opt(9, 0, 0);
        assert_eq!(parse_clock_time("9:00 AM"), nine);
        assert_eq!(parse_clock_time("09:00am"), nine);
        assert_eq!(parse_clock_time("9:00  a m"), nine);
        assert_eq!(parse_clock_time("12:00 AM"), NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(parse_clock_time("12:15 PM"), NaiveTime::from_hms_opt(12, 15, 0));
        assert_eq!(parse_clock_time("11:45 pm"), NaiveTime::from_hms_opt(23, 45, 0));
    }

    #[test]
    fn test_parse_clock_time_rejects_garbage() {
        assert_eq!(parse_clock_time("13:00 PM"), None);
        assert_eq!(parse_clock_time("9:60 AM"), None);
        assert_eq!(parse_clock_time("AM"), None);
        assert_eq!(parse_clock_time(""), None);
        assert_eq!(parse_clock_time("9:00 ÄM"), None);
    }

    #[test]
    fn test_shift_month_crosses_years() {
        let january = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        assert_eq!(shift_month(january, -1), NaiveDate::from_ymd_opt(2024, 12, 1));
        assert_eq!(shift_month(january, 0), NaiveDate::from_ymd_opt(2025, 1, 1));
        assert_eq!(shift_month(january, 12), NaiveDate::from_ymd_opt(2026, 1, 1));
    }

    #[test]
    fn test_local_to_utc_handles_dst_gap() {
        // Clocks jump from 03:00 to 04:00 in Helsinki on 2025-03-30
        let in_gap = NaiveDate::from_ymd_opt(2025, 3, 30)
            .unwrap()
            .and_hms_opt(3, 30, 0)
            .unwrap();
        let instant = local_to_utc(&Helsinki, in_gap);
        assert_eq!(utc_to_local(&Helsinki, instant).format("%H:%M").to_string(), "04:30");
    }

    #[test]
    fn test_wait_duration_has_floor() {
        let now = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(calculate_wait_duration(now, now), 60);
        assert_eq!(calculate_wait_duration(now, now + Duration::hours(12)), 43_200);
    }
}
