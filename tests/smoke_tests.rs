use autoschedule::components::alarm::{next_refresh_time, LoggingAlarmScheduler};
use autoschedule::components::redis_service::RedisActorHandle;
use autoschedule::config::{Config, DEFAULT_ALARM_LABEL, DEFAULT_REFRESH_INTERVAL_HOURS};
use autoschedule::ports::{AlarmScheduler, AlarmStateStore};
use autoschedule::schedule::{parse_with_today, AlarmTime};
use chrono::{NaiveDate, Weekday};

fn test_config() -> Config {
    Config {
        google_client_id: String::new(),
        google_client_secret: String::new(),
        calendar_account: "shifts@example.com".to_string(),
        timezone: "Europe/Helsinki".to_string(),
        redis_url: "redis://127.0.0.1:6379".to_string(),
        alarm_refresh_interval_hours: DEFAULT_REFRESH_INTERVAL_HOURS,
        alarm_label: DEFAULT_ALARM_LABEL.to_string(),
    }
}

/// Smoke test to verify that the config can be built and read
#[tokio::test]
async fn test_config_loads() {
    let config = test_config();

    assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
    assert_eq!(config.tz().unwrap(), chrono_tz::Europe::Helsinki);
}

/// Smoke test for the Redis actor handle
#[tokio::test]
async fn test_redis_handle_creation() {
    let redis_handle = RedisActorHandle::empty();

    // No actor behind it, so state calls fail instead of hanging
    assert!(redis_handle.shutdown().await.is_ok());
    assert!(redis_handle.load_last_alarm().await.is_err());
}

#[tokio::test]
async fn test_logging_scheduler() {
    let scheduler = LoggingAlarmScheduler::new(test_config().alarm_label);

    assert!(scheduler.set_alarm(AlarmTime { hour: 6, minute: 45 }).await.is_ok());
}

#[test]
fn test_parse_example_schedule() {
    let today = NaiveDate::from_ymd_opt(2025, 9, 10).unwrap();
    let shifts = parse_with_today("15\nMon\n9:00 AM - 5:00 PM\nLocation: Store A", today);

    assert_eq!(shifts.len(), 1);
    assert_eq!(shifts[0].day_of_week(), Weekday::Mon);
    assert_eq!(shifts[0].to_string(), "Mon 2025-09-15 09:00 - 17:00 @ Store A");
}

#[test]
fn test_refresh_interval_is_capped_by_midnight() {
    let now = NaiveDate::from_ymd_opt(2025, 9, 15)
        .unwrap()
        .and_hms_opt(20, 0, 0)
        .unwrap();

    assert_eq!(
        next_refresh_time(now, DEFAULT_REFRESH_INTERVAL_HOURS),
        NaiveDate::from_ymd_opt(2025, 9, 16)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    );
}
