use super::service::AlarmService;
use crate::config::Config;
use crate::utils::time::{calculate_wait_duration, day_bounds};
use chrono::{Duration, NaiveDateTime, Utc};
use lazy_static::lazy_static;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration as TokioDuration};
use tracing::{error, info, warn};

lazy_static! {
    static ref REFRESH_TASK_RUNNING: AtomicBool = AtomicBool::new(false);
}

/// Start the alarm refresh loop unless one is already running
pub fn start_scheduler(
    config: Arc<RwLock<Config>>,
    service: AlarmService,
) -> Option<JoinHandle<()>> {
    if REFRESH_TASK_RUNNING.swap(true, Ordering::SeqCst) {
        warn!("Alarm refresh task is already running, skipping initialization");
        return None;
    }

    info!("Starting alarm refresh task");
    Some(tokio::spawn(async move {
        run_scheduler_loop(config, service).await;
    }))
}

/// Let a later `start_scheduler` spawn a new loop
pub fn mark_stopped() {
    REFRESH_TASK_RUNNING.store(false, Ordering::SeqCst);
}

async fn run_scheduler_loop(config: Arc<RwLock<Config>>, service: AlarmService) {
    loop {
        let (account, interval_hours, tz) = {
            let config_read = config.read().await;
            (
                config_read.calendar_account.clone(),
                config_read.alarm_refresh_interval_hours,
                config_read.tz(),
            )
        };

        let tz = match tz {
            Ok(tz) => tz,
            Err(e) => {
                error!("Cannot refresh the work alarm: {}", e);
                sleep(TokioDuration::from_secs(interval_hours.max(1) * 3600)).await;
                continue;
            }
        };

        let now = Utc::now().with_timezone(&tz).naive_local();
        match service.refresh_for_account(&account, now).await {
            Ok(Some(time)) => info!("Work alarm refreshed for {}", time),
            Ok(None) => info!("No work alarm needed for {}", now.date()),
            // Retried on the next tick
            Err(e) => error!("Failed to refresh work alarm: {}", e),
        }

        let next = next_refresh_time(now, interval_hours);
        info!("Next alarm refresh scheduled for {}", next);
        sleep(TokioDuration::from_secs(calculate_wait_duration(now, next))).await;
    }
}

/// The earlier of one interval from `now` and the start of tomorrow.
///
/// Refreshing right after midnight picks up the new day's first shift.
pub fn next_refresh_time(now: NaiveDateTime, interval_hours: u64) -> NaiveDateTime {
    let interval = Duration::hours(interval_hours.max(1) as i64);
    let (_, midnight) = day_bounds(now.date());

    (now + interval).min(midnight)
}
