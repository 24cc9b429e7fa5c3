//! Wake-up alarm for the first shift of the day.

mod platform;
mod scheduler;
mod service;

pub use platform::LoggingAlarmScheduler;
pub use scheduler::next_refresh_time;
pub use service::AlarmService;

use super::google_calendar::GoogleCalendarHandle;
use super::redis_service::RedisActorHandle;
use crate::config::Config;
use crate::error::AppResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Periodically re-derives the work alarm from the calendar
pub struct AlarmRefresh {
    calendar: GoogleCalendarHandle,
    task: RwLock<Option<JoinHandle<()>>>,
}

impl AlarmRefresh {
    pub fn new(calendar: GoogleCalendarHandle) -> Self {
        Self {
            calendar,
            task: RwLock::new(None),
        }
    }
}

#[async_trait]
impl super::Component for AlarmRefresh {
    fn name(&self) -> &'static str {
        "alarm_refresh"
    }

    async fn init(
        &self,
        config: Arc<RwLock<Config>>,
        redis_handle: RedisActorHandle,
    ) -> AppResult<()> {
        let label = config.read().await.alarm_label.clone();

        let service = AlarmService::new(
            Arc::new(self.calendar.clone()),
            Arc::new(LoggingAlarmScheduler::new(label)),
            Arc::new(redis_handle),
        );

        let mut task_lock = self.task.write().await;
        if task_lock.is_none() {
            *task_lock = scheduler::start_scheduler(config, service);
        }

        Ok(())
    }

    async fn shutdown(&self) -> AppResult<()> {
        if let Some(task) = self.task.write().await.take() {
            task.abort();
            scheduler::mark_stopped();
        }

        Ok(())
    }
}
