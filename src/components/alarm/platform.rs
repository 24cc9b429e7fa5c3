use crate::error::{alarm_error, AppResult};
use crate::ports::AlarmScheduler;
use crate::schedule::AlarmTime;
use async_trait::async_trait;
use tracing::info;

/// Alarm clock that only reports what it was asked to do.
///
/// Ringing the alarm is left to whatever device follows the service log.
#[derive(Debug, Clone)]
pub struct LoggingAlarmScheduler {
    label: String,
}

impl LoggingAlarmScheduler {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

#[async_trait]
impl AlarmScheduler for LoggingAlarmScheduler {
    async fn set_alarm(&self, time: AlarmTime) -> AppResult<()> {
        if time.hour > 23 || time.minute > 59 {
            return Err(alarm_error(&format!("Cannot set alarm at {}", time)));
        }

        info!(label = %self.label, "Set daily alarm at {}", time);
        Ok(())
    }

    async fn cancel_alarm(&self, time: AlarmTime) -> AppResult<()> {
        info!(label = %self.label, "Dismissed daily alarm at {}", time);
        Ok(())
    }
}
