use crate::error::AppResult;
use crate::ports::{AlarmScheduler, AlarmStateStore, EventStore};
use crate::schedule::{compute_alarm, AlarmTime};
use crate::utils::time::day_bounds;
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::{debug, info};

/// Keeps the platform's work alarm in line with today's shifts
#[derive(Clone)]
pub struct AlarmService {
    store: Arc<dyn EventStore>,
    scheduler: Arc<dyn AlarmScheduler>,
    state: Arc<dyn AlarmStateStore>,
}

impl AlarmService {
    pub fn new(
        store: Arc<dyn EventStore>,
        scheduler: Arc<dyn AlarmScheduler>,
        state: Arc<dyn AlarmStateStore>,
    ) -> Self {
        Self {
            store,
            scheduler,
            state,
        }
    }

    /// Resolve the account's calendar, then refresh the alarm from it
    pub async fn refresh_for_account(
        &self,
        account: &str,
        now: NaiveDateTime,
    ) -> AppResult<Option<AlarmTime>> {
        self.store.ensure_access().await?;
        let calendar_id = self.store.find_writable_calendar(account).await?;

        self.refresh_for_today(&calendar_id, now).await
    }

    /// Set the alarm for the first shift starting today, or drop it when
    /// there is nothing left to wake up for.
    pub async fn refresh_for_today(
        &self,
        calendar_id: &str,
        now: NaiveDateTime,
    ) -> AppResult<Option<AlarmTime>> {
        let (from, to) = day_bounds(now.date());
        let shifts = self.store.find_events_in_range(calendar_id, from, to).await?;
        debug!("Found {} shifts for {}", shifts.len(), now.date());

        match compute_alarm(&shifts, now) {
            Some(trigger) => {
                let time = AlarmTime::from_trigger(trigger);
                self.set_or_replace(time).await?;
                Ok(Some(time))
            }
            None => {
                self.disable().await?;
                Ok(None)
            }
        }
    }

    /// Dismiss the stored alarm if any, then set and remember `time`
    pub async fn set_or_replace(&self, time: AlarmTime) -> AppResult<()> {
        if let Some(previous) = self.state.load_last_alarm().await? {
            self.scheduler.cancel_alarm(previous).await?;
        }

        self.scheduler.set_alarm(time).await?;
        self.state.save_last_alarm(time).await?;

        info!("Work alarm set for {}", time);
        Ok(())
    }

    /// Dismiss the stored alarm if any and forget it
    pub async fn disable(&self) -> AppResult<()> {
        let Some(previous) = self.state.load_last_alarm().await? else {
            debug!("No work alarm to disable");
            return Ok(());
        };

        self.scheduler.cancel_alarm(previous).await?;
        self.state.clear_last_alarm().await?;

        info!("Work alarm {} disabled", previous);
        Ok(())
    }
}
