use crate::error::AppResult;
use crate::ports::{EventStore, TextExtractor};
use crate::schedule::{self, CalendarMutation, ReconciliationOutcome, ShiftRecord};
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::fmt;
use tracing::{info, warn};

/// What an import produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportReport {
    /// Draft shifts are ready for review
    Drafted(usize),
    /// The text had no day/time lines
    NothingRecognized,
}

/// Counts of one commit, shown to the user afterwards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl SyncSummary {
    fn record(&mut self, outcome: ReconciliationOutcome) {
        match outcome {
            ReconciliationOutcome::Added => self.added += 1,
            ReconciliationOutcome::Updated => self.updated += 1,
            ReconciliationOutcome::Unchanged => self.unchanged += 1,
        }
    }
}

impl fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added\n{} updated\n{} unchanged",
            self.added, self.updated, self.unchanged
        )
    }
}

/// Draft shifts waiting for the user to confirm them
#[derive(Debug, Default)]
pub struct ImportSession {
    drafts: Vec<ShiftRecord>,
}

impl ImportSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a screenshot through text recognition and the parser.
    ///
    /// Previous drafts are discarded first. Decode failures abort the import.
    pub async fn import_image(
        &mut self,
        extractor: &dyn TextExtractor,
        image_data: &[u8],
    ) -> AppResult<ImportReport> {
        self.drafts.clear();

        info!("Importing schedule image, size: {} bytes", image_data.len());
        let raw = extractor.extract(image_data).await?;

        Ok(self.import_text(&raw))
    }

    /// Parse already recognized text relative to today's date
    pub fn import_text(&mut self, raw: &str) -> ImportReport {
        self.fill(schedule::parse(raw))
    }

    /// Parse already recognized text relative to `today`
    pub fn import_text_on(&mut self, raw: &str, today: NaiveDate) -> ImportReport {
        self.fill(schedule::parse_with_today(raw, today))
    }

    fn fill(&mut self, shifts: Vec<ShiftRecord>) -> ImportReport {
        self.drafts = shifts;

        if self.drafts.is_empty() {
            warn!("Couldn't detect any day/time lines in the schedule");
            return ImportReport::NothingRecognized;
        }

        info!("Drafted {} shifts", self.drafts.len());
        ImportReport::Drafted(self.drafts.len())
    }

    pub fn drafts(&self) -> &[ShiftRecord] {
        &self.drafts
    }

    pub fn shift_count(&self) -> usize {
        self.drafts.len()
    }

    pub fn clear(&mut self) {
        self.drafts.clear();
    }

    /// Write the drafts to the account's calendar.
    ///
    /// Nothing is written when calendar access is missing or the account has
    /// no writable calendar.
    pub async fn commit(
        &self,
        store: &dyn EventStore,
        account: &str,
        tz: &Tz,
    ) -> AppResult<SyncSummary> {
        let mut summary = SyncSummary::default();
        if self.drafts.is_empty() {
            return Ok(summary);
        }

        store.ensure_access().await?;
        let calendar_id = store.find_writable_calendar(account).await?;
        info!(
            "Syncing {} shifts to calendar {}",
            self.drafts.len(),
            calendar_id
        );

        for shift in &self.drafts {
            let existing = store
                .find_event_for_day(&calendar_id, shift.start().date())
                .await?;
            let (outcome, mutation) = schedule::reconcile(shift, existing.as_ref(), tz);

            match mutation {
                Some(CalendarMutation::Insert {
                    start,
                    end,
                    title,
                    timezone,
                }) => {
                    store
                        .insert_event(&calendar_id, start, end, &title, &timezone)
                        .await?;
                }
                Some(CalendarMutation::Update {
                    id,
                    start,
                    end,
                    title,
                }) => {
                    store
                        .update_event(&calendar_id, &id, start, end, &title)
                        .await?;
                }
                None => {}
            }

            summary.record(outcome);
        }

        info!("Shift sync finished: {:?}", summary);
        Ok(summary)
    }
}
