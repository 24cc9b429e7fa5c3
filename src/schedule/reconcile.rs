use super::models::{CalendarMutation, ExistingEvent, ReconciliationOutcome, ShiftRecord};
use crate::utils::time::local_to_utc;
use chrono_tz::Tz;

/// Decide how a proposed shift lands in the calendar.
///
/// `existing` is the first event starting on the shift's day, if any. At most
/// one work event per day is assumed.
pub fn reconcile(
    proposed: &ShiftRecord,
    existing: Option<&ExistingEvent>,
    tz: &Tz,
) -> (ReconciliationOutcome, Option<CalendarMutation>) {
    let start = local_to_utc(tz, proposed.start());
    let end = local_to_utc(tz, proposed.end());
    let title = proposed.location().to_string();

    let Some(event) = existing else {
        return (
            ReconciliationOutcome::Added,
            Some(CalendarMutation::Insert {
                start,
                end,
                title,
                timezone: tz.name().to_string(),
            }),
        );
    };

    let same_times = event.start.timestamp_millis() == start.timestamp_millis()
        && event.end.timestamp_millis() == end.timestamp_millis();
    let same_title = event.title.to_lowercase() == title.to_lowercase();

    if same_times && same_title {
        return (ReconciliationOutcome::Unchanged, None);
    }

    (
        ReconciliationOutcome::Updated,
        Some(CalendarMutation::Update {
            id: event.id.clone(),
            start,
            end,
            title,
        }),
    )
}
