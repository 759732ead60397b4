//! Calendar walk for [`RecurrenceSet`] triggers.

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;

use super::resolve_local;
use crate::recurrence::RecurrenceSet;

/// First instant strictly after `from` at which `set` fires in `tz`.
///
/// Walks local calendar days starting at the day containing `from`, stopping
/// after `search_days`, past the year axis, or past `end`.
pub(super) fn next_match(
    set: &RecurrenceSet,
    tz: &Tz,
    from: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    search_days: u32,
) -> Option<DateTime<Utc>> {
    let times = set.times_of_day();
    if times.is_empty() {
        return None;
    }
    let last_date = end.map(|e| e.with_timezone(tz).date_naive());
    let last_year = set.last_year();

    let mut date = from.with_timezone(tz).date_naive();
    for _ in 0..search_days {
        if last_date.is_some_and(|last| date > last) {
            return None;
        }
        if last_year.is_some_and(|year| date.year() > year) {
            return None;
        }
        if set.matches_date(date) {
            for time in &times {
                let Some(instant) = resolve_local(tz, date.and_time(*time)) else {
                    continue;
                };
                if instant <= from {
                    continue;
                }
                if end.is_some_and(|e| instant > e) {
                    return None;
                }
                return Some(instant);
            }
        }
        date = date.succ_opt()?;
    }
    None
}
