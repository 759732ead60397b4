//! Lenient calendar construction for request start fields.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::NormalizeError;

/// Build a local date-time from possibly overflowing fields.
///
/// `month0` is 0-based. Out-of-range months, days, hours and minutes carry
/// into the next larger unit (month 13 is February of the following year,
/// day 0 is the last day of the previous month).
pub(super) fn lenient_local(
    year: i32,
    month0: i32,
    day: i32,
    hour: i32,
    minute: i32,
) -> Result<NaiveDateTime, NormalizeError> {
    let invalid = || NormalizeError::InvalidStartDate {
        year,
        month: month0,
        day,
        hour,
        minute,
    };

    let total_months = i64::from(year) * 12 + i64::from(month0);
    let y = i32::try_from(total_months.div_euclid(12)).map_err(|_| invalid())?;
    let m = total_months.rem_euclid(12) as u32 + 1;

    NaiveDate::from_ymd_opt(y, m, 1)
        .and_then(|first| first.and_hms_opt(0, 0, 0))
        .and_then(|t| t.checked_add_signed(Duration::days(i64::from(day) - 1)))
        .and_then(|t| t.checked_add_signed(Duration::hours(i64::from(hour))))
        .and_then(|t| t.checked_add_signed(Duration::minutes(i64::from(minute))))
        .ok_or_else(invalid)
}
