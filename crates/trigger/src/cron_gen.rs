//! Cron generation for "every N days, ignore DST" schedules.
//!
//! A simple trigger repeating every `N * 86400` seconds drifts by an hour
//! across a daylight-saving change. The cron form generated here is pinned
//! to the local wall-clock hour and minute instead, so it keeps firing at
//! 14:30 on both sides of the transition.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Rejected generator inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CronGenError {
    #[error("day interval must be 1..=31, got {0}")]
    Interval(u32),

    #[error("invalid time of day {hour:02}:{minute:02}")]
    TimeOfDay { hour: u32, minute: u32 },
}

/// A single field of a generated cron expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CronField {
    /// `*`
    Always,
    /// `?`: no specific value.
    Unspecified,
    /// A single value.
    On(u32),
    /// `*/n`
    Every(u32),
}

impl fmt::Display for CronField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("*"),
            Self::Unspecified => f.write_str("?"),
            Self::On(v) => write!(f, "{v}"),
            Self::Every(n) => write!(f, "*/{n}"),
        }
    }
}

/// Output of [`generate_daily_ignore_dst_cron`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCron {
    /// `second minute hour day-of-month month day-of-week`.
    pub expression: String,
    /// Local start of the schedule: the anchor date at the fire time.
    pub anchor: NaiveDateTime,
}

/// Build the 6-field cron for "every `interval_days` days at `hour:minute`".
///
/// Day-of-week is always `?` because day-of-month carries the rule.
pub fn generate_daily_ignore_dst_cron(
    interval_days: u32,
    hour: u32,
    minute: u32,
    anchor: NaiveDate,
) -> Result<DailyCron, CronGenError> {
    if !(1..=31).contains(&interval_days) {
        return Err(CronGenError::Interval(interval_days));
    }
    let time = NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or(CronGenError::TimeOfDay { hour, minute })?;

    let fields = [
        CronField::On(0),
        CronField::On(minute),
        CronField::On(hour),
        CronField::Every(interval_days),
        CronField::Always,
        CronField::Unspecified,
    ];
    let expression = fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");

    Ok(DailyCron {
        expression,
        anchor: anchor.and_time(time),
    })
}
