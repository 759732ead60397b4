//! Malformed-request errors raised during normalization.

use crate::cron_gen::CronGenError;
use crate::recurrence::RecurrenceError;
use crate::trigger::TriggerError;

/// Reasons a schedule request cannot become a [`Trigger`](crate::Trigger).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("unknown time zone '{0}'")]
    UnknownTimeZone(String),

    #[error("calendar trigger sets no day, month or year recurrence")]
    NoRecurrenceAxis,

    #[error("{axis} value {value} is out of range")]
    OutOfRange { axis: &'static str, value: i32 },

    #[error("start date {year}-{month}-{day} {hour}:{minute} cannot be represented")]
    InvalidStartDate {
        year: i32,
        month: i32,
        day: i32,
        hour: i32,
        minute: i32,
    },

    #[error("generated cron needs a positive whole number of days, got {0}s")]
    GeneratedInterval(i64),

    #[error("run-now delay of {0}s cannot be applied")]
    RunNowDelay(i64),

    #[error("cron expression '{expression}' has {count} fields, expected 6 or 7")]
    CronFieldCount { expression: String, count: usize },

    #[error(transparent)]
    Recurrence(#[from] RecurrenceError),

    #[error(transparent)]
    CronGen(#[from] CronGenError),

    #[error(transparent)]
    Trigger(#[from] TriggerError),
}
