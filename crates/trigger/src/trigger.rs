//! Canonical trigger representation.
//!
//! Every schedule request normalizes to exactly one [`Trigger`] variant.
//! Constructors enforce the shared invariants: a start time is always
//! present and an end time, when set, is not before it.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::recurrence::RecurrenceSet;

/// Trigger invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TriggerError {
    #[error("end time {end} is before start time {start}")]
    EndBeforeStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("repeat interval must not be negative, got {0}s")]
    NegativeInterval(i64),

    #[error("repeat count must be -1 (forever) or >= 0, got {0}")]
    RepeatCount(i32),

    #[error("cron expression is empty")]
    EmptyCron,
}

/// Human-facing recurrence label carried through to the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerTag {
    RunOnce,
    Seconds,
    Minutes,
    Hours,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Cron,
    Blockout,
}

impl TriggerTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RunOnce => "RUN_ONCE",
            Self::Seconds => "SECONDS",
            Self::Minutes => "MINUTES",
            Self::Hours => "HOURS",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
            Self::Cron => "CRON",
            Self::Blockout => "BLOCKOUT",
        }
    }

    /// Label implied by a simple repeat interval.
    pub fn for_interval(repeat_interval_secs: i64) -> Self {
        match repeat_interval_secs {
            0 => Self::RunOnce,
            s if s % 604_800 == 0 => Self::Weekly,
            s if s % 86_400 == 0 => Self::Daily,
            s if s % 3_600 == 0 => Self::Hours,
            s if s % 60 == 0 => Self::Minutes,
            _ => Self::Seconds,
        }
    }
}

impl fmt::Display for TriggerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = match s.trim().to_ascii_uppercase().as_str() {
            "RUN_ONCE" => Self::RunOnce,
            "SECONDS" => Self::Seconds,
            "MINUTES" => Self::Minutes,
            "HOURS" => Self::Hours,
            "DAILY" => Self::Daily,
            "WEEKLY" => Self::Weekly,
            "MONTHLY" => Self::Monthly,
            "YEARLY" => Self::Yearly,
            "CRON" => Self::Cron,
            "BLOCKOUT" => Self::Blockout,
            other => return Err(format!("unknown trigger tag '{other}'")),
        };
        Ok(tag)
    }
}

fn check_bounds(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<(), TriggerError> {
    match end {
        Some(end) if end < start => Err(TriggerError::EndBeforeStart { start, end }),
        _ => Ok(()),
    }
}

// ── Simple ──────────────────────────────────────────────────────────

/// Fixed-interval trigger. Not DST-aware: the interval is elapsed seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleTrigger {
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    repeat_interval_secs: i64,
    repeat_count: i32,
    time_zone: Tz,
    tag: TriggerTag,
}

impl SimpleTrigger {
    pub fn new(
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
        repeat_interval_secs: i64,
        repeat_count: i32,
        time_zone: Tz,
        tag: TriggerTag,
    ) -> Result<Self, TriggerError> {
        check_bounds(start_time, end_time)?;
        if repeat_interval_secs < 0 {
            return Err(TriggerError::NegativeInterval(repeat_interval_secs));
        }
        if repeat_count < -1 {
            return Err(TriggerError::RepeatCount(repeat_count));
        }
        Ok(Self {
            start_time,
            end_time,
            repeat_interval_secs,
            repeat_count,
            time_zone,
            tag,
        })
    }

    /// One-shot trigger at `at`.
    pub fn once(at: DateTime<Utc>, time_zone: Tz) -> Self {
        Self {
            start_time: at,
            end_time: None,
            repeat_interval_secs: 0,
            repeat_count: 0,
            time_zone,
            tag: TriggerTag::RunOnce,
        }
    }

    /// Seconds between fires; 0 fires once.
    pub fn repeat_interval_secs(&self) -> i64 {
        self.repeat_interval_secs
    }

    /// Fires after the first; -1 repeats forever.
    pub fn repeat_count(&self) -> i32 {
        self.repeat_count
    }
}

// ── Calendar ────────────────────────────────────────────────────────

/// Wall-clock recurrence driven by a [`RecurrenceSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarTrigger {
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    time_zone: Tz,
    duration_ms: Option<i64>,
    recurrence: RecurrenceSet,
    tag: TriggerTag,
}

impl CalendarTrigger {
    pub fn new(
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
        time_zone: Tz,
        duration_ms: Option<i64>,
        recurrence: RecurrenceSet,
        tag: TriggerTag,
    ) -> Result<Self, TriggerError> {
        check_bounds(start_time, end_time)?;
        Ok(Self {
            start_time,
            end_time,
            time_zone,
            duration_ms,
            recurrence,
            tag,
        })
    }

    pub fn recurrence(&self) -> &RecurrenceSet {
        &self.recurrence
    }
}

// ── Cron ────────────────────────────────────────────────────────────

/// Cron-expression trigger. The expression is opaque here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CronTrigger {
    cron_expression: String,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    time_zone: Tz,
    duration_ms: Option<i64>,
    tag: TriggerTag,
}

impl CronTrigger {
    pub fn new(
        cron_expression: impl Into<String>,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
        time_zone: Tz,
        duration_ms: Option<i64>,
        tag: TriggerTag,
    ) -> Result<Self, TriggerError> {
        let cron_expression = cron_expression.into();
        if cron_expression.trim().is_empty() {
            return Err(TriggerError::EmptyCron);
        }
        check_bounds(start_time, end_time)?;
        Ok(Self {
            cron_expression,
            start_time,
            end_time,
            time_zone,
            duration_ms,
            tag,
        })
    }

    pub fn cron_expression(&self) -> &str {
        &self.cron_expression
    }
}

// ── Trigger ─────────────────────────────────────────────────────────

/// Canonical, fireable trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Trigger {
    Simple(SimpleTrigger),
    Calendar(CalendarTrigger),
    Cron(CronTrigger),
}

impl Trigger {
    pub fn start_time(&self) -> DateTime<Utc> {
        match self {
            Self::Simple(t) => t.start_time,
            Self::Calendar(t) => t.start_time,
            Self::Cron(t) => t.start_time,
        }
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Simple(t) => t.end_time,
            Self::Calendar(t) => t.end_time,
            Self::Cron(t) => t.end_time,
        }
    }

    pub fn time_zone(&self) -> Tz {
        match self {
            Self::Simple(t) => t.time_zone,
            Self::Calendar(t) => t.time_zone,
            Self::Cron(t) => t.time_zone,
        }
    }

    pub fn tag(&self) -> TriggerTag {
        match self {
            Self::Simple(t) => t.tag,
            Self::Calendar(t) => t.tag,
            Self::Cron(t) => t.tag,
        }
    }

    /// Blockout length carried by calendar and cron triggers.
    pub fn duration_ms(&self) -> Option<i64> {
        match self {
            Self::Simple(_) => None,
            Self::Calendar(t) => t.duration_ms,
            Self::Cron(t) => t.duration_ms,
        }
    }

    /// Variant name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Simple(_) => "simple",
            Self::Calendar(_) => "calendar",
            Self::Cron(_) => "cron",
        }
    }

    /// Same trigger with a different label.
    pub fn with_tag(mut self, tag: TriggerTag) -> Self {
        match &mut self {
            Self::Simple(t) => t.tag = tag,
            Self::Calendar(t) => t.tag = tag,
            Self::Cron(t) => t.tag = tag,
        }
        self
    }

    /// Cron rendering of the schedule, when it has one.
    pub fn cron_expression(&self) -> Option<String> {
        match self {
            Self::Simple(_) => None,
            Self::Calendar(t) => Some(t.recurrence.to_cron_expression()),
            Self::Cron(t) => Some(t.cron_expression.clone()),
        }
    }
}

impl From<SimpleTrigger> for Trigger {
    fn from(t: SimpleTrigger) -> Self {
        Self::Simple(t)
    }
}

impl From<CalendarTrigger> for Trigger {
    fn from(t: CalendarTrigger) -> Self {
        Self::Calendar(t)
    }
}

impl From<CronTrigger> for Trigger {
    fn from(t: CronTrigger) -> Self {
        Self::Cron(t)
    }
}
