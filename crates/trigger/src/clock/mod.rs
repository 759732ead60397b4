//! Next-fire-time oracle.
//!
//! The scheduler engine owns the authoritative answer to "when does this
//! trigger fire next". [`FireTimeOracle`] is that capability as a seam, and
//! [`CalendarClock`] is the built-in implementation used when no engine is
//! wired in (tests, the CLI).

mod calendar;


use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use cron::Schedule;

use crate::trigger::{CalendarTrigger, CronTrigger, SimpleTrigger, Trigger};

/// Failures computing a fire time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("invalid cron expression '{expression}': {reason}")]
    InvalidCron { expression: String, reason: String },

    #[error("scheduler engine error: {0}")]
    Engine(String),
}

/// Capability to compute a trigger's next fire instant, ignoring blockouts.
pub trait FireTimeOracle: Send + Sync {
    /// First fire instant strictly after `after`, or `None` when the trigger
    /// has no further fires.
    fn next_fire_time(
        &self,
        trigger: &Trigger,
        after: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, OracleError>;
}

/// Resolve a local wall-clock time in `tz`.
///
/// Ambiguous times (clocks falling back) take the earlier instant; times in a
/// spring-forward gap move forward by an hour.
pub(crate) fn resolve_local(tz: &Tz, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
        .map(|t| t.with_timezone(&Utc))
}

/// In-process fire-time oracle evaluating each trigger in its own time zone.
#[derive(Debug, Clone)]
pub struct CalendarClock {
    /// Days a calendar search walks before giving up.
    search_days: u32,
}

impl CalendarClock {
    pub fn new() -> Self {
        Self {
            search_days: 366 * 10,
        }
    }

    pub fn with_search_days(mut self, days: u32) -> Self {
        self.search_days = days;
        self
    }

    fn next_simple(
        &self,
        t: &SimpleTrigger,
        start: DateTime<Utc>,
        after: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        if after < start {
            return Some(start);
        }
        let interval = t.repeat_interval_secs();
        if interval == 0 {
            return None;
        }
        let k = (after - start).num_seconds() / interval + 1;
        if t.repeat_count() >= 0 && k > i64::from(t.repeat_count()) {
            return None;
        }
        Duration::try_seconds(k.saturating_mul(interval)).and_then(|d| start.checked_add_signed(d))
    }

    fn next_cron(
        &self,
        t: &CronTrigger,
        start: DateTime<Utc>,
        after: DateTime<Utc>,
        tz: Tz,
    ) -> Result<Option<DateTime<Utc>>, OracleError> {
        let schedule = parse_cron(t.cron_expression())?;
        let from = after.max(just_before(start));
        Ok(schedule
            .after(&from.with_timezone(&tz))
            .next()
            .map(|next| next.with_timezone(&Utc)))
    }

    fn next_calendar(
        &self,
        t: &CalendarTrigger,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
        after: DateTime<Utc>,
        tz: Tz,
    ) -> Option<DateTime<Utc>> {
        let from = after.max(just_before(start));
        calendar::next_match(t.recurrence(), &tz, from, end, self.search_days)
    }
}

impl Default for CalendarClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FireTimeOracle for CalendarClock {
    fn next_fire_time(
        &self,
        trigger: &Trigger,
        after: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, OracleError> {
        let start = trigger.start_time();
        let end = trigger.end_time();
        let tz = trigger.time_zone();

        let next = match trigger {
            Trigger::Simple(t) => self.next_simple(t, start, after),
            Trigger::Cron(t) => self.next_cron(t, start, after, tz)?,
            Trigger::Calendar(t) => self.next_calendar(t, start, end, after, tz),
        };
        Ok(next.filter(|at| end.map_or(true, |end| *at <= end)))
    }
}

fn just_before(start: DateTime<Utc>) -> DateTime<Utc> {
    start
        .checked_sub_signed(Duration::nanoseconds(1))
        .unwrap_or(start)
}

/// Parse a 6- or 7-field cron expression; `?` is read as `*`.
fn parse_cron(expression: &str) -> Result<Schedule, OracleError> {
    let normalized = expression.trim().replace('?', "*");
    Schedule::from_str(&normalized).map_err(|e| OracleError::InvalidCron {
        expression: expression.to_string(),
        reason: e.to_string(),
    })
}
