//! Schedule request → canonical [`Trigger`].
//!
//! Normalization is a pure function of the request, the configured default
//! time zone and the reference instant `now`. Exactly one branch runs per
//! request because [`ScheduleRequest`] holds a single trigger slot:
//!
//! | Request trigger                    | Canonical variant |
//! |------------------------------------|-------------------|
//! | none                               | Simple, run once `run_now_delay` from now |
//! | simple                             | Simple |
//! | complex, cron = `TO_BE_GENERATED`  | Cron (`*/N` days, wall-clock time) |
//! | complex                            | Calendar |
//! | cron                               | Cron (7 fields) |

mod calendar;
mod error;

#[cfg(test)]
mod tests;

use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use schedkit_core::config::SchedulerConfig;
use schedkit_core::{ComplexJobTrigger, CronJobTrigger, ScheduleRequest, SimpleJobTrigger, TriggerSpec};
use tracing::debug;

pub use self::error::NormalizeError;

use crate::clock::resolve_local;
use crate::cron_gen::generate_daily_ignore_dst_cron;
use crate::recurrence::{DayOfWeek, DayRule, MonthOfYear, RecurrenceSet, WeekOfMonth};
use crate::trigger::{CalendarTrigger, CronTrigger, SimpleTrigger, Trigger, TriggerTag};

const SECONDS_PER_DAY: i64 = 86_400;

/// Turns schedule requests into canonical triggers.
#[derive(Debug, Clone)]
pub struct TriggerNormalizer {
    default_time_zone: Tz,
    run_now_delay: Duration,
}

impl TriggerNormalizer {
    pub fn new(default_time_zone: Tz) -> Self {
        Self {
            default_time_zone,
            run_now_delay: Duration::seconds(10),
        }
    }

    pub fn from_config(config: &SchedulerConfig) -> Result<Self, NormalizeError> {
        let tz = parse_time_zone(&config.default_time_zone)?;
        let delay = Duration::try_seconds(config.run_now_delay_secs)
            .ok_or(NormalizeError::RunNowDelay(config.run_now_delay_secs))?;
        Ok(Self::new(tz).with_run_now_delay(delay))
    }

    /// Offset applied to triggers synthesized for "run now" requests.
    pub fn with_run_now_delay(mut self, delay: Duration) -> Self {
        self.run_now_delay = delay;
        self
    }

    pub fn normalize(&self, request: &ScheduleRequest) -> Result<Trigger, NormalizeError> {
        self.normalize_at(request, Utc::now())
    }

    /// Normalize with an explicit reference instant for defaulted fields.
    pub fn normalize_at(
        &self,
        request: &ScheduleRequest,
        now: DateTime<Utc>,
    ) -> Result<Trigger, NormalizeError> {
        let tz = match request.time_zone.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => parse_time_zone(name)?,
            _ => self.default_time_zone,
        };

        let trigger = match request.trigger() {
            None => {
                debug!(delay_secs = self.run_now_delay.num_seconds(), "no trigger, running once");
                let at = now
                    .checked_add_signed(self.run_now_delay)
                    .ok_or(NormalizeError::RunNowDelay(self.run_now_delay.num_seconds()))?;
                SimpleTrigger::once(at, tz).into()
            }
            Some(TriggerSpec::Simple(spec)) => simple(spec, tz, now)?,
            Some(TriggerSpec::Complex(spec)) => complex(spec, request.duration, tz, now)?,
            Some(TriggerSpec::Cron(spec)) => cron(spec, request.duration, tz, now)?,
        };

        debug!(
            kind = trigger.kind(),
            tag = %trigger.tag(),
            time_zone = %tz,
            start = %trigger.start_time(),
            "normalized schedule request"
        );
        Ok(trigger)
    }
}

fn parse_time_zone(name: &str) -> Result<Tz, NormalizeError> {
    name.parse::<Tz>()
        .map_err(|_| NormalizeError::UnknownTimeZone(name.to_string()))
}

fn parse_tag(ui_pass_param: Option<&str>) -> Option<TriggerTag> {
    ui_pass_param.and_then(|p| p.parse().ok())
}

fn to_utc(tz: &Tz, local: NaiveDateTime) -> Result<DateTime<Utc>, NormalizeError> {
    resolve_local(tz, local).ok_or(NormalizeError::InvalidStartDate {
        year: local.year(),
        month: local.month0() as i32,
        day: local.day() as i32,
        hour: local.hour() as i32,
        minute: local.minute() as i32,
    })
}

// ── Simple ──────────────────────────────────────────────────────────

fn simple(spec: &SimpleJobTrigger, tz: Tz, now: DateTime<Utc>) -> Result<Trigger, NormalizeError> {
    let tag = parse_tag(spec.ui_pass_param.as_deref())
        .unwrap_or_else(|| TriggerTag::for_interval(spec.repeat_interval));
    let trigger = SimpleTrigger::new(
        spec.start_time.unwrap_or(now),
        spec.end_time,
        spec.repeat_interval,
        spec.repeat_count,
        tz,
        tag,
    )?;
    Ok(trigger.into())
}

// ── Complex ─────────────────────────────────────────────────────────

fn complex(
    spec: &ComplexJobTrigger,
    duration_ms: Option<i64>,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<Trigger, NormalizeError> {
    let today = now.with_timezone(&tz).date_naive();
    let start_local = calendar::lenient_local(
        spec.start_year.unwrap_or(today.year()),
        spec.start_month.unwrap_or(today.month0() as i32),
        spec.start_day.unwrap_or(today.day() as i32),
        spec.start_hour,
        spec.start_min,
    )?;

    if spec.wants_generated_cron() {
        return generated_cron(spec, start_local, duration_ms, tz);
    }

    let recurrence = recurrence_from(spec, start_local)?;
    let tag = parse_tag(spec.ui_pass_param.as_deref())
        .unwrap_or_else(|| calendar_tag(&recurrence));
    let trigger = CalendarTrigger::new(
        to_utc(&tz, start_local)?,
        spec.end_time,
        tz,
        duration_ms,
        recurrence,
        tag,
    )?;
    Ok(trigger.into())
}

/// "Every N days, ignore DST": a calendar-shaped request that becomes a cron trigger.
fn generated_cron(
    spec: &ComplexJobTrigger,
    start_local: NaiveDateTime,
    duration_ms: Option<i64>,
    tz: Tz,
) -> Result<Trigger, NormalizeError> {
    let interval_secs = spec.repeat_interval.unwrap_or(0);
    let interval_days = u32::try_from(interval_secs / SECONDS_PER_DAY)
        .ok()
        .filter(|days| *days > 0)
        .ok_or(NormalizeError::GeneratedInterval(interval_secs))?;

    let daily = generate_daily_ignore_dst_cron(
        interval_days,
        start_local.hour(),
        start_local.minute(),
        start_local.date(),
    )?;
    debug!(cron = %daily.expression, interval_days, "generated DST-ignoring daily cron");

    let tag = parse_tag(spec.ui_pass_param.as_deref()).unwrap_or(TriggerTag::Daily);
    let trigger = CronTrigger::new(
        daily.expression,
        to_utc(&tz, daily.anchor)?,
        spec.end_time,
        tz,
        duration_ms,
        tag,
    )?;
    Ok(trigger.into())
}

fn recurrence_from(
    spec: &ComplexJobTrigger,
    start_local: NaiveDateTime,
) -> Result<RecurrenceSet, NormalizeError> {
    let weekday = |value: i32| {
        DayOfWeek::from_zero_based(value).ok_or(NormalizeError::OutOfRange {
            axis: "day-of-week",
            value,
        })
    };

    let mut set = RecurrenceSet::new();
    if !spec.days_of_week.is_empty() && !spec.weeks_of_month.is_empty() {
        for &dow in &spec.days_of_week {
            let day = weekday(dow)?;
            for &week in &spec.weeks_of_month {
                let qualifier = WeekOfMonth::from_wire(week).ok_or(NormalizeError::OutOfRange {
                    axis: "week-of-month",
                    value: week,
                })?;
                set.add_day_of_week_qualified(qualifier, day);
            }
        }
    } else if !spec.days_of_week.is_empty() {
        for &dow in &spec.days_of_week {
            set.add_day_of_week(weekday(dow)?);
        }
    } else {
        for &dom in &spec.days_of_month {
            set.add_day_of_month(dom)?;
        }
    }

    for &month in &spec.months_of_year {
        let month = MonthOfYear::from_zero_based(month).ok_or(NormalizeError::OutOfRange {
            axis: "month",
            value: month,
        })?;
        set.add_month(month);
    }
    for &year in &spec.years {
        set.add_year(year);
    }

    if !set.has_recurrence_axis() {
        return Err(NormalizeError::NoRecurrenceAxis);
    }

    set.set_hour(start_local.hour() as i32)?;
    set.add_minute(start_local.minute() as i32)?;
    Ok(set)
}

fn calendar_tag(set: &RecurrenceSet) -> TriggerTag {
    match set.days() {
        DayRule::DaysOfWeek(_) => TriggerTag::Weekly,
        DayRule::DaysOfMonth(_) | DayRule::Qualified(_) if set.months().is_empty() => {
            TriggerTag::Monthly
        }
        _ => TriggerTag::Yearly,
    }
}

// ── Cron ────────────────────────────────────────────────────────────

fn cron(
    spec: &CronJobTrigger,
    duration_ms: Option<i64>,
    tz: Tz,
    now: DateTime<Utc>,
) -> Result<Trigger, NormalizeError> {
    let fields: Vec<&str> = spec.cron_string.split_whitespace().collect();
    let expression = match fields.len() {
        6 => format!("{} *", fields.join(" ")),
        7 => fields.join(" "),
        count => {
            return Err(NormalizeError::CronFieldCount {
                expression: spec.cron_string.clone(),
                count,
            })
        }
    };

    let has_start_fields = spec.start_year.is_some()
        || spec.start_month.is_some()
        || spec.start_day.is_some()
        || spec.start_hour.is_some()
        || spec.start_min.is_some();

    let start_time = match spec.start_time {
        Some(start) => start,
        None if has_start_fields => {
            let today = now.with_timezone(&tz).date_naive();
            let local = calendar::lenient_local(
                spec.start_year.unwrap_or(today.year()),
                spec.start_month.unwrap_or(today.month0() as i32),
                spec.start_day.unwrap_or(today.day() as i32),
                spec.start_hour.unwrap_or(0),
                spec.start_min.unwrap_or(0),
            )?;
            to_utc(&tz, local)?
        }
        None => now,
    };

    let trigger = CronTrigger::new(
        expression,
        start_time,
        spec.end_time,
        tz,
        duration_ms,
        TriggerTag::Cron,
    )?;
    Ok(trigger.into())
}
