//! Calendar recurrence rules.
//!
//! A [`RecurrenceSet`] says *when within a repeating cycle* a calendar trigger
//! fires: which seconds, minutes and hours of which days, months and years.
//! The day axis is a single [`DayRule`], so days-of-month, flat days-of-week
//! and qualified days-of-week ("third Tuesday") can never be combined.

mod numbering;


use std::collections::BTreeSet;
use std::fmt::Display;

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

pub use self::numbering::{DayOfWeek, MonthOfYear, WeekOfMonth};

/// Rejected recurrence values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecurrenceError {
    #[error("{axis} value {value} is out of range {min}..={max}")]
    OutOfRange {
        axis: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// A weekday restricted to one week of its month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualifiedDayOfWeek {
    pub qualifier: WeekOfMonth,
    pub day: DayOfWeek,
}

impl QualifiedDayOfWeek {
    pub fn matches(&self, date: NaiveDate) -> bool {
        DayOfWeek::of_date(date) == self.day && self.qualifier.contains(date)
    }

    /// `3#2` for the second Tuesday, `6L` for the last Friday.
    fn cron_token(&self) -> String {
        match self.qualifier.ordinal() {
            Some(n) => format!("{}#{}", self.day, n),
            None => format!("{}L", self.day),
        }
    }
}

/// Which days a recurrence fires on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "camelCase")]
pub enum DayRule {
    /// Every day.
    #[default]
    Every,
    DaysOfMonth(BTreeSet<u8>),
    DaysOfWeek(BTreeSet<DayOfWeek>),
    Qualified(BTreeSet<QualifiedDayOfWeek>),
}

impl DayRule {
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            Self::Every => true,
            Self::DaysOfMonth(days) => days.contains(&(date.day() as u8)),
            Self::DaysOfWeek(days) => days.contains(&DayOfWeek::of_date(date)),
            Self::Qualified(rules) => rules.iter().any(|r| r.matches(date)),
        }
    }
}

/// Calendar recurrence of a [`CalendarTrigger`](crate::CalendarTrigger).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceSet {
    seconds: BTreeSet<u8>,
    minutes: BTreeSet<u8>,
    hours: BTreeSet<u8>,
    days: DayRule,
    months: BTreeSet<MonthOfYear>,
    years: BTreeSet<i32>,
}

fn check_range(axis: &'static str, value: i64, min: i64, max: i64) -> Result<u8, RecurrenceError> {
    if value < min || value > max {
        return Err(RecurrenceError::OutOfRange {
            axis,
            value,
            min,
            max,
        });
    }
    Ok(value as u8)
}

impl RecurrenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Mutation ────────────────────────────────────────────────

    /// Add a flat weekday. Clears qualified weekdays and days of month.
    pub fn add_day_of_week(&mut self, day: DayOfWeek) {
        match &mut self.days {
            DayRule::DaysOfWeek(days) => {
                days.insert(day);
            }
            other => *other = DayRule::DaysOfWeek(BTreeSet::from([day])),
        }
    }

    /// Add a qualified weekday. Clears flat weekdays and days of month.
    pub fn add_day_of_week_qualified(&mut self, qualifier: WeekOfMonth, day: DayOfWeek) {
        let rule = QualifiedDayOfWeek { qualifier, day };
        match &mut self.days {
            DayRule::Qualified(rules) => {
                rules.insert(rule);
            }
            other => *other = DayRule::Qualified(BTreeSet::from([rule])),
        }
    }

    /// Add a day of month (1..=31). Clears weekday entries of either form.
    pub fn add_day_of_month(&mut self, day: i32) -> Result<(), RecurrenceError> {
        let day = check_range("day-of-month", i64::from(day), 1, 31)?;
        match &mut self.days {
            DayRule::DaysOfMonth(days) => {
                days.insert(day);
            }
            other => *other = DayRule::DaysOfMonth(BTreeSet::from([day])),
        }
        Ok(())
    }

    pub fn add_month(&mut self, month: MonthOfYear) {
        self.months.insert(month);
    }

    pub fn add_year(&mut self, year: i32) {
        self.years.insert(year);
    }

    /// Replace the hour axis with a single hour.
    pub fn set_hour(&mut self, hour: i32) -> Result<(), RecurrenceError> {
        let hour = check_range("hour", i64::from(hour), 0, 23)?;
        self.hours = BTreeSet::from([hour]);
        Ok(())
    }

    pub fn add_hour(&mut self, hour: i32) -> Result<(), RecurrenceError> {
        self.hours.insert(check_range("hour", i64::from(hour), 0, 23)?);
        Ok(())
    }

    pub fn add_minute(&mut self, minute: i32) -> Result<(), RecurrenceError> {
        self.minutes.insert(check_range("minute", i64::from(minute), 0, 59)?);
        Ok(())
    }

    pub fn add_second(&mut self, second: i32) -> Result<(), RecurrenceError> {
        self.seconds.insert(check_range("second", i64::from(second), 0, 59)?);
        Ok(())
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn seconds(&self) -> &BTreeSet<u8> {
        &self.seconds
    }

    pub fn minutes(&self) -> &BTreeSet<u8> {
        &self.minutes
    }

    pub fn hours(&self) -> &BTreeSet<u8> {
        &self.hours
    }

    pub fn days(&self) -> &DayRule {
        &self.days
    }

    pub fn months(&self) -> &BTreeSet<MonthOfYear> {
        &self.months
    }

    pub fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    /// Whether any day, month or year restriction is present.
    ///
    /// Hour and minute entries alone do not count: every calendar request
    /// carries them.
    pub fn has_recurrence_axis(&self) -> bool {
        self.days != DayRule::Every || !self.months.is_empty() || !self.years.is_empty()
    }

    // ── Evaluation ──────────────────────────────────────────────

    /// Whether the set fires at some time on `date`.
    pub fn matches_date(&self, date: NaiveDate) -> bool {
        (self.years.is_empty() || self.years.contains(&date.year()))
            && (self.months.is_empty() || self.months.contains(&MonthOfYear::of_date(date)))
            && self.days.matches(date)
    }

    /// Wall-clock fire times within a matching day, ascending.
    ///
    /// An empty second axis means second 0; empty minute and hour axes mean every value.
    pub fn times_of_day(&self) -> Vec<NaiveTime> {
        let seconds: Vec<u32> = if self.seconds.is_empty() {
            vec![0]
        } else {
            self.seconds.iter().map(|&s| u32::from(s)).collect()
        };
        let minutes: Vec<u32> = axis_or_all(&self.minutes, 60);
        let hours: Vec<u32> = axis_or_all(&self.hours, 24);

        let mut times = Vec::with_capacity(hours.len() * minutes.len() * seconds.len());
        for &h in &hours {
            for &m in &minutes {
                for &s in &seconds {
                    if let Some(t) = NaiveTime::from_hms_opt(h, m, s) {
                        times.push(t);
                    }
                }
            }
        }
        times
    }

    /// Last year the set can fire in, if the year axis is restricted.
    pub fn last_year(&self) -> Option<i32> {
        self.years.iter().next_back().copied()
    }

    /// Render in the 7-field dialect `sec min hour dom month dow year`.
    pub fn to_cron_expression(&self) -> String {
        let (dom, dow) = match &self.days {
            DayRule::Every => ("*".to_string(), "?".to_string()),
            DayRule::DaysOfMonth(days) => (join_or(days, "*"), "?".to_string()),
            DayRule::DaysOfWeek(days) => ("?".to_string(), join_or(days, "*")),
            DayRule::Qualified(rules) => (
                "?".to_string(),
                rules
                    .iter()
                    .map(QualifiedDayOfWeek::cron_token)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        };
        format!(
            "{} {} {} {} {} {} {}",
            join_or(&self.seconds, "0"),
            join_or(&self.minutes, "*"),
            join_or(&self.hours, "*"),
            dom,
            join_or(&self.months, "*"),
            dow,
            join_or(&self.years, "*"),
        )
    }
}

fn axis_or_all(axis: &BTreeSet<u8>, count: u32) -> Vec<u32> {
    if axis.is_empty() {
        (0..count).collect()
    } else {
        axis.iter().map(|&v| u32::from(v)).collect()
    }
}

fn join_or<T: Display>(values: &BTreeSet<T>, empty: &str) -> String {
    if values.is_empty() {
        return empty.to_string();
    }
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
