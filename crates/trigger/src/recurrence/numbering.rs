//! Month and weekday numbering.
//!
//! Request payloads count from zero (January = 0, Sunday = 0). The scheduler
//! engine and everything stored in a [`RecurrenceSet`](super::RecurrenceSet)
//! count from one (January = 1, Sunday = 1). The shift happens here and only here.

use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Day of week, 1 = Sunday .. 7 = Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DayOfWeek(u8);

impl DayOfWeek {
    pub const SUNDAY: Self = Self(1);
    pub const MONDAY: Self = Self(2);
    pub const TUESDAY: Self = Self(3);
    pub const WEDNESDAY: Self = Self(4);
    pub const THURSDAY: Self = Self(5);
    pub const FRIDAY: Self = Self(6);
    pub const SATURDAY: Self = Self(7);

    /// From a request payload value (Sunday = 0).
    pub fn from_zero_based(value: i32) -> Option<Self> {
        (0..=6).contains(&value).then(|| Self(value as u8 + 1))
    }

    /// From an engine value (Sunday = 1).
    pub fn from_one_based(value: i32) -> Option<Self> {
        (1..=7).contains(&value).then_some(Self(value as u8))
    }

    pub fn of(weekday: Weekday) -> Self {
        Self(weekday.number_from_sunday() as u8)
    }

    pub fn of_date(date: NaiveDate) -> Self {
        Self::of(date.weekday())
    }

    /// Engine number, 1..=7.
    pub fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_one_based(i32::from(value))
            .ok_or_else(|| format!("day of week must be 1..=7, got {value}"))
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> Self {
        day.0
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Month of year, 1 = January .. 12 = December.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct MonthOfYear(u8);

impl MonthOfYear {
    /// From a request payload value (January = 0).
    pub fn from_zero_based(value: i32) -> Option<Self> {
        (0..=11).contains(&value).then(|| Self(value as u8 + 1))
    }

    /// From an engine value (January = 1).
    pub fn from_one_based(value: i32) -> Option<Self> {
        (1..=12).contains(&value).then_some(Self(value as u8))
    }

    pub fn of_date(date: NaiveDate) -> Self {
        Self(date.month() as u8)
    }

    /// Engine number, 1..=12.
    pub fn number(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for MonthOfYear {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_one_based(i32::from(value))
            .ok_or_else(|| format!("month must be 1..=12, got {value}"))
    }
}

impl From<MonthOfYear> for u8 {
    fn from(month: MonthOfYear) -> Self {
        month.0
    }
}

impl fmt::Display for MonthOfYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordinal qualifier of a weekday within its month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WeekOfMonth {
    First,
    Second,
    Third,
    Fourth,
    Last,
}

impl WeekOfMonth {
    /// From a request payload value: 0..=3 are first..fourth, 4 is last.
    pub fn from_wire(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::First),
            1 => Some(Self::Second),
            2 => Some(Self::Third),
            3 => Some(Self::Fourth),
            4 => Some(Self::Last),
            _ => None,
        }
    }

    /// 1-based ordinal, `None` for [`WeekOfMonth::Last`].
    pub fn ordinal(self) -> Option<u32> {
        match self {
            Self::First => Some(1),
            Self::Second => Some(2),
            Self::Third => Some(3),
            Self::Fourth => Some(4),
            Self::Last => None,
        }
    }

    /// Whether `date` sits in this week of its month (weekday not checked).
    pub fn contains(self, date: NaiveDate) -> bool {
        match self.ordinal() {
            Some(n) => (date.day() - 1) / 7 + 1 == n,
            None => {
                let next_week = date + chrono::Duration::days(7);
                next_week.month() != date.month()
            }
        }
    }
}
