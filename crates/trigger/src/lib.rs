//! Trigger normalization and blockout evaluation for scheduled jobs.
//!
//! This crate provides:
//! - [`RecurrenceSet`] calendar rules with 1-based month/weekday numbering
//! - DST-ignoring daily cron generation
//! - [`TriggerNormalizer`]: schedule request → canonical [`Trigger`]
//! - [`FireTimeOracle`] and the built-in [`CalendarClock`]
//! - [`BlockoutEvaluator`]: will-fire / partially / totally blocked verdicts
//! - [`OutputPathResolver`]: cascading output-folder fallback

pub mod blockout;
pub mod clock;
pub mod cron_gen;
pub mod normalizer;
pub mod output;
pub mod recurrence;
pub mod trigger;

pub use blockout::{BlockStatus, BlockoutError, BlockoutEvaluator, BlockoutWindow};
pub use clock::{CalendarClock, FireTimeOracle, OracleError};
pub use cron_gen::{generate_daily_ignore_dst_cron, CronGenError, DailyCron};
pub use normalizer::{NormalizeError, TriggerNormalizer};
pub use output::{
    CollaboratorError, FileService, OutputPathError, OutputPathResolver, OutputResolutionContext,
    OutputSource, Owner, Permission, ResolvedOutput, SettingsStore,
};
pub use recurrence::{DayOfWeek, DayRule, MonthOfYear, QualifiedDayOfWeek, RecurrenceSet, WeekOfMonth};
pub use trigger::{CalendarTrigger, CronTrigger, SimpleTrigger, Trigger, TriggerError, TriggerTag};
