//! Tests for blockout evaluation.

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use schedkit_core::config::BlockoutConfig;
use schedkit_core::{ComplexJobTrigger, ScheduleRequest};

use super::*;
use crate::clock::{CalendarClock, FireTimeOracle, OracleError};
use crate::normalizer::TriggerNormalizer;
use crate::recurrence::{DayOfWeek, RecurrenceSet};
use crate::trigger::{CalendarTrigger, SimpleTrigger, Trigger, TriggerTag};

fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

fn once(at: DateTime<Utc>) -> Trigger {
    SimpleTrigger::once(at, Tz::UTC).into()
}

fn one_shot_window(id: &str, start: DateTime<Utc>, duration: Duration) -> BlockoutWindow {
    BlockoutWindow::new(id, once(start), duration).unwrap()
}

/// Mon..Fri 09:00 UTC for the week of 2026-06-01, ending that Friday.
fn workweek_trigger() -> Trigger {
    let mut set = RecurrenceSet::new();
    for day in [
        DayOfWeek::MONDAY,
        DayOfWeek::TUESDAY,
        DayOfWeek::WEDNESDAY,
        DayOfWeek::THURSDAY,
        DayOfWeek::FRIDAY,
    ] {
        set.add_day_of_week(day);
    }
    set.set_hour(9).unwrap();
    set.add_minute(0).unwrap();
    CalendarTrigger::new(
        utc(2026, 6, 1, 0, 0),
        Some(utc(2026, 6, 5, 12, 0)),
        Tz::UTC,
        None,
        set,
        TriggerTag::Weekly,
    )
    .unwrap()
    .into()
}

struct BrokenOracle;

impl FireTimeOracle for BrokenOracle {
    fn next_fire_time(
        &self,
        _trigger: &Trigger,
        _after: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, OracleError> {
        Err(OracleError::Engine("engine offline".to_string()))
    }
}

// -- containment ------------------------------------------------------

#[test]
fn fire_inside_window_will_not_fire() {
    let t = utc(2026, 7, 1, 22, 0);
    let d = Duration::hours(4);
    let windows = [one_shot_window("maintenance", t, d)];
    let clock = CalendarClock::new();
    let eval = BlockoutEvaluator::new(&windows, &clock);
    let now = utc(2026, 7, 1, 0, 0);

    assert!(!eval.will_fire_after(&once(t + d / 2), now).unwrap());
    assert!(!eval.will_fire_after(&once(t), now).unwrap());
    assert!(eval.will_fire_after(&once(t - Duration::seconds(1)), now).unwrap());
    assert!(eval.will_fire_after(&once(t + d + Duration::seconds(1)), now).unwrap());
    assert!(eval.will_fire_after(&once(t + d), now).unwrap());
}

#[test]
fn recurring_blockout_gates_now() {
    // Every Saturday 00:00 in Berlin for a full day.
    let tz: Tz = "Europe/Berlin".parse().unwrap();
    let mut set = RecurrenceSet::new();
    set.add_day_of_week(DayOfWeek::SATURDAY);
    set.set_hour(0).unwrap();
    set.add_minute(0).unwrap();
    let trigger: Trigger =
        CalendarTrigger::new(utc(2026, 1, 1, 0, 0), None, tz, None, set, TriggerTag::Weekly)
            .unwrap()
            .into();
    let windows = [BlockoutWindow::new("weekend", trigger, Duration::hours(24)).unwrap()];
    let clock = CalendarClock::new();
    let eval = BlockoutEvaluator::new(&windows, &clock);

    // 2026-06-06 is a Saturday; Berlin is UTC+2.
    assert!(!eval.should_fire_at(utc(2026, 6, 6, 12, 0)).unwrap());
    assert!(!eval.should_fire_at(utc(2026, 6, 5, 22, 0)).unwrap());
    assert!(eval.should_fire_at(utc(2026, 6, 5, 21, 59)).unwrap());
    assert!(eval.should_fire_at(utc(2026, 6, 6, 22, 0)).unwrap());
}

#[test]
fn no_blockouts_always_fire() {
    let clock = CalendarClock::new();
    let eval = BlockoutEvaluator::new(&[], &clock);
    assert!(eval.should_fire_at(utc(2026, 1, 1, 0, 0)).unwrap());
    assert!(eval.will_fire_after(&workweek_trigger(), utc(2026, 5, 31, 0, 0)).unwrap());
}

#[test]
fn expired_trigger_will_not_fire() {
    let clock = CalendarClock::new();
    let eval = BlockoutEvaluator::new(&[], &clock);
    let past = once(utc(2026, 1, 1, 0, 0));
    assert!(!eval.will_fire_after(&past, utc(2026, 2, 1, 0, 0)).unwrap());
}

// -- partial / total --------------------------------------------------

#[test]
fn one_blocked_weekday_is_partial_not_total() {
    let windows = [one_shot_window("wednesday-patch", utc(2026, 6, 3, 8, 0), Duration::hours(2))];
    let clock = CalendarClock::new();
    let eval = BlockoutEvaluator::new(&windows, &clock);
    let now = utc(2026, 5, 31, 0, 0);
    let trigger = workweek_trigger();

    assert_eq!(
        eval.fire_times(&trigger, now, 100, now + Duration::days(30)).unwrap().len(),
        5
    );
    let status = eval.block_status_after(&trigger, now).unwrap();
    assert_eq!(
        status,
        BlockStatus {
            partially_blocked: true,
            totally_blocked: false,
        }
    );
}

#[test]
fn blocked_one_shot_is_total_not_partial() {
    let windows = [one_shot_window("freeze", utc(2026, 6, 3, 8, 0), Duration::hours(2))];
    let clock = CalendarClock::new();
    let eval = BlockoutEvaluator::new(&windows, &clock);
    let status = eval
        .block_status_after(&once(utc(2026, 6, 3, 9, 0)), utc(2026, 6, 1, 0, 0))
        .unwrap();
    assert!(status.totally_blocked);
    assert!(!status.partially_blocked);
}

#[test]
fn blocked_next_fire_reports_both_flags() {
    // Monday's fire is blocked, the rest of the week is not.
    let windows = [one_shot_window("monday", utc(2026, 6, 1, 8, 30), Duration::hours(1))];
    let clock = CalendarClock::new();
    let eval = BlockoutEvaluator::new(&windows, &clock);
    let status = eval
        .block_status_after(&workweek_trigger(), utc(2026, 5, 31, 0, 0))
        .unwrap();
    assert!(status.totally_blocked);
    assert!(status.partially_blocked);
}

#[test]
fn sampling_respects_configured_limit() {
    let clock = CalendarClock::new();
    let config = BlockoutConfig {
        sample_limit: 3,
        horizon_days: 366,
    };
    let eval = BlockoutEvaluator::with_config(&[], &clock, &config);
    let every_minute: Trigger =
        SimpleTrigger::new(utc(2026, 1, 1, 0, 0), None, 60, -1, Tz::UTC, TriggerTag::Minutes)
            .unwrap()
            .into();
    let fires = eval
        .fire_times(&every_minute, utc(2026, 1, 1, 0, 0), 3, utc(2027, 1, 1, 0, 0))
        .unwrap();
    assert_eq!(
        fires,
        vec![
            utc(2026, 1, 1, 0, 1),
            utc(2026, 1, 1, 0, 2),
            utc(2026, 1, 1, 0, 3)
        ]
    );
    assert!(!eval
        .is_partially_blocked_after(&every_minute, utc(2026, 1, 1, 0, 0))
        .unwrap());
}

// -- failures ---------------------------------------------------------

#[test]
fn oracle_failure_is_surfaced() {
    let windows = [one_shot_window("any", utc(2026, 6, 1, 0, 0), Duration::hours(1))];
    let eval = BlockoutEvaluator::new(&windows, &BrokenOracle);
    let err = eval.will_fire_after(&once(utc(2026, 6, 1, 0, 30)), utc(2026, 5, 1, 0, 0));
    assert!(matches!(err, Err(BlockoutError::Oracle { .. })));
    assert!(eval.should_fire_at(utc(2026, 6, 1, 0, 30)).is_err());
    assert!(eval.block_status_after(&once(utc(2026, 6, 2, 0, 0)), utc(2026, 5, 1, 0, 0)).is_err());
}

// -- windows ----------------------------------------------------------

#[test]
fn window_requires_positive_duration() {
    let err = BlockoutWindow::new("zero", once(utc(2026, 6, 1, 0, 0)), Duration::zero()).unwrap_err();
    assert!(matches!(err, BlockoutError::InvalidDuration { duration_ms: 0, .. }));
}

#[test]
fn window_from_request_is_tagged_blockout() {
    let mut req = ScheduleRequest::new();
    req.duration = Some(7_200_000);
    req.set_complex_trigger(ComplexJobTrigger {
        days_of_week: vec![0],
        start_hour: 1,
        ..Default::default()
    });
    let normalizer = TriggerNormalizer::new(Tz::UTC);
    let window = BlockoutWindow::from_request("sunday", &req, &normalizer, utc(2026, 6, 1, 0, 0)).unwrap();
    assert_eq!(window.trigger().tag(), TriggerTag::Blockout);
    assert_eq!(window.duration(), Duration::hours(2));
    assert_eq!(window.id(), "sunday");
}

#[test]
fn window_from_request_needs_duration() {
    let req = ScheduleRequest::new();
    let normalizer = TriggerNormalizer::new(Tz::UTC);
    let err = BlockoutWindow::from_request("none", &req, &normalizer, utc(2026, 6, 1, 0, 0)).unwrap_err();
    assert_eq!(err, BlockoutError::MissingDuration { id: "none".to_string() });
}

#[test]
fn candidate_blockout_lists_affected_schedules() {
    let clock = CalendarClock::new();
    let eval = BlockoutEvaluator::new(&[], &clock);
    let candidate = one_shot_window("thursday", utc(2026, 6, 4, 8, 0), Duration::hours(3));
    let workweek = workweek_trigger();
    let evening = once(utc(2026, 6, 4, 20, 0));
    let schedules = [("workweek", &workweek), ("evening", &evening)];

    let blocked = eval
        .will_block_schedules(&candidate, schedules, utc(2026, 5, 31, 0, 0))
        .unwrap();
    assert_eq!(blocked, vec!["workweek".to_string()]);
}

// -- extreme configuration --------------------------------------------

#[test]
fn oversized_duration_blocks_from_window_start_on() {
    let start = utc(2026, 1, 1, 0, 0);
    let windows =
        [BlockoutWindow::new("forever", once(start), Duration::milliseconds(i64::MAX / 2)).unwrap()];
    let clock = CalendarClock::new();
    let eval = BlockoutEvaluator::new(&windows, &clock);

    assert!(!eval.should_fire_at(utc(2026, 6, 1, 0, 0)).unwrap());
    assert!(eval.should_fire_at(utc(2025, 12, 31, 0, 0)).unwrap());
    let status = eval
        .block_status_after(&once(utc(2026, 6, 1, 0, 0)), utc(2026, 5, 1, 0, 0))
        .unwrap();
    assert!(status.totally_blocked);
}

#[test]
fn oversized_horizon_samples_until_trigger_ends() {
    let windows = [one_shot_window("wednesday-patch", utc(2026, 6, 3, 8, 0), Duration::hours(2))];
    let clock = CalendarClock::new();
    let config = BlockoutConfig {
        sample_limit: 10,
        horizon_days: u32::MAX,
    };
    let eval = BlockoutEvaluator::with_config(&windows, &clock, &config);
    let now = utc(2026, 5, 31, 0, 0);

    assert!(eval.is_partially_blocked_after(&workweek_trigger(), now).unwrap());
    let affected = eval
        .will_block_schedules(&windows[0], [("workweek", &workweek_trigger())], now)
        .unwrap();
    assert_eq!(affected, vec!["workweek".to_string()]);
}

#[test]
fn evaluator_exposes_its_snapshot() {
    let windows = [one_shot_window("a", utc(2026, 6, 1, 0, 0), Duration::hours(1))];
    let clock = CalendarClock::new();
    let eval = BlockoutEvaluator::new(&windows, &clock);
    assert_eq!(eval.blockouts().len(), 1);
    assert_eq!(eval.blockouts()[0].id(), "a");
}
