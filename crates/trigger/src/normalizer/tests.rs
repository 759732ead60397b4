//! Tests for the trigger normalizer.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use schedkit_core::{ComplexJobTrigger, CronJobTrigger, ScheduleRequest, SimpleJobTrigger};

use super::*;
use crate::recurrence::QualifiedDayOfWeek;
use crate::trigger::TriggerError;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 20, 10, 15, 0).unwrap()
}

fn normalizer() -> TriggerNormalizer {
    TriggerNormalizer::new(Tz::UTC)
}

fn complex_request(trigger: ComplexJobTrigger) -> ScheduleRequest {
    let mut req = ScheduleRequest::new();
    req.set_complex_trigger(trigger);
    req
}

fn calendar_of(trigger: Trigger) -> CalendarTrigger {
    match trigger {
        Trigger::Calendar(t) => t,
        other => panic!("expected calendar trigger, got {other:?}"),
    }
}

// -- defaults ---------------------------------------------------------

#[test]
fn missing_trigger_runs_once_ten_seconds_out() {
    let trigger = normalizer().normalize_at(&ScheduleRequest::new(), now()).unwrap();
    match &trigger {
        Trigger::Simple(t) => {
            assert_eq!(t.repeat_count(), 0);
            assert_eq!(t.repeat_interval_secs(), 0);
        }
        other => panic!("expected simple trigger, got {other:?}"),
    }
    assert_eq!(trigger.start_time(), now() + Duration::seconds(10));
    assert_eq!(trigger.tag(), TriggerTag::RunOnce);
}

#[test]
fn run_now_delay_comes_from_config() {
    let config = SchedulerConfig {
        default_time_zone: "Asia/Manila".to_string(),
        run_now_delay_secs: 30,
    };
    let n = TriggerNormalizer::from_config(&config).unwrap();
    let trigger = n.normalize_at(&ScheduleRequest::new(), now()).unwrap();
    assert_eq!(trigger.start_time(), now() + Duration::seconds(30));
    assert_eq!(trigger.time_zone(), chrono_tz::Asia::Manila);
}

#[test]
fn unrepresentable_run_now_delay_is_rejected() {
    let config = SchedulerConfig {
        default_time_zone: "UTC".to_string(),
        run_now_delay_secs: i64::MAX,
    };
    assert_eq!(
        TriggerNormalizer::from_config(&config).unwrap_err(),
        NormalizeError::RunNowDelay(i64::MAX)
    );

    let n = TriggerNormalizer::new(Tz::UTC).with_run_now_delay(Duration::MAX);
    let err = n.normalize_at(&ScheduleRequest::new(), now()).unwrap_err();
    assert!(matches!(err, NormalizeError::RunNowDelay(_)));
}

#[test]
fn unknown_time_zone_is_rejected() {
    let mut req = ScheduleRequest::new();
    req.time_zone = Some("Mars/Olympus_Mons".to_string());
    let err = normalizer().normalize_at(&req, now()).unwrap_err();
    assert_eq!(err, NormalizeError::UnknownTimeZone("Mars/Olympus_Mons".to_string()));
}

// -- simple -----------------------------------------------------------

#[test]
fn simple_defaults_start_to_now_and_stamps_time_zone() {
    let mut req = ScheduleRequest::new();
    req.time_zone = Some("Europe/Berlin".to_string());
    req.set_simple_trigger(SimpleJobTrigger {
        repeat_interval: 300,
        repeat_count: -1,
        ..Default::default()
    });
    let trigger = normalizer().normalize_at(&req, now()).unwrap();
    assert_eq!(trigger.start_time(), now());
    assert_eq!(trigger.time_zone(), chrono_tz::Europe::Berlin);
    assert_eq!(trigger.tag(), TriggerTag::Minutes);
}

#[test]
fn simple_keeps_explicit_fields_and_ui_tag() {
    let start = now() + Duration::days(1);
    let mut req = ScheduleRequest::new();
    req.set_simple_trigger(SimpleJobTrigger {
        start_time: Some(start),
        end_time: Some(start + Duration::days(7)),
        repeat_interval: 86_400,
        repeat_count: 6,
        ui_pass_param: Some("DAILY".to_string()),
    });
    let trigger = normalizer().normalize_at(&req, now()).unwrap();
    assert_eq!(trigger.start_time(), start);
    assert_eq!(trigger.end_time(), Some(start + Duration::days(7)));
    assert_eq!(trigger.tag(), TriggerTag::Daily);
}

#[test]
fn simple_end_before_start_is_malformed() {
    let mut req = ScheduleRequest::new();
    req.set_simple_trigger(SimpleJobTrigger {
        start_time: Some(now()),
        end_time: Some(now() - Duration::hours(1)),
        ..Default::default()
    });
    let err = normalizer().normalize_at(&req, now()).unwrap_err();
    assert!(matches!(err, NormalizeError::Trigger(TriggerError::EndBeforeStart { .. })));
}

// -- complex → calendar -----------------------------------------------

#[test]
fn weekly_report_scenario() {
    let mut req = complex_request(ComplexJobTrigger {
        days_of_week: vec![2, 4, 6],
        start_hour: 9,
        start_min: 0,
        weeks_of_month: vec![],
        ..Default::default()
    });
    req.job_name = Some("WeeklyReport".to_string());

    let cal = calendar_of(normalizer().normalize_at(&req, now()).unwrap());
    let set = cal.recurrence();
    assert_eq!(
        set.days(),
        &DayRule::DaysOfWeek(BTreeSet::from([
            DayOfWeek::from_one_based(3).unwrap(),
            DayOfWeek::from_one_based(5).unwrap(),
            DayOfWeek::from_one_based(7).unwrap(),
        ]))
    );
    assert_eq!(set.hours(), &BTreeSet::from([9]));
    assert_eq!(set.minutes(), &BTreeSet::from([0]));
    assert_eq!(Trigger::Calendar(cal).tag(), TriggerTag::Weekly);
}

#[test]
fn every_weekday_and_month_shifts_by_one() {
    for dow in 0..=6 {
        let req = complex_request(ComplexJobTrigger {
            days_of_week: vec![dow],
            ..Default::default()
        });
        let cal = calendar_of(normalizer().normalize_at(&req, now()).unwrap());
        let expected = DayOfWeek::from_one_based(dow + 1).unwrap();
        assert_eq!(cal.recurrence().days(), &DayRule::DaysOfWeek(BTreeSet::from([expected])));
    }
    for month in 0..=11 {
        let req = complex_request(ComplexJobTrigger {
            days_of_month: vec![1],
            months_of_year: vec![month],
            ..Default::default()
        });
        let cal = calendar_of(normalizer().normalize_at(&req, now()).unwrap());
        let numbers: Vec<u8> = cal.recurrence().months().iter().map(|m| m.number()).collect();
        assert_eq!(numbers, vec![month as u8 + 1]);
    }
}

#[test]
fn weekday_times_week_of_month_yields_qualified_pairs() {
    let req = complex_request(ComplexJobTrigger {
        days_of_week: vec![2, 5],
        weeks_of_month: vec![0, 4],
        start_hour: 8,
        ..Default::default()
    });
    let cal = calendar_of(normalizer().normalize_at(&req, now()).unwrap());
    let expected: BTreeSet<QualifiedDayOfWeek> = [
        (WeekOfMonth::First, DayOfWeek::TUESDAY),
        (WeekOfMonth::Last, DayOfWeek::TUESDAY),
        (WeekOfMonth::First, DayOfWeek::FRIDAY),
        (WeekOfMonth::Last, DayOfWeek::FRIDAY),
    ]
    .into_iter()
    .map(|(qualifier, day)| QualifiedDayOfWeek { qualifier, day })
    .collect();
    assert_eq!(cal.recurrence().days(), &DayRule::Qualified(expected));
    assert_eq!(Trigger::Calendar(cal).tag(), TriggerTag::Monthly);
}

#[test]
fn week_of_month_four_is_always_last() {
    for dow in 0..=6 {
        let req = complex_request(ComplexJobTrigger {
            days_of_week: vec![dow],
            weeks_of_month: vec![4],
            ..Default::default()
        });
        let cal = calendar_of(normalizer().normalize_at(&req, now()).unwrap());
        match cal.recurrence().days() {
            DayRule::Qualified(rules) => {
                assert!(rules.iter().all(|r| r.qualifier == WeekOfMonth::Last));
            }
            other => panic!("expected qualified rules, got {other:?}"),
        }
    }
}

#[test]
fn days_of_month_pass_through_verbatim_with_years() {
    let req = complex_request(ComplexJobTrigger {
        days_of_month: vec![1, 15],
        months_of_year: vec![5],
        years: vec![2027, 2028],
        start_hour: 23,
        start_min: 45,
        ..Default::default()
    });
    let cal = calendar_of(normalizer().normalize_at(&req, now()).unwrap());
    let set = cal.recurrence();
    assert_eq!(set.days(), &DayRule::DaysOfMonth(BTreeSet::from([1, 15])));
    assert_eq!(set.years(), &BTreeSet::from([2027, 2028]));
    assert_eq!(set.to_cron_expression(), "0 45 23 1,15 6 ? 2027,2028");
    assert_eq!(Trigger::Calendar(cal).tag(), TriggerTag::Yearly);
}

#[test]
fn start_fields_overflow_through_calendar_construction() {
    let req = complex_request(ComplexJobTrigger {
        start_year: Some(2026),
        start_month: Some(13),
        start_day: Some(1),
        start_hour: 25,
        start_min: 0,
        days_of_month: vec![1],
        ..Default::default()
    });
    let cal = calendar_of(normalizer().normalize_at(&req, now()).unwrap());
    assert_eq!(cal.recurrence().hours(), &BTreeSet::from([1]));
    let trigger = Trigger::Calendar(cal);
    assert_eq!(
        trigger.start_time(),
        Utc.with_ymd_and_hms(2027, 2, 2, 1, 0, 0).unwrap()
    );
}

#[test]
fn calendar_copies_duration_end_and_zone() {
    let end = now() + Duration::days(30);
    let mut req = complex_request(ComplexJobTrigger {
        days_of_week: vec![6],
        end_time: Some(end),
        ..Default::default()
    });
    req.duration = Some(3_600_000);
    req.time_zone = Some("America/Chicago".to_string());
    let trigger = normalizer().normalize_at(&req, now()).unwrap();
    assert_eq!(trigger.duration_ms(), Some(3_600_000));
    assert_eq!(trigger.end_time(), Some(end));
    assert_eq!(trigger.time_zone(), chrono_tz::America::Chicago);
}

#[test]
fn calendar_without_recurrence_axis_is_malformed() {
    let req = complex_request(ComplexJobTrigger {
        start_hour: 9,
        weeks_of_month: vec![1],
        ..Default::default()
    });
    let err = normalizer().normalize_at(&req, now()).unwrap_err();
    assert_eq!(err, NormalizeError::NoRecurrenceAxis);
}

#[test]
fn out_of_range_weekday_is_malformed() {
    let req = complex_request(ComplexJobTrigger {
        days_of_week: vec![7],
        ..Default::default()
    });
    let err = normalizer().normalize_at(&req, now()).unwrap_err();
    assert_eq!(
        err,
        NormalizeError::OutOfRange {
            axis: "day-of-week",
            value: 7
        }
    );
}

// -- complex → generated cron -----------------------------------------

#[test]
fn to_be_generated_switches_to_cron_variant() {
    let req = complex_request(ComplexJobTrigger {
        cron_string: Some("TO_BE_GENERATED".to_string()),
        repeat_interval: Some(259_200),
        start_year: Some(2026),
        start_month: Some(2),
        start_day: Some(5),
        start_hour: 14,
        start_min: 30,
        ..Default::default()
    });
    let trigger = normalizer().normalize_at(&req, now()).unwrap();
    let Trigger::Cron(cron) = &trigger else {
        panic!("expected cron trigger, got {trigger:?}");
    };
    let fields: Vec<&str> = cron.cron_expression().split_whitespace().collect();
    assert_eq!(fields[3], "*/3");
    assert_eq!(fields[2], "14");
    assert_eq!(fields[1], "30");
    assert_eq!(fields[5], "?");
    assert_eq!(
        trigger.start_time(),
        Utc.with_ymd_and_hms(2026, 3, 5, 14, 30, 0).unwrap()
    );
    assert_eq!(trigger.tag(), TriggerTag::Daily);
}

#[test]
fn to_be_generated_needs_at_least_a_day() {
    let req = complex_request(ComplexJobTrigger {
        cron_string: Some("TO_BE_GENERATED".to_string()),
        repeat_interval: Some(3_600),
        ..Default::default()
    });
    let err = normalizer().normalize_at(&req, now()).unwrap_err();
    assert_eq!(err, NormalizeError::GeneratedInterval(3_600));
}

// -- cron -------------------------------------------------------------

#[test]
fn six_field_cron_gains_a_seventh() {
    let mut req = ScheduleRequest::new();
    req.set_cron_trigger(CronJobTrigger {
        cron_string: "0 0 12  ? * 2-6".to_string(),
        ..Default::default()
    });
    let trigger = normalizer().normalize_at(&req, now()).unwrap();
    assert_eq!(trigger.cron_expression().as_deref(), Some("0 0 12 ? * 2-6 *"));
    assert_eq!(trigger.start_time(), now());
    assert_eq!(trigger.tag(), TriggerTag::Cron);
}

#[test]
fn seven_field_cron_is_kept() {
    let mut req = ScheduleRequest::new();
    req.duration = Some(7_200_000);
    req.set_cron_trigger(CronJobTrigger {
        cron_string: "0 30 1 ? * 1 2027".to_string(),
        start_time: Some(now() + Duration::hours(1)),
        ..Default::default()
    });
    let trigger = normalizer().normalize_at(&req, now()).unwrap();
    assert_eq!(trigger.cron_expression().as_deref(), Some("0 30 1 ? * 1 2027"));
    assert_eq!(trigger.start_time(), now() + Duration::hours(1));
    assert_eq!(trigger.duration_ms(), Some(7_200_000));
}

#[test]
fn cron_start_fields_build_start_time() {
    let mut req = ScheduleRequest::new();
    req.set_cron_trigger(CronJobTrigger {
        cron_string: "0 0 6 * * ?".to_string(),
        start_year: Some(2026),
        start_month: Some(5),
        start_day: Some(1),
        start_hour: Some(6),
        start_min: Some(0),
        ..Default::default()
    });
    let trigger = normalizer().normalize_at(&req, now()).unwrap();
    assert_eq!(
        trigger.start_time(),
        Utc.with_ymd_and_hms(2026, 6, 1, 6, 0, 0).unwrap()
    );
}

#[test]
fn cron_with_wrong_field_count_is_malformed() {
    let mut req = ScheduleRequest::new();
    req.set_cron_trigger(CronJobTrigger {
        cron_string: "*/5 * * * *".to_string(),
        ..Default::default()
    });
    let err = normalizer().normalize_at(&req, now()).unwrap_err();
    assert!(matches!(err, NormalizeError::CronFieldCount { count: 5, .. }));
}

// -- exclusivity ------------------------------------------------------

#[test]
fn last_installed_trigger_decides_the_variant() {
    let mut req = ScheduleRequest::new();
    req.set_cron_trigger(CronJobTrigger {
        cron_string: "0 0 6 * * ?".to_string(),
        ..Default::default()
    });
    req.set_simple_trigger(SimpleJobTrigger::default());
    assert!(matches!(
        normalizer().normalize_at(&req, now()).unwrap(),
        Trigger::Simple(_)
    ));

    req.set_complex_trigger(ComplexJobTrigger {
        days_of_month: vec![10],
        ..Default::default()
    });
    assert!(matches!(
        normalizer().normalize_at(&req, now()).unwrap(),
        Trigger::Calendar(_)
    ));
}
