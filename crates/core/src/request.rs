//! Wire shape of a schedule request.
//!
//! A request names the action to run, where its output goes, and at most one
//! trigger specification. The three specs live in a single [`TriggerSpec`]
//! slot, so installing one always clears the other two.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RequestError;

/// Sentinel cron value asking the server to derive a DST-ignoring daily cron.
pub const TO_BE_GENERATED: &str = "TO_BE_GENERATED";

/// Repeat-interval trigger (one-shot when `repeat_interval` is 0).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleJobTrigger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Seconds between fires.
    #[serde(default)]
    pub repeat_interval: i64,
    /// Additional fires after the first; -1 repeats forever.
    #[serde(default)]
    pub repeat_count: i32,
    /// UI recurrence label ("RUN_ONCE", "MINUTES", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_pass_param: Option<String>,
}

/// Calendar-recurrence trigger.
///
/// Month and weekday arrays are 0-based (January = 0, Sunday = 0);
/// `weeks_of_month` uses 0..=3 for first..fourth and 4 for "last".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexJobTrigger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_month: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_day: Option<i32>,
    #[serde(default)]
    pub start_hour: i32,
    #[serde(default)]
    pub start_min: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub days_of_week: Vec<i32>,
    #[serde(default)]
    pub days_of_month: Vec<i32>,
    #[serde(default)]
    pub weeks_of_month: Vec<i32>,
    #[serde(default)]
    pub months_of_year: Vec<i32>,
    #[serde(default)]
    pub years: Vec<i32>,
    /// Either absent or [`TO_BE_GENERATED`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cron_string: Option<String>,
    /// Seconds; only read together with [`TO_BE_GENERATED`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_interval: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_pass_param: Option<String>,
}

impl ComplexJobTrigger {
    /// Whether the cron field carries the [`TO_BE_GENERATED`] sentinel.
    pub fn wants_generated_cron(&self) -> bool {
        self.cron_string.as_deref().map(str::trim) == Some(TO_BE_GENERATED)
    }
}

/// Raw cron trigger. The cron string is opaque beyond its field count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJobTrigger {
    pub cron_string: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_hour: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_min: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_month: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_day: Option<i32>,
}

/// The single trigger slot of a [`ScheduleRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerSpec {
    Simple(SimpleJobTrigger),
    Complex(ComplexJobTrigger),
    Cron(CronJobTrigger),
}

/// Incoming schedule (or blockout) request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleRequestWire", into = "ScheduleRequestWire")]
pub struct ScheduleRequest {
    pub action_id: Option<String>,
    pub job_name: Option<String>,
    pub input_file: Option<String>,
    pub output_file: Option<String>,
    /// IANA zone name; the configured default applies when absent.
    pub time_zone: Option<String>,
    /// Blockout length in milliseconds.
    pub duration: Option<i64>,
    /// Opaque to scheduling; handed through to the job.
    pub job_parameters: BTreeMap<String, serde_json::Value>,
    trigger: Option<TriggerSpec>,
}

impl ScheduleRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) -> Option<&TriggerSpec> {
        self.trigger.as_ref()
    }

    pub fn simple_trigger(&self) -> Option<&SimpleJobTrigger> {
        match &self.trigger {
            Some(TriggerSpec::Simple(t)) => Some(t),
            _ => None,
        }
    }

    pub fn complex_trigger(&self) -> Option<&ComplexJobTrigger> {
        match &self.trigger {
            Some(TriggerSpec::Complex(t)) => Some(t),
            _ => None,
        }
    }

    pub fn cron_trigger(&self) -> Option<&CronJobTrigger> {
        match &self.trigger {
            Some(TriggerSpec::Cron(t)) => Some(t),
            _ => None,
        }
    }

    /// Install a simple trigger, clearing any complex or cron trigger.
    pub fn set_simple_trigger(&mut self, trigger: SimpleJobTrigger) {
        self.trigger = Some(TriggerSpec::Simple(trigger));
    }

    /// Install a calendar trigger, clearing any simple or cron trigger.
    pub fn set_complex_trigger(&mut self, trigger: ComplexJobTrigger) {
        self.trigger = Some(TriggerSpec::Complex(trigger));
    }

    /// Install a cron trigger, clearing any simple or calendar trigger.
    pub fn set_cron_trigger(&mut self, trigger: CronJobTrigger) {
        self.trigger = Some(TriggerSpec::Cron(trigger));
    }

    pub fn clear_trigger(&mut self) {
        self.trigger = None;
    }

    pub fn with_trigger(mut self, trigger: TriggerSpec) -> Self {
        self.trigger = Some(trigger);
        self
    }
}

// ── Wire form ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleRequestWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    action_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    job_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    input_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    job_parameters: BTreeMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    simple_job_trigger: Option<SimpleJobTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    complex_job_trigger: Option<ComplexJobTrigger>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cron_job_trigger: Option<CronJobTrigger>,
}

impl TryFrom<ScheduleRequestWire> for ScheduleRequest {
    type Error = RequestError;

    fn try_from(wire: ScheduleRequestWire) -> Result<Self, Self::Error> {
        let mut present = Vec::new();
        if wire.simple_job_trigger.is_some() {
            present.push("simpleJobTrigger");
        }
        if wire.complex_job_trigger.is_some() {
            present.push("complexJobTrigger");
        }
        if wire.cron_job_trigger.is_some() {
            present.push("cronJobTrigger");
        }
        if present.len() > 1 {
            return Err(RequestError::ConflictingTriggers(present.join(", ")));
        }

        let trigger = wire
            .simple_job_trigger
            .map(TriggerSpec::Simple)
            .or(wire.complex_job_trigger.map(TriggerSpec::Complex))
            .or(wire.cron_job_trigger.map(TriggerSpec::Cron));

        Ok(Self {
            action_id: wire.action_id,
            job_name: wire.job_name,
            input_file: wire.input_file,
            output_file: wire.output_file,
            time_zone: wire.time_zone,
            duration: wire.duration,
            job_parameters: wire.job_parameters,
            trigger,
        })
    }
}

impl From<ScheduleRequest> for ScheduleRequestWire {
    fn from(req: ScheduleRequest) -> Self {
        let mut wire = Self {
            action_id: req.action_id,
            job_name: req.job_name,
            input_file: req.input_file,
            output_file: req.output_file,
            time_zone: req.time_zone,
            duration: req.duration,
            job_parameters: req.job_parameters,
            ..Self::default()
        };
        match req.trigger {
            Some(TriggerSpec::Simple(t)) => wire.simple_job_trigger = Some(t),
            Some(TriggerSpec::Complex(t)) => wire.complex_job_trigger = Some(t),
            Some(TriggerSpec::Cron(t)) => wire.cron_job_trigger = Some(t),
            None => {}
        }
        wire
    }
}
