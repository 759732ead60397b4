//! Subcommand implementations. Each returns a serializable report.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::info;

use schedkit_core::{Config, ScheduleRequest};
use schedkit_trigger::{
    BlockStatus, BlockoutEvaluator, BlockoutWindow, CalendarClock, OutputPathResolver, OutputSource,
    Owner, Trigger, TriggerNormalizer,
};

use crate::local::{JsonSettingsStore, LocalFileService};

pub fn load_request(path: &Path) -> Result<ScheduleRequest> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read request {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("failed to parse request {}", path.display()))
}

fn normalizer(config: &Config) -> Result<TriggerNormalizer> {
    TriggerNormalizer::from_config(&config.scheduler).context("invalid scheduler configuration")
}

// ── normalize ───────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeReport {
    pub trigger: Trigger,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron_expression: Option<String>,
    pub next_fires: Vec<DateTime<Utc>>,
}

pub fn normalize(
    config: &Config,
    request: &Path,
    now: DateTime<Utc>,
    fires: usize,
) -> Result<NormalizeReport> {
    let req = load_request(request)?;
    let trigger = normalizer(config)?
        .normalize_at(&req, now)
        .with_context(|| format!("cannot normalize {}", request.display()))?;

    let clock = CalendarClock::new();
    let horizon = Duration::try_days(i64::from(config.blockout.horizon_days))
        .and_then(|days| now.checked_add_signed(days))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    let next_fires = BlockoutEvaluator::new(&[], &clock).fire_times(&trigger, now, fires, horizon)?;

    Ok(NormalizeReport {
        cron_expression: trigger.cron_expression(),
        trigger,
        next_fires,
    })
}

// ── check ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub at: DateTime<Utc>,
    pub blockouts: Vec<String>,
    /// Whether a job executing at `at` passes the blockout gate.
    pub should_fire: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub will_fire: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BlockStatus>,
}

fn blockout_id(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("blockout")
        .to_string()
}

pub fn check(
    config: &Config,
    request: Option<&Path>,
    blockouts: &[PathBuf],
    at: DateTime<Utc>,
) -> Result<CheckReport> {
    let normalizer = normalizer(config)?;
    let windows = blockouts
        .iter()
        .map(|path| {
            let req = load_request(path)?;
            BlockoutWindow::from_request(blockout_id(path), &req, &normalizer, at)
                .with_context(|| format!("invalid blockout {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;
    info!(count = windows.len(), "loaded blockouts");

    let clock = CalendarClock::new();
    let evaluator = BlockoutEvaluator::with_config(&windows, &clock, &config.blockout);
    let should_fire = evaluator.should_fire_at(at)?;

    let (will_fire, status) = match request {
        Some(path) => {
            let trigger = normalizer
                .normalize_at(&load_request(path)?, at)
                .with_context(|| format!("cannot normalize {}", path.display()))?;
            (
                Some(evaluator.will_fire_after(&trigger, at)?),
                Some(evaluator.block_status_after(&trigger, at)?),
            )
        }
        None => (None, None),
    };

    Ok(CheckReport {
        at,
        blockouts: evaluator
            .blockouts()
            .iter()
            .map(|w| w.id().to_string())
            .collect(),
        should_fire,
        will_fire,
        status,
    })
}

// ── resolve-output ──────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputReport {
    pub owner: String,
    pub source: OutputSource,
    pub folder: String,
    pub path: String,
}

pub fn resolve_output(
    config: &Config,
    request: &Path,
    owner: &str,
    root: &Path,
    settings: Option<&Path>,
) -> Result<OutputReport> {
    let req = load_request(request)?;
    let settings = match settings {
        Some(path) => JsonSettingsStore::load(path)?,
        None => JsonSettingsStore::default(),
    };
    let files = LocalFileService::new(root);
    let owner = Owner::new(owner);

    let resolver = OutputPathResolver::new(&files, &settings, config.output.clone());
    let found = resolver
        .resolve(&req, &owner)
        .with_context(|| format!("cannot resolve output for {}", request.display()))?;

    Ok(OutputReport {
        owner: owner.to_string(),
        path: found.path(),
        source: found.source,
        folder: found.folder,
    })
}
