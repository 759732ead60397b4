use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

fn profiled_env_u32(profile: &str, key: &str, default: u32) -> u32 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_i64(profile: &str, key: &str, default: i64) -> i64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    match profiled_env_opt(profile, key) {
        Some(v) => matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes" | "on"),
        None => default,
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub scheduler: SchedulerConfig,
    pub blockout: BlockoutConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `SCHEDKIT_PROFILE` env var. When set (e.g. `PROD`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("SCHEDKIT_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            scheduler: SchedulerConfig::from_env_profiled(p),
            blockout: BlockoutConfig::from_env_profiled(p),
            output: OutputConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  scheduler:  default_tz={}, run_now_delay={}s",
            self.scheduler.default_time_zone,
            self.scheduler.run_now_delay_secs
        );
        tracing::info!(
            "  blockout:   sample_limit={}, horizon_days={}",
            self.blockout.sample_limit,
            self.blockout.horizon_days
        );
        tracing::info!(
            "  output:     fallback={}, home_root={}",
            self.output.fallback_enabled,
            self.output.home_root
        );
    }
}

// ── Scheduler ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Zone stamped onto triggers whose request names none.
    pub default_time_zone: String,
    /// Offset for synthesized run-once triggers so the engine sees a future fire time.
    pub run_now_delay_secs: i64,
}

impl SchedulerConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            default_time_zone: profiled_env_or(p, "SCHEDULER_DEFAULT_TIMEZONE", "UTC"),
            run_now_delay_secs: profiled_env_i64(p, "SCHEDULER_RUN_NOW_DELAY_SECS", 10),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_time_zone: "UTC".to_string(),
            run_now_delay_secs: 10,
        }
    }
}

// ── Blockouts ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockoutConfig {
    /// Max fire instants sampled when checking for a partial block.
    pub sample_limit: u32,
    /// Calendar days after the reference instant covered by sampling.
    pub horizon_days: u32,
}

impl BlockoutConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            sample_limit: profiled_env_u32(p, "BLOCKOUT_SAMPLE_LIMIT", 500),
            horizon_days: profiled_env_u32(p, "BLOCKOUT_HORIZON_DAYS", 366),
        }
    }
}

impl Default for BlockoutConfig {
    fn default() -> Self {
        Self {
            sample_limit: 500,
            horizon_days: 366,
        }
    }
}

// ── Output location ───────────────────────────────────────────

pub const DEFAULT_OUTPUT_SETTING_KEY: &str = "default-scheduler-output-path";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// When false, an invalid requested folder is an error instead of a fallback.
    pub fallback_enabled: bool,
    pub user_setting_key: String,
    pub system_setting_key: String,
    /// Parent of per-owner home folders.
    pub home_root: String,
}

impl OutputConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            fallback_enabled: profiled_env_bool(p, "OUTPUT_FALLBACK_ENABLED", true),
            user_setting_key: profiled_env_or(p, "OUTPUT_USER_SETTING_KEY", DEFAULT_OUTPUT_SETTING_KEY),
            system_setting_key: profiled_env_or(
                p,
                "OUTPUT_SYSTEM_SETTING_KEY",
                DEFAULT_OUTPUT_SETTING_KEY,
            ),
            home_root: profiled_env_or(p, "OUTPUT_HOME_ROOT", "/home"),
        }
    }

    /// Home folder of `owner` in the repository namespace.
    pub fn home_folder(&self, owner: &str) -> String {
        format!("{}/{}", self.home_root.trim_end_matches('/'), owner)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            fallback_enabled: true,
            user_setting_key: DEFAULT_OUTPUT_SETTING_KEY.to_string(),
            system_setting_key: DEFAULT_OUTPUT_SETTING_KEY.to_string(),
            home_root: "/home".to_string(),
        }
    }
}
