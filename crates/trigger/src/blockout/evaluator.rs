//! [`BlockoutEvaluator`]: will-fire and partial/total block verdicts.

use chrono::{DateTime, Duration, Utc};
use schedkit_core::config::BlockoutConfig;
use tracing::{debug, warn};

use super::{BlockStatus, BlockoutError, BlockoutWindow};
use crate::clock::FireTimeOracle;
use crate::trigger::Trigger;

/// Evaluates triggers against a snapshot of blockout windows.
///
/// The evaluator never mutates the windows; the caller owns the set and
/// hands in a consistent snapshot.
pub struct BlockoutEvaluator<'a, O: FireTimeOracle + ?Sized> {
    blockouts: &'a [BlockoutWindow],
    oracle: &'a O,
    sample_limit: usize,
    horizon: Duration,
}

impl<'a, O: FireTimeOracle + ?Sized> BlockoutEvaluator<'a, O> {
    pub fn new(blockouts: &'a [BlockoutWindow], oracle: &'a O) -> Self {
        Self::with_config(blockouts, oracle, &BlockoutConfig::default())
    }

    pub fn with_config(
        blockouts: &'a [BlockoutWindow],
        oracle: &'a O,
        config: &BlockoutConfig,
    ) -> Self {
        Self {
            blockouts,
            oracle,
            sample_limit: config.sample_limit as usize,
            horizon: Duration::try_days(i64::from(config.horizon_days)).unwrap_or(Duration::MAX),
        }
    }

    pub fn blockouts(&self) -> &[BlockoutWindow] {
        self.blockouts
    }

    // ── Instants ────────────────────────────────────────────────

    /// Whether any window covers `instant`.
    pub fn is_blocked_at(&self, instant: DateTime<Utc>) -> Result<bool, BlockoutError> {
        for window in self.blockouts {
            if self.window_contains(window, instant)? {
                debug!(blockout = window.id(), at = %instant, "instant is blocked");
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// `instant` lies in `[fire, fire + duration)` for some fire of `window`.
    fn window_contains(
        &self,
        window: &BlockoutWindow,
        instant: DateTime<Utc>,
    ) -> Result<bool, BlockoutError> {
        let probe = instant
            .checked_sub_signed(window.duration())
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let fire = self
            .oracle
            .next_fire_time(window.trigger(), probe)
            .map_err(|source| {
                warn!(blockout = window.id(), error = %source, "blockout fire time unavailable");
                BlockoutError::Oracle {
                    subject: format!("blockout '{}'", window.id()),
                    source,
                }
            })?;
        Ok(fire.is_some_and(|fire| fire <= instant))
    }

    fn next_fire(
        &self,
        trigger: &Trigger,
        after: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, BlockoutError> {
        self.oracle.next_fire_time(trigger, after).map_err(|source| {
            warn!(kind = trigger.kind(), error = %source, "trigger fire time unavailable");
            BlockoutError::Oracle {
                subject: format!("{} trigger", trigger.kind()),
                source,
            }
        })
    }

    // ── Will fire ───────────────────────────────────────────────

    pub fn will_fire(&self, trigger: &Trigger) -> Result<bool, BlockoutError> {
        self.will_fire_after(trigger, Utc::now())
    }

    /// Whether the trigger's next fire after `now` escapes every window.
    ///
    /// A trigger with no further fires will not fire.
    pub fn will_fire_after(
        &self,
        trigger: &Trigger,
        now: DateTime<Utc>,
    ) -> Result<bool, BlockoutError> {
        match self.next_fire(trigger, now)? {
            Some(fire) => Ok(!self.is_blocked_at(fire)?),
            None => Ok(false),
        }
    }

    pub fn should_fire_now(&self) -> Result<bool, BlockoutError> {
        self.should_fire_at(Utc::now())
    }

    /// Final gate before executing a job: `at` treated as a one-shot fire.
    pub fn should_fire_at(&self, at: DateTime<Utc>) -> Result<bool, BlockoutError> {
        Ok(!self.is_blocked_at(at)?)
    }

    // ── Partial / total ─────────────────────────────────────────

    /// Up to `limit` fire instants strictly after `after` and no later than `until`.
    pub fn fire_times(
        &self,
        trigger: &Trigger,
        after: DateTime<Utc>,
        limit: usize,
        until: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, BlockoutError> {
        let mut fires = Vec::new();
        let mut cursor = after;
        while fires.len() < limit {
            match self.next_fire(trigger, cursor)? {
                Some(fire) if fire <= until && fire > cursor => {
                    fires.push(fire);
                    cursor = fire;
                }
                _ => break,
            }
        }
        Ok(fires)
    }

    fn sampled_fires(
        &self,
        trigger: &Trigger,
        now: DateTime<Utc>,
    ) -> Result<Vec<DateTime<Utc>>, BlockoutError> {
        let until = now
            .checked_add_signed(self.horizon)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.fire_times(trigger, now, self.sample_limit, until)
    }

    pub fn is_partially_blocked(&self, trigger: &Trigger) -> Result<bool, BlockoutError> {
        self.is_partially_blocked_after(trigger, Utc::now())
    }

    /// Some, but not all, sampled fires after `now` fall inside a window.
    pub fn is_partially_blocked_after(
        &self,
        trigger: &Trigger,
        now: DateTime<Utc>,
    ) -> Result<bool, BlockoutError> {
        let fires = self.sampled_fires(trigger, now)?;
        let mut blocked = 0usize;
        for fire in &fires {
            if self.is_blocked_at(*fire)? {
                blocked += 1;
            }
        }
        debug!(
            kind = trigger.kind(),
            sampled = fires.len(),
            blocked,
            "partial block check"
        );
        Ok(blocked > 0 && blocked < fires.len())
    }

    pub fn block_status(&self, trigger: &Trigger) -> Result<BlockStatus, BlockoutError> {
        self.block_status_after(trigger, Utc::now())
    }

    pub fn block_status_after(
        &self,
        trigger: &Trigger,
        now: DateTime<Utc>,
    ) -> Result<BlockStatus, BlockoutError> {
        Ok(BlockStatus {
            partially_blocked: self.is_partially_blocked_after(trigger, now)?,
            totally_blocked: !self.will_fire_after(trigger, now)?,
        })
    }

    // ── New blockouts ───────────────────────────────────────────

    /// Ids of scheduled jobs with at least one sampled fire inside `candidate`.
    ///
    /// Used before saving a new blockout, independently of the current set.
    pub fn will_block_schedules<'t, I>(
        &self,
        candidate: &BlockoutWindow,
        schedules: I,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, BlockoutError>
    where
        I: IntoIterator<Item = (&'t str, &'t Trigger)>,
    {
        let mut blocked = Vec::new();
        for (id, trigger) in schedules {
            for fire in self.sampled_fires(trigger, now)? {
                if self.window_contains(candidate, fire)? {
                    blocked.push(id.to_string());
                    break;
                }
            }
        }
        Ok(blocked)
    }
}
