//! [`BlockoutWindow`]: a trigger plus the span each of its fires blocks.

use chrono::{DateTime, Duration, Utc};
use schedkit_core::ScheduleRequest;
use serde::Serialize;

use super::BlockoutError;
use crate::normalizer::TriggerNormalizer;
use crate::trigger::{Trigger, TriggerTag};

/// An administrator-defined blackout period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockoutWindow {
    id: String,
    trigger: Trigger,
    duration_ms: i64,
}

impl BlockoutWindow {
    /// Wrap `trigger` as a blockout; the trigger is re-tagged `BLOCKOUT`.
    pub fn new(
        id: impl Into<String>,
        trigger: Trigger,
        duration: Duration,
    ) -> Result<Self, BlockoutError> {
        let id = id.into();
        let duration_ms = duration.num_milliseconds();
        if duration_ms <= 0 {
            return Err(BlockoutError::InvalidDuration { id, duration_ms });
        }
        Ok(Self {
            id,
            trigger: trigger.with_tag(TriggerTag::Blockout),
            duration_ms,
        })
    }

    /// Normalize a blockout request; its `duration` (ms) is required.
    pub fn from_request(
        id: impl Into<String>,
        request: &ScheduleRequest,
        normalizer: &TriggerNormalizer,
        now: DateTime<Utc>,
    ) -> Result<Self, BlockoutError> {
        let id = id.into();
        let duration_ms = request
            .duration
            .ok_or_else(|| BlockoutError::MissingDuration { id: id.clone() })?;
        let trigger = normalizer
            .normalize_at(request, now)
            .map_err(|source| BlockoutError::Normalize {
                id: id.clone(),
                source,
            })?;
        let duration = Duration::try_milliseconds(duration_ms)
            .ok_or_else(|| BlockoutError::InvalidDuration {
                id: id.clone(),
                duration_ms,
            })?;
        Self::new(id, trigger, duration)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn duration(&self) -> Duration {
        Duration::try_milliseconds(self.duration_ms).unwrap_or(Duration::MAX)
    }
}
