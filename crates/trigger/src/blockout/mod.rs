//! Blockout conflict evaluation.
//!
//! A [`BlockoutWindow`] forbids fires in `[fire, fire + duration)` for every
//! fire instant of its own trigger. The [`BlockoutEvaluator`] checks candidate
//! triggers (or "now") against a read-only snapshot of windows and reports
//! whether they will fire, and whether some or all of their fires collide.

mod evaluator;
mod window;

#[cfg(test)]
mod tests;

use serde::Serialize;

use crate::clock::OracleError;
use crate::normalizer::NormalizeError;

pub use self::evaluator::BlockoutEvaluator;
pub use self::window::BlockoutWindow;

/// Errors raised while building windows or evaluating conflicts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockoutError {
    #[error("blockout '{id}' has no duration")]
    MissingDuration { id: String },

    #[error("blockout '{id}' duration must be positive, got {duration_ms}ms")]
    InvalidDuration { id: String, duration_ms: i64 },

    #[error("blockout '{id}' request is malformed: {source}")]
    Normalize {
        id: String,
        #[source]
        source: NormalizeError,
    },

    /// The oracle could not compute a fire time; never read as blocked or unblocked.
    #[error("cannot compute fire times for {subject}: {source}")]
    Oracle {
        subject: String,
        #[source]
        source: OracleError,
    },
}

/// Conflict verdict for a trigger against the current blockouts.
///
/// The two flags are independent: a trigger whose next fire is blocked is
/// totally blocked even if later fires escape, and may be partially blocked too.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStatus {
    pub partially_blocked: bool,
    pub totally_blocked: bool,
}
