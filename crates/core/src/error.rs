use thiserror::Error;

/// Violations of the schedule-request wire contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// More than one of `simpleJobTrigger`, `complexJobTrigger`, `cronJobTrigger` was set.
    #[error("schedule request carries more than one trigger shape: {0}")]
    ConflictingTriggers(String),
}
