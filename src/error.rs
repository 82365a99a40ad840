use std::collections::TryReserveError;

use thiserror::Error;

use crate::MAX_ARGS;

/// Describes a filter database error.
///
/// Every error is reported before the stored policy is touched, or after it
/// has been left in a consistent state; no error is retried internally.
#[derive(Debug, Error)]
pub enum FiltronError {
    #[error("rule tests {0} arguments, the maximum is {MAX_ARGS}")]
    TooManyPredicates(usize),
    #[error("argument index {0} is out of range")]
    ArgOutOfRange(u32),
    #[error("duplicate predicate for argument {0}")]
    DuplicateArg(u32),
    #[error("allocation failed while storing the rule")]
    OutOfMemory(#[from] TryReserveError),
    #[error("decision tree invariant violated")]
    Internal,
}
