//! Module: executor::aggregate::error
//! Responsibility: aggregate and grouped-execution error taxonomy.
//! Does not own: executor orchestration.
//! Boundary: typed errors shared by accumulators, the driver, and the former.

use crate::{db::executor::aggregate::AggregateKind, error::InternalError};
use thiserror::Error as ThisError;

///
/// AggregateError
///
/// An accumulator could not produce a value for one group.
/// The driver omits the aggregate instead of failing the stage.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub(in crate::db) enum AggregateError {
    #[error("{kind} aggregate received no usable input values")]
    NoValues { kind: AggregateKind },

    #[error("{kind} aggregate produced a non-finite result")]
    NonFinite { kind: AggregateKind },
}

///
/// GroupError
///
/// GroupError is the typed grouped-execution error surface.
/// This taxonomy keeps grouped memory-limit failures explicit and prevents
/// grouped resource guardrails from degrading into generic internal errors.
///

#[derive(Debug, ThisError)]
pub(in crate::db) enum GroupError {
    #[error(
        "grouped execution memory limit exceeded ({resource}): attempted={attempted}, limit={limit}"
    )]
    MemoryLimitExceeded {
        resource: &'static str,
        attempted: u64,
        limit: u64,
    },

    #[error("{0}")]
    Internal(#[from] InternalError),
}

impl From<GroupError> for InternalError {
    fn from(err: GroupError) -> Self {
        match err {
            GroupError::MemoryLimitExceeded { .. } => {
                Self::executor_resource_exhausted(err.to_string())
            }
            GroupError::Internal(inner) => inner,
        }
    }
}
