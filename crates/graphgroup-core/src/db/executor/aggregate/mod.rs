//! Module: executor::aggregate
//! Responsibility: per-group aggregate computation over aggregation children.
//! Does not own: group formation or output ordering.
//! Boundary: the stage orchestrator drives `AggregateDriver` once per group.

mod driver;
mod error;
mod kind;
mod state;

pub(in crate::db) use driver::AggregateDriver;
pub(in crate::db) use error::{AggregateError, GroupError};
pub(in crate::db) use kind::AggregateKind;
pub use kind::is_aggregator_fn;
pub(in crate::db) use state::{AggregateState, ApplyOutcome};
