//! Module: db::executor
//! Responsibility: runtime execution of the group-by stage.
//! Does not own: subtree construction or result serialization.
//! Boundary: exposes `process_group_by` to the surrounding query executor.

pub(in crate::db) mod aggregate;
mod context;
mod group;

pub(in crate::db) use context::{ExecutionConfig, ExecutionContext};

// re-exports
pub use aggregate::is_aggregator_fn;
pub use group::process_group_by;
