//! Query-side contracts for the group-by stage: the subtree input shape and
//! the caller-supplied execution limits.

mod config;
mod subgraph;

pub use config::GroupedExecutionConfig;
pub use subgraph::{AggregateChild, ChildGraph, GroupKeyChild, GroupKeySource, SubGraph};
