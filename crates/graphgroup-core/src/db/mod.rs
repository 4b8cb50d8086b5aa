//! Graph-query group-by: input subtree contract, execution, and grouped output.

pub mod executor;
pub mod query;
pub mod response;
pub(crate) mod uid;

// re-exports
pub use executor::{is_aggregator_fn, process_group_by};
pub use query::{
    AggregateChild, ChildGraph, GroupKeyChild, GroupKeySource, GroupedExecutionConfig, SubGraph,
};
pub use response::{GroupPair, GroupResult, GroupResults};
pub use uid::Uid;
