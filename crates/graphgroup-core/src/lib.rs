//! Core runtime for GraphGroup: the GROUP BY stage of graph-query execution,
//! its typed values, and the observability hooks it reports through.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod db;
pub mod error;
pub mod obs;
pub mod types;
pub mod value;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, or metrics plumbing are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{
            AggregateChild, ChildGraph, GroupKeyChild, GroupKeySource, GroupPair, GroupResult,
            GroupResults, SubGraph, Uid,
        },
        value::Value,
    };
}
