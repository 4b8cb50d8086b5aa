//! Module: query::subgraph
//! Responsibility: the query subtree shape consumed by the group-by stage.
//! Does not own: tree construction, attribute resolution, or value decoding.
//! Boundary: filled in by the surrounding executor, read by `executor::group`.

use crate::{
    db::{Uid, executor::is_aggregator_fn, response::GroupResults},
    error::InternalError,
    value::Value,
};

///
/// SubGraph
///
/// One query subtree evaluated with a group-by directive.
/// `src_uids` is the parent entity universe the children were expanded from.
///

#[derive(Clone, Debug, Default)]
pub struct SubGraph {
    pub attr: String,
    pub src_uids: Vec<Uid>,
    pub children: Vec<ChildGraph>,
    pub(crate) groupby_result: Option<GroupResults>,
}

impl SubGraph {
    #[must_use]
    pub fn new(attr: impl Into<String>, src_uids: Vec<Uid>) -> Self {
        Self {
            attr: attr.into(),
            src_uids,
            children: Vec::new(),
            groupby_result: None,
        }
    }

    /// Append one child subtree.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<ChildGraph>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Borrow the grouped result attached by the last successful stage run.
    #[must_use]
    pub const fn groupby_result(&self) -> Option<&GroupResults> {
        self.groupby_result.as_ref()
    }

    /// Detach the grouped result for serialization.
    pub const fn take_groupby_result(&mut self) -> Option<GroupResults> {
        self.groupby_result.take()
    }

    pub(crate) fn group_key_children(&self) -> impl Iterator<Item = &GroupKeyChild> {
        self.children.iter().filter_map(|child| match child {
            ChildGraph::GroupKey(child) => Some(child),
            ChildGraph::Aggregate(_) => None,
        })
    }

    pub(crate) fn aggregate_children(&self) -> impl Iterator<Item = &AggregateChild> {
        self.children.iter().filter_map(|child| match child {
            ChildGraph::Aggregate(child) => Some(child),
            ChildGraph::GroupKey(_) => None,
        })
    }
}

///
/// ChildGraph
///
/// One child of a grouped subtree, pre-classified as a grouping key or an
/// aggregation.
///

#[derive(Clone, Debug)]
pub enum ChildGraph {
    GroupKey(GroupKeyChild),
    Aggregate(AggregateChild),
}

impl ChildGraph {
    #[must_use]
    pub const fn is_group_key(&self) -> bool {
        matches!(self, Self::GroupKey(_))
    }

    #[must_use]
    pub fn attr(&self) -> &str {
        match self {
            Self::GroupKey(child) => &child.attr,
            Self::Aggregate(child) => &child.attr,
        }
    }
}

impl From<GroupKeyChild> for ChildGraph {
    fn from(child: GroupKeyChild) -> Self {
        Self::GroupKey(child)
    }
}

impl From<AggregateChild> for ChildGraph {
    fn from(child: AggregateChild) -> Self {
        Self::Aggregate(child)
    }
}

///
/// GroupKeySource
///
/// Per-parent payload of a grouping child, aligned with its `src_uids`.
///

#[derive(Clone, Debug)]
pub enum GroupKeySource {
    /// Identifier-valued attribute: row `i` lists the entities parent `i` references.
    Uids(Vec<Vec<Uid>>),
    /// Value attribute: entry `i` is the value parent `i` holds.
    Values(Vec<Value>),
}

impl GroupKeySource {
    const fn rows(&self) -> usize {
        match self {
            Self::Uids(matrix) => matrix.len(),
            Self::Values(values) => values.len(),
        }
    }
}

///
/// GroupKeyChild
///

#[derive(Clone, Debug)]
pub struct GroupKeyChild {
    pub attr: String,
    pub src_uids: Vec<Uid>,
    pub source: GroupKeySource,
}

impl GroupKeyChild {
    /// Build an identifier-valued grouping child.
    #[must_use]
    pub fn uids(attr: impl Into<String>, src_uids: Vec<Uid>, matrix: Vec<Vec<Uid>>) -> Self {
        Self {
            attr: attr.into(),
            src_uids,
            source: GroupKeySource::Uids(matrix),
        }
    }

    /// Build a value grouping child.
    #[must_use]
    pub fn values(attr: impl Into<String>, src_uids: Vec<Uid>, values: Vec<Value>) -> Self {
        Self {
            attr: attr.into(),
            src_uids,
            source: GroupKeySource::Values(values),
        }
    }

    /// Reject payloads that reference parents missing from `src_uids`.
    pub(crate) fn validate_alignment(&self) -> Result<(), InternalError> {
        let rows = self.source.rows();
        if rows > self.src_uids.len() {
            return Err(InternalError::query_invariant(format!(
                "group key child '{}' has {rows} payload rows for {} parent uids",
                self.attr,
                self.src_uids.len()
            )));
        }

        Ok(())
    }
}

///
/// AggregateChild
///
/// One aggregation child: `values[i]` belongs to entity `src_uids[i]`.
/// `src_uids` is expected ascending; unsorted input is re-sorted before use.
///

#[derive(Clone, Debug, Default)]
pub struct AggregateChild {
    pub attr: String,
    pub src_uids: Vec<Uid>,
    pub values: Vec<Value>,
    pub src_func: Option<String>,
    pub do_count: bool,
}

impl AggregateChild {
    /// Build a `count` aggregation child.
    #[must_use]
    pub fn count(attr: impl Into<String>) -> Self {
        Self {
            attr: attr.into(),
            do_count: true,
            ..Self::default()
        }
    }

    /// Build a function aggregation child over `(src_uids[i], values[i])` pairs.
    #[must_use]
    pub fn function(
        func: impl Into<String>,
        attr: impl Into<String>,
        src_uids: Vec<Uid>,
        values: Vec<Value>,
    ) -> Self {
        Self {
            attr: attr.into(),
            src_uids,
            values,
            src_func: Some(func.into()),
            do_count: false,
        }
    }

    /// Reject value lists that are not parallel to `src_uids`.
    ///
    /// Only children that will be read are checked; count children and
    /// unrecognized functions contribute nothing.
    pub(crate) fn validate_alignment(&self) -> Result<(), InternalError> {
        if self.do_count || !self.src_func.as_deref().is_some_and(is_aggregator_fn) {
            return Ok(());
        }
        if self.values.len() != self.src_uids.len() {
            return Err(InternalError::query_invariant(format!(
                "aggregate child '{}' has {} values for {} source uids",
                self.attr,
                self.values.len(),
                self.src_uids.len()
            )));
        }

        Ok(())
    }
}
