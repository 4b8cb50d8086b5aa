//! Module: executor::group::form
//! Responsibility: combine per-attribute buckets into non-empty groups.
//! Does not own: bucket construction, aggregation, or output ordering.
//! Boundary: reads a sealed `GroupAttributeIndex`, charges every materialized
//! group against the execution budget.

use crate::{
    db::{
        Uid,
        executor::{
            ExecutionContext,
            aggregate::GroupError,
            group::index::{GroupAttributeIndex, ValueBucket},
        },
        response::{GroupPair, GroupResult},
        uid::intersect_sorted,
    },
    obs::sink::{self, MetricsEvent},
};

///
/// GroupFormer
///
/// Backtracking walk over the index buckets in attribute order.
/// Each branch owns its candidate list; only the key stack is shared, and it
/// is restored before the next sibling runs.
///

struct GroupFormer<'a> {
    buckets: &'a [ValueBucket],
    context: &'a mut ExecutionContext,
    keys: Vec<GroupPair>,
    groups: Vec<GroupResult>,
}

impl GroupFormer<'_> {
    fn descend(&mut self, depth: usize, candidates: &[Uid]) -> Result<(), GroupError> {
        let buckets = self.buckets;
        let Some(bucket) = buckets.get(depth) else {
            return self.materialize(candidates);
        };

        for entry in bucket.entries() {
            let next = if depth == 0 {
                entry.uids().to_vec()
            } else {
                intersect_sorted(candidates, entry.uids())
            };

            if next.is_empty() {
                sink::record(MetricsEvent::BranchPruned { depth });
                continue;
            }

            self.keys.push(GroupPair::new(bucket.attr(), entry.value().clone()));
            let result = self.descend(depth + 1, &next);
            self.keys.pop();
            result?;
        }

        Ok(())
    }

    fn materialize(&mut self, members: &[Uid]) -> Result<(), GroupError> {
        self.context.record_new_group(self.keys.len(), members.len())?;
        self.groups.push(GroupResult::new(self.keys.clone(), members.to_vec()));

        Ok(())
    }
}

/// Form every key combination whose member intersection is non-empty.
///
/// An index with no buckets yields no groups; the keyless group is the
/// orchestrator's decision.
pub(in crate::db) fn form_groups(
    index: &GroupAttributeIndex,
    context: &mut ExecutionContext,
) -> Result<Vec<GroupResult>, GroupError> {
    if index.is_empty() {
        return Ok(Vec::new());
    }

    let mut former = GroupFormer {
        buckets: index.buckets(),
        context,
        keys: Vec::with_capacity(index.buckets().len()),
        groups: Vec::new(),
    };
    former.descend(0, &[])?;

    Ok(former.groups)
}

///
/// TESTS
///
