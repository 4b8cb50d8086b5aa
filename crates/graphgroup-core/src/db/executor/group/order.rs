//! Module: executor::group::order
//! Responsibility: the total order over formed groups.
//! Does not own: group formation or aggregate computation.
//! Boundary: last step before the result set is attached to the subtree.
//!
//! Precedence: key count, aggregate count, member count, keys by position,
//! aggregates by position, members by position, member sum. Groups equal on
//! all of these are indistinguishable and fail the stage.

use crate::{
    db::{
        response::{GroupPair, GroupResult},
        uid::wrapping_sum,
    },
    error::InternalError,
    value::{CompareError, Value, less},
};
use std::cmp::Ordering;
use tracing::error;

/// Compare two groups under the output order.
pub(in crate::db) fn group_cmp(
    a: &GroupResult,
    b: &GroupResult,
) -> Result<Ordering, InternalError> {
    let ordering = a
        .keys
        .len()
        .cmp(&b.keys.len())
        .then_with(|| a.aggregates.len().cmp(&b.aggregates.len()))
        .then_with(|| a.uids.len().cmp(&b.uids.len()))
        .then_with(|| pairs_cmp(&a.keys, &b.keys))
        .then_with(|| pairs_cmp(&a.aggregates, &b.aggregates))
        .then_with(|| a.uids.cmp(&b.uids))
        .then_with(|| wrapping_sum(&a.uids).cmp(&wrapping_sum(&b.uids)));

    if ordering == Ordering::Equal {
        return Err(InternalError::executor_invariant(format!(
            "grouped output contains indistinguishable groups: keys={:?} uids={:?}",
            a.keys, a.uids
        )));
    }

    Ok(ordering)
}

/// Sort groups in place under `group_cmp`.
///
/// The first indistinguishable pair aborts the stage; it is logged and
/// returned, never dropped.
pub(in crate::db) fn sort_groups(groups: &mut [GroupResult]) -> Result<(), InternalError> {
    let mut failure: Option<InternalError> = None;

    groups.sort_by(|a, b| match group_cmp(a, b) {
        Ok(ordering) => ordering,
        Err(err) => {
            failure.get_or_insert(err);
            Ordering::Equal
        }
    });

    if let Some(err) = failure {
        error!(error = %err.display_with_class(), "group ordering invariant violated");
        return Err(err);
    }

    Ok(())
}

// First position whose values are ordered decides.
fn pairs_cmp(a: &[GroupPair], b: &[GroupPair]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(l, r)| value_cmp(&l.key, &r.key))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

// Two-sided `less`; values of different kinds fall back to their stable tag.
// Skipping to the next position instead is not transitive across mixed kinds.
fn value_cmp(l: &Value, r: &Value) -> Ordering {
    match less(l, r) {
        Ok(true) => Ordering::Less,
        Ok(false) => match less(r, l) {
            Ok(true) => Ordering::Greater,
            _ => Ordering::Equal,
        },
        Err(CompareError::Incomparable { left, right }) => left.cmp(&right),
    }
}

///
/// TESTS
///
