//! Module: db::uid
//! Responsibility: entity identifiers and sorted identifier-list primitives.
//! Does not own: grouping policy or bucket construction.
//! Boundary: list helpers shared by the group former and orderer.

///
/// Uid
///
/// Raw entity identifier. Ordering is plain numeric order.
///

pub type Uid = u64;

/// Sort ascending and drop duplicates in place.
pub(crate) fn sort_dedup(uids: &mut Vec<Uid>) {
    uids.sort_unstable();
    uids.dedup();
}

/// Return true when `uids` is strictly ascending.
#[cfg(test)]
#[must_use]
pub(crate) fn is_strictly_sorted(uids: &[Uid]) -> bool {
    uids.windows(2).all(|pair| pair[0] < pair[1])
}

/// Intersect two ascending uid lists.
///
/// Both inputs must be sorted ascending. The output is sorted ascending and
/// never repeats an identifier, even when an input does.
#[must_use]
pub(crate) fn intersect_sorted(left: &[Uid], right: &[Uid]) -> Vec<Uid> {
    let mut out = Vec::with_capacity(left.len().min(right.len()));
    let (mut i, mut j) = (0, 0);

    while i < left.len() && j < right.len() {
        let (l, r) = (left[i], right[j]);
        if l == r {
            if out.last() != Some(&l) {
                out.push(l);
            }
            i += 1;
            j += 1;
        } else if l < r {
            i += 1;
        } else {
            j += 1;
        }
    }

    out
}

/// Wrapping sum of all identifiers, used as the last ordering tie-break.
#[must_use]
pub(crate) fn wrapping_sum(uids: &[Uid]) -> Uid {
    uids.iter().fold(0, |acc, uid| acc.wrapping_add(*uid))
}

///
/// TESTS
///
