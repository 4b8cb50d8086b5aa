//! Module: executor::aggregate::driver
//! Responsibility: compute every aggregation child's value for one group.
//! Does not own: group formation, output ordering, or accumulator math.
//! Boundary: called once per materialized group by the stage orchestrator.

use crate::{
    db::{
        Uid,
        executor::aggregate::{AggregateKind, AggregateState, ApplyOutcome},
        query::AggregateChild,
        response::{GroupPair, GroupResult},
    },
    obs::sink::{self, MetricsEvent},
    value::{Value, coerce},
};
use std::borrow::Cow;
use tracing::trace;

const COUNT_LABEL: &str = "count";

///
/// AggregateSource
///
/// One aggregation child's `(uid, value)` pairs, ascending by uid so group
/// members can be located by binary search.
///

struct AggregateSource<'a> {
    uids: Cow<'a, [Uid]>,
    values: Cow<'a, [Value]>,
}

impl<'a> AggregateSource<'a> {
    fn from_child(child: &'a AggregateChild) -> Self {
        if child.src_uids.is_sorted() {
            return Self {
                uids: Cow::Borrowed(&child.src_uids),
                values: Cow::Borrowed(&child.values),
            };
        }

        let mut pairs: Vec<(Uid, &Value)> = child
            .src_uids
            .iter()
            .copied()
            .zip(child.values.iter())
            .collect();
        pairs.sort_by_key(|(uid, _)| *uid);

        let (uids, values): (Vec<Uid>, Vec<Value>) = pairs
            .into_iter()
            .map(|(uid, value)| (uid, value.clone()))
            .unzip();

        Self {
            uids: Cow::Owned(uids),
            values: Cow::Owned(values),
        }
    }

    fn lookup(&self, uid: Uid) -> Option<&Value> {
        self.uids
            .binary_search(&uid)
            .ok()
            .and_then(|pos| self.values.get(pos))
    }
}

///
/// AggregatePlan
///

enum AggregatePlan<'a> {
    Count,
    Function {
        kind: AggregateKind,
        attr: &'a str,
        label: String,
        source: AggregateSource<'a>,
    },
}

impl<'a> AggregatePlan<'a> {
    // Children that are neither count nor a recognized function contribute nothing.
    fn resolve(child: &'a AggregateChild) -> Option<Self> {
        if child.do_count {
            return Some(Self::Count);
        }

        let kind = child.src_func.as_deref().and_then(AggregateKind::parse)?;

        Some(Self::Function {
            kind,
            attr: &child.attr,
            label: kind.label(&child.attr),
            source: AggregateSource::from_child(child),
        })
    }
}

///
/// AggregateDriver
///
/// AggregateDriver resolves the subtree's aggregation children once and then
/// appends their results onto each group in child order.
///

pub(in crate::db) struct AggregateDriver<'a> {
    plans: Vec<AggregatePlan<'a>>,
}

impl<'a> AggregateDriver<'a> {
    #[must_use]
    pub(in crate::db) fn new(children: impl IntoIterator<Item = &'a AggregateChild>) -> Self {
        Self {
            plans: children
                .into_iter()
                .filter_map(AggregatePlan::resolve)
                .collect(),
        }
    }

    /// Return true when no child will contribute an aggregate.
    #[must_use]
    pub(in crate::db) const fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Append one aggregate per contributing child onto `group`.
    pub(in crate::db) fn aggregate_group(&self, group: &mut GroupResult) {
        for plan in &self.plans {
            match plan {
                AggregatePlan::Count => {
                    let count = i64::try_from(group.uids.len()).unwrap_or(i64::MAX);
                    group
                        .aggregates
                        .push(GroupPair::new(COUNT_LABEL, Value::Int(count)));
                }
                AggregatePlan::Function {
                    kind,
                    attr,
                    label,
                    source,
                } => {
                    if let Some(value) = fold_members(*kind, attr, source, &group.uids) {
                        group.aggregates.push(GroupPair::new(label.clone(), value));
                    }
                }
            }
        }
    }
}

// Members absent from the source are not inputs; values that fail coercion or
// that the accumulator rejects are skipped.
fn fold_members(
    kind: AggregateKind,
    attr: &str,
    source: &AggregateSource<'_>,
    members: &[Uid],
) -> Option<Value> {
    let target = kind.coercion_target();
    let mut state = AggregateState::new(kind);
    let mut skipped = 0u64;

    for value in members.iter().filter_map(|uid| source.lookup(*uid)) {
        let accepted = coerce(value, target)
            .is_some_and(|coerced| state.apply(coerced) == ApplyOutcome::Accepted);
        if !accepted {
            skipped = skipped.saturating_add(1);
        }
    }

    if skipped > 0 {
        trace!(attr, func = %kind, skipped, "aggregate inputs skipped");
        sink::record(MetricsEvent::AggregateInputSkipped {
            attr,
            inputs: skipped,
        });
    }

    match state.finalize() {
        Ok(value) => Some(value),
        Err(err) => {
            trace!(attr, error = %err, "aggregate omitted");
            sink::record(MetricsEvent::AggregateOmitted { attr });
            None
        }
    }
}

///
/// TESTS
///
