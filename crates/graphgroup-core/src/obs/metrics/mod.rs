use serde::{Deserialize, Serialize};
use std::{cell::RefCell, cmp::Ordering, collections::BTreeMap};
use time::OffsetDateTime;

///
/// EventState
/// Ephemeral, in-memory counters and simple timing totals for group-by runs.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub perf: EventPerf,
    pub attributes: BTreeMap<String, AttributeCounters>,
    pub window_start_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            perf: EventPerf::default(),
            attributes: BTreeMap::new(),
            window_start_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Stage entrypoints
    pub group_by_calls: u64,
    pub group_by_failures: u64,

    // Output shape
    pub groups_emitted: u64,
    pub members_grouped: u64,
    pub branches_pruned: u64,

    // Lenient skips
    pub index_values_skipped: u64,
    pub aggregate_inputs_skipped: u64,
    pub aggregates_omitted: u64,
}

///
/// AttributeCounters
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AttributeCounters {
    pub index_values_skipped: u64,
    pub aggregate_inputs_skipped: u64,
    pub aggregates_omitted: u64,
}

impl AttributeCounters {
    const fn total_skipped(&self) -> u64 {
        self.index_values_skipped
            .saturating_add(self.aggregate_inputs_skipped)
            .saturating_add(self.aggregates_omitted)
    }
}

///
/// Perf
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventPerf {
    // Wall-clock microseconds per stage run
    pub group_by_micros_total: u128,
    pub group_by_micros_max: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all event state: counters, perf, and per-attribute counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Accumulate a duration sample and track a max.
pub(crate) fn add_duration(total: &mut u128, max: &mut u64, delta: u64) {
    *total = total.saturating_add(u128::from(delta));
    if delta > *max {
        *max = delta;
    }
}

/// Bump one per-attribute counter, creating the entry on first sight.
pub(crate) fn bump_attribute(
    m: &mut EventState,
    attr: &str,
    f: impl FnOnce(&mut AttributeCounters),
) {
    if let Some(entry) = m.attributes.get_mut(attr) {
        f(entry);
    } else {
        let mut entry = AttributeCounters::default();
        f(&mut entry);
        m.attributes.insert(attr.to_string(), entry);
    }
}

fn now_millis() -> u64 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;

    u64::try_from(millis).unwrap_or(0)
}

///
/// EventReport
/// Event/counter report for one metrics window.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    /// Ephemeral runtime counters since `window_start_ms`.
    pub counters: Option<EventState>,
    /// Per-attribute skip counters, noisiest first.
    pub attribute_counters: Vec<AttributeSummary>,
}

///
/// AttributeSummary
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AttributeSummary {
    pub attr: String,
    pub index_values_skipped: u64,
    pub aggregate_inputs_skipped: u64,
    pub aggregates_omitted: u64,
    pub skip_share: f64,
}

/// Build a metrics report for the current window, or an empty one when the
/// requested window starts after it.
#[must_use]
pub(crate) fn report_window_start(window_start_ms: Option<u64>) -> EventReport {
    let snap = with_state(Clone::clone);
    if window_start_ms.is_some_and(|requested| requested > snap.window_start_ms) {
        return EventReport::default();
    }

    report_from(snap)
}

#[allow(clippy::cast_precision_loss)]
fn report_from(snap: EventState) -> EventReport {
    let all_skipped = snap
        .attributes
        .values()
        .map(AttributeCounters::total_skipped)
        .fold(0u64, u64::saturating_add);

    let mut attribute_counters: Vec<AttributeSummary> = snap
        .attributes
        .iter()
        .map(|(attr, counters)| AttributeSummary {
            attr: attr.clone(),
            index_values_skipped: counters.index_values_skipped,
            aggregate_inputs_skipped: counters.aggregate_inputs_skipped,
            aggregates_omitted: counters.aggregates_omitted,
            skip_share: if all_skipped > 0 {
                counters.total_skipped() as f64 / all_skipped as f64
            } else {
                0.0
            },
        })
        .collect();

    attribute_counters.sort_by(|a, b| {
        match b
            .skip_share
            .partial_cmp(&a.skip_share)
            .unwrap_or(Ordering::Equal)
        {
            Ordering::Equal => a.attr.cmp(&b.attr),
            other => other,
        }
    });

    EventReport {
        counters: Some(snap),
        attribute_counters,
    }
}

///
/// TESTS
///

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn reset_all_clears_state() {
        with_state_mut(|m| {
            m.ops.group_by_calls = 3;
            m.ops.branches_pruned = 2;
            m.perf.group_by_micros_max = 9;
            m.attributes.insert(
                "color".to_string(),
                AttributeCounters {
                    index_values_skipped: 1,
                    ..Default::default()
                },
            );
        });

        reset_all();

        with_state(|m| {
            assert_eq!(m.ops.group_by_calls, 0);
            assert_eq!(m.ops.branches_pruned, 0);
            assert_eq!(m.perf.group_by_micros_max, 0);
            assert!(m.attributes.is_empty());
        });
    }

    #[test]
    fn report_sorts_attributes_by_skip_share() {
        reset_all();
        with_state_mut(|m| {
            m.attributes.insert(
                "color".to_string(),
                AttributeCounters {
                    index_values_skipped: 1,
                    ..Default::default()
                },
            );
            m.attributes.insert(
                "weight".to_string(),
                AttributeCounters {
                    aggregate_inputs_skipped: 2,
                    aggregates_omitted: 1,
                    ..Default::default()
                },
            );
            m.attributes.insert(
                "age".to_string(),
                AttributeCounters {
                    index_values_skipped: 1,
                    ..Default::default()
                },
            );
        });

        let report = report_window_start(None);
        let attrs: Vec<_> = report
            .attribute_counters
            .iter()
            .map(|a| a.attr.as_str())
            .collect();

        // Order by skip share desc, then attribute name asc.
        assert_eq!(attrs, ["weight", "age", "color"]);
        assert_eq!(report.attribute_counters[0].skip_share, 0.6);
        assert_eq!(report.attribute_counters[1].skip_share, 0.2);
    }

    #[test]
    fn add_duration_tracks_total_and_max() {
        let (mut total, mut max) = (0u128, 0u64);
        add_duration(&mut total, &mut max, 7);
        add_duration(&mut total, &mut max, 3);

        assert_eq!(total, 10);
        assert_eq!(max, 7);
    }
}
