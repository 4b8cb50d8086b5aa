//! Metrics sink boundary.
//!
//! Executor logic MUST NOT depend on obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between execution logic
//! and the thread-local metrics state.
use crate::{obs::metrics, value::ValueTag};
use std::{cell::RefCell, time::Instant};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn MetricsSink>> = RefCell::new(None);
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent<'a> {
    GroupByStart {
        attr: &'a str,
    },
    GroupByFinish {
        attr: &'a str,
        ok: bool,
        groups: u64,
        members: u64,
        micros: u64,
    },
    IndexValueSkipped {
        attr: &'a str,
        tag: ValueTag,
    },
    AggregateInputSkipped {
        attr: &'a str,
        inputs: u64,
    },
    AggregateOmitted {
        attr: &'a str,
    },
    BranchPruned {
        depth: usize,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent<'_>);
}

/// GlobalMetricsSink
/// Default thread-local sink that writes into the metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent<'_>) {
        match event {
            MetricsEvent::GroupByStart { .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.group_by_calls = m.ops.group_by_calls.saturating_add(1);
                });
            }

            MetricsEvent::GroupByFinish {
                ok,
                groups,
                members,
                micros,
                ..
            } => {
                metrics::with_state_mut(|m| {
                    if ok {
                        m.ops.groups_emitted = m.ops.groups_emitted.saturating_add(groups);
                        m.ops.members_grouped = m.ops.members_grouped.saturating_add(members);
                    } else {
                        m.ops.group_by_failures = m.ops.group_by_failures.saturating_add(1);
                    }
                    metrics::add_duration(
                        &mut m.perf.group_by_micros_total,
                        &mut m.perf.group_by_micros_max,
                        micros,
                    );
                });
            }

            MetricsEvent::IndexValueSkipped { attr, .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.index_values_skipped = m.ops.index_values_skipped.saturating_add(1);
                    metrics::bump_attribute(m, attr, |entry| {
                        entry.index_values_skipped = entry.index_values_skipped.saturating_add(1);
                    });
                });
            }

            MetricsEvent::AggregateInputSkipped { attr, inputs } => {
                metrics::with_state_mut(|m| {
                    m.ops.aggregate_inputs_skipped =
                        m.ops.aggregate_inputs_skipped.saturating_add(inputs);
                    metrics::bump_attribute(m, attr, |entry| {
                        entry.aggregate_inputs_skipped =
                            entry.aggregate_inputs_skipped.saturating_add(inputs);
                    });
                });
            }

            MetricsEvent::AggregateOmitted { attr } => {
                metrics::with_state_mut(|m| {
                    m.ops.aggregates_omitted = m.ops.aggregates_omitted.saturating_add(1);
                    metrics::bump_attribute(m, attr, |entry| {
                        entry.aggregates_omitted = entry.aggregates_omitted.saturating_add(1);
                    });
                });
            }

            MetricsEvent::BranchPruned { .. } => {
                metrics::with_state_mut(|m| {
                    m.ops.branches_pruned = m.ops.branches_pruned.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent<'_>) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // Preconditions:
        // - `ptr` was produced from a valid `&dyn MetricsSink` in `with_metrics_sink`.
        // - `with_metrics_sink` always restores the previous pointer before returning,
        //   including unwind paths via `Guard::drop`.
        // - `record` is synchronous and never stores `ptr` beyond this call.
        //
        // Aliasing:
        // - Only a shared reference is materialized, matching the shared borrow
        //   used to install the override.
        //
        // What would break this:
        // - If `with_metrics_sink` failed to restore on all exits (normal + panic),
        //   `ptr` could outlive the borrowed sink and become dangling.
        unsafe { (&*ptr).record(event) };
    } else {
        GLOBAL_METRICS_SINK.record(event);
    }
}

/// Snapshot the current metrics state for reporting and tests.
///
/// `window_start_ms` filters by window start (`EventState::window_start_ms`),
/// not by per-event timestamps.
#[must_use]
pub fn metrics_report(window_start_ms: Option<u64>) -> metrics::EventReport {
    metrics::report_window_start(window_start_ms)
}

/// Reset all metrics state (counters + perf).
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override.
pub fn with_metrics_sink<T>(sink: &dyn MetricsSink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn MetricsSink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // Preconditions:
    // - `sink_ptr` is installed only for this dynamic scope.
    // - `Guard` always restores the previous slot on all exits, including panic.
    // - `record` only dereferences synchronously and never persists `sink_ptr`.
    //
    // What would break this:
    // - Any deferred use of `sink_ptr` beyond this scope.
    // - Any path that bypasses Guard restoration.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn MetricsSink, *const dyn MetricsSink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| {
        let mut slot = cell.borrow_mut();
        slot.replace(sink_ptr)
    });
    let _guard = Guard(prev);

    f()
}

/// Span
/// RAII guard that emits start/finish metrics events for one stage run.
/// Finish accounting happens even on early return or unwind.

pub(crate) struct Span<'a> {
    attr: &'a str,
    started: Instant,
    output: Option<(u64, u64)>,
}

impl<'a> Span<'a> {
    #[must_use]
    pub(crate) fn new(attr: &'a str) -> Self {
        record(MetricsEvent::GroupByStart { attr });

        Self {
            attr,
            started: Instant::now(),
            output: None,
        }
    }

    /// Mark the run successful with its output shape.
    pub(crate) const fn set_output(&mut self, groups: u64, members: u64) {
        self.output = Some((groups, members));
    }
}

impl Drop for Span<'_> {
    fn drop(&mut self) {
        let micros = u64::try_from(self.started.elapsed().as_micros()).unwrap_or(u64::MAX);
        let (groups, members) = self.output.unwrap_or_default();

        record(MetricsEvent::GroupByFinish {
            attr: self.attr,
            ok: self.output.is_some(),
            groups,
            members,
            micros,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSink<'a> {
        calls: &'a AtomicUsize,
    }

    impl MetricsSink for CountingSink<'_> {
        fn record(&self, _: MetricsEvent<'_>) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn with_metrics_sink_routes_and_restores_nested_overrides() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });

        let outer_calls = AtomicUsize::new(0);
        let inner_calls = AtomicUsize::new(0);
        let outer = CountingSink {
            calls: &outer_calls,
        };
        let inner = CountingSink {
            calls: &inner_calls,
        };

        // No override installed yet.
        record(MetricsEvent::BranchPruned { depth: 0 });
        assert_eq!(outer_calls.load(Ordering::SeqCst), 0);
        assert_eq!(inner_calls.load(Ordering::SeqCst), 0);

        with_metrics_sink(&outer, || {
            record(MetricsEvent::BranchPruned { depth: 1 });
            assert_eq!(outer_calls.load(Ordering::SeqCst), 1);
            assert_eq!(inner_calls.load(Ordering::SeqCst), 0);

            with_metrics_sink(&inner, || {
                record(MetricsEvent::AggregateOmitted { attr: "weight" });
            });

            // Inner override was restored to outer override.
            record(MetricsEvent::BranchPruned { depth: 2 });
        });

        assert_eq!(outer_calls.load(Ordering::SeqCst), 2);
        assert_eq!(inner_calls.load(Ordering::SeqCst), 1);

        // Outer override was restored to previous (none).
        SINK_OVERRIDE.with(|cell| {
            assert!(cell.borrow().is_none());
        });
    }

    #[test]
    fn with_metrics_sink_restores_override_on_panic() {
        SINK_OVERRIDE.with(|cell| {
            *cell.borrow_mut() = None;
        });

        let calls = AtomicUsize::new(0);
        let sink = CountingSink { calls: &calls };

        let panicked = catch_unwind(AssertUnwindSafe(|| {
            with_metrics_sink(&sink, || {
                record(MetricsEvent::BranchPruned { depth: 0 });
                panic!("intentional panic for guard test");
            });
        }))
        .is_err();
        assert!(panicked);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Guard restored TLS slot after unwind.
        SINK_OVERRIDE.with(|cell| {
            assert!(cell.borrow().is_none());
        });
    }

    #[test]
    fn metrics_report_without_window_start_returns_counters() {
        metrics_reset_all();
        record(MetricsEvent::BranchPruned { depth: 1 });

        let counters = metrics_report(None)
            .counters
            .expect("metrics report should include counters without window filter");
        assert_eq!(counters.ops.branches_pruned, 1);
    }

    #[test]
    fn metrics_report_window_start_after_window_returns_empty() {
        metrics_reset_all();
        let window_start = metrics::with_state(|m| m.window_start_ms);
        record(MetricsEvent::BranchPruned { depth: 1 });

        let report = metrics_report(Some(window_start.saturating_add(1)));
        assert!(report.counters.is_none());
        assert!(report.attribute_counters.is_empty());
    }

    #[test]
    fn skip_events_accumulate_per_attribute() {
        metrics_reset_all();

        record(MetricsEvent::IndexValueSkipped {
            attr: "color",
            tag: ValueTag::Null,
        });
        record(MetricsEvent::AggregateInputSkipped {
            attr: "weight",
            inputs: 3,
        });
        record(MetricsEvent::AggregateOmitted { attr: "weight" });

        let counters = metrics_report(None)
            .counters
            .expect("metrics report should include counters");
        assert_eq!(counters.ops.index_values_skipped, 1);
        assert_eq!(counters.ops.aggregate_inputs_skipped, 3);
        assert_eq!(counters.ops.aggregates_omitted, 1);

        let weight = counters
            .attributes
            .get("weight")
            .expect("weight counters should be present");
        assert_eq!(weight.aggregate_inputs_skipped, 3);
        assert_eq!(weight.aggregates_omitted, 1);
    }

    #[test]
    fn span_reports_failure_when_output_is_never_set() {
        metrics_reset_all();

        {
            let _span = Span::new("friend");
        }
        {
            let mut span = Span::new("friend");
            span.set_output(2, 5);
        }

        let counters = metrics_report(None)
            .counters
            .expect("metrics report should include counters");
        assert_eq!(counters.ops.group_by_calls, 2);
        assert_eq!(counters.ops.group_by_failures, 1);
        assert_eq!(counters.ops.groups_emitted, 2);
        assert_eq!(counters.ops.members_grouped, 5);
    }
}
