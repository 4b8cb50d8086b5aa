
use crate::{
    db::{
        Uid,
        executor::group::process_group_by,
        query::{AggregateChild, GroupKeyChild, GroupedExecutionConfig, SubGraph},
        response::GroupResults,
    },
    error::{ErrorClass, ErrorOrigin},
    obs::{MetricsEvent, MetricsSink, with_metrics_sink},
    value::Value,
};
use std::cell::RefCell;

///
/// RecordingSink
///

#[derive(Default)]
struct RecordingSink {
    events: RefCell<Vec<&'static str>>,
}

impl RecordingSink {
    fn count(&self, name: &str) -> usize {
        self.events.borrow().iter().filter(|e| **e == name).count()
    }
}

impl MetricsSink for RecordingSink {
    fn record(&self, event: MetricsEvent<'_>) {
        let name = match event {
            MetricsEvent::GroupByStart { .. } => "start",
            MetricsEvent::GroupByFinish { ok: true, .. } => "finish",
            MetricsEvent::GroupByFinish { ok: false, .. } => "failed",
            MetricsEvent::IndexValueSkipped { .. } => "index_skip",
            MetricsEvent::AggregateInputSkipped { .. } => "input_skip",
            MetricsEvent::AggregateOmitted { .. } => "omitted",
            MetricsEvent::BranchPruned { .. } => "pruned",
        };
        self.events.borrow_mut().push(name);
    }
}

fn texts(values: &[&str]) -> Vec<Value> {
    values.iter().map(|v| Value::from(*v)).collect()
}

fn run(mut subgraph: SubGraph) -> GroupResults {
    process_group_by(&mut subgraph, None).expect("group-by should succeed");
    subgraph
        .take_groupby_result()
        .expect("successful run attaches a result")
}

fn color_subgraph() -> SubGraph {
    SubGraph::new("people", vec![1, 2, 3, 4])
        .with_child(GroupKeyChild::values(
            "color",
            vec![1, 2, 3, 4],
            texts(&["red", "red", "blue", "blue"]),
        ))
        .with_child(AggregateChild::count("uid"))
}

#[test]
fn counts_per_color_in_key_order() {
    let results = run(color_subgraph());

    assert_eq!(results.len(), 2);
    let blue = &results.groups[0];
    assert_eq!(blue.key("color"), Some(&Value::from("blue")));
    assert_eq!(blue.aggregate("count"), Some(&Value::Int(2)));
    assert_eq!(blue.uids, vec![3, 4]);

    let red = &results.groups[1];
    assert_eq!(red.key("color"), Some(&Value::from("red")));
    assert_eq!(red.aggregate("count"), Some(&Value::Int(2)));
    assert_eq!(red.uids, vec![1, 2]);
}

#[test]
fn two_attributes_split_into_singletons() {
    let subgraph = SubGraph::new("people", vec![5, 6])
        .with_child(GroupKeyChild::values("color", vec![5, 6], texts(&["red", "red"])))
        .with_child(GroupKeyChild::values("size", vec![5, 6], texts(&["S", "M"])));
    let results = run(subgraph);

    assert_eq!(results.len(), 2);
    let sizes: Vec<_> = results.iter().map(|g| g.key("size").cloned()).collect();
    assert_eq!(sizes, [Some(Value::from("M")), Some(Value::from("S"))]);
    let members: Vec<_> = results.iter().map(|g| g.uids.clone()).collect();
    assert_eq!(members, [vec![6], vec![5]]);
}

#[test]
fn sum_uses_only_members_with_a_weight() {
    let subgraph = SubGraph::new("parcels", vec![1, 2, 3])
        .with_child(GroupKeyChild::values(
            "dest",
            vec![1, 2, 3],
            texts(&["north", "north", "north"]),
        ))
        .with_child(AggregateChild::function(
            "sum",
            "weight",
            vec![1, 3],
            vec![Value::Int(4), Value::Int(6)],
        ));
    let results = run(subgraph);

    assert_eq!(results.len(), 1);
    assert_eq!(results.groups[0].aggregate("sum(weight)"), Some(&Value::Int(10)));
}

#[test]
fn identifier_attribute_groups_by_referencing_entity() {
    let subgraph = SubGraph::new("people", vec![1, 2, 3])
        .with_child(GroupKeyChild::uids(
            "friend",
            vec![1, 2, 3],
            vec![vec![10, 11], vec![10], vec![12]],
        ))
        .with_child(AggregateChild::count("uid"));
    let results = run(subgraph);

    assert_eq!(results.len(), 3);
    for (group, parent) in results.iter().zip([1, 2, 3]) {
        assert_eq!(group.uids, vec![parent]);
        assert_eq!(group.aggregate("count"), Some(&Value::Int(1)));
    }
    assert_eq!(results.groups[0].key("friend"), Some(&Value::Uid(10)));
    assert_eq!(results.groups[2].key("friend"), Some(&Value::Uid(12)));
}

#[test]
fn disjoint_combinations_are_pruned_not_emitted() {
    let sink = RecordingSink::default();
    let subgraph = SubGraph::new("people", vec![1, 2])
        .with_child(GroupKeyChild::values("color", vec![1, 2], texts(&["red", "blue"])))
        .with_child(GroupKeyChild::values("size", vec![1, 2], texts(&["S", "M"])));

    let results = with_metrics_sink(&sink, || run(subgraph));

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|g| !g.uids.is_empty()));
    assert_eq!(sink.count("pruned"), 2);
    assert_eq!(sink.count("finish"), 1);
}

#[test]
fn keyless_group_spans_the_parent_universe() {
    let subgraph = SubGraph::new("people", vec![3, 1, 3, 2])
        .with_child(AggregateChild::count("uid"))
        .with_child(AggregateChild::function(
            "max",
            "age",
            vec![1, 2, 3],
            vec![Value::Int(30), Value::Int(50), Value::Int(40)],
        ));
    let results = run(subgraph);

    assert_eq!(results.len(), 1);
    let group = &results.groups[0];
    assert!(group.keys.is_empty());
    assert_eq!(group.uids, vec![1, 2, 3]);
    assert_eq!(group.aggregate("count"), Some(&Value::Int(3)));
    assert_eq!(group.aggregate("max(age)"), Some(&Value::Int(50)));
}

#[test]
fn no_grouping_and_no_aggregates_yields_empty_result() {
    let results = run(SubGraph::new("people", vec![1, 2]));

    assert!(results.is_empty());
}

#[test]
fn keyless_subtree_with_only_unrecognized_functions_yields_empty_result() {
    let subgraph = SubGraph::new("people", vec![1, 2]).with_child(AggregateChild::function(
        "median",
        "age",
        vec![1, 2],
        vec![Value::Int(30), Value::Int(40)],
    ));

    assert!(run(subgraph).is_empty());
}

#[test]
fn keyless_subtree_without_parents_yields_empty_result() {
    let subgraph = SubGraph::new("people", Vec::new()).with_child(AggregateChild::count("uid"));

    assert!(run(subgraph).is_empty());
}

#[test]
fn grouping_children_without_usable_values_yield_no_groups() {
    let sink = RecordingSink::default();
    let subgraph = SubGraph::new("people", vec![1, 2])
        .with_child(GroupKeyChild::values(
            "photo",
            vec![1, 2],
            vec![Value::Null, Value::Blob(vec![0xff])],
        ))
        .with_child(AggregateChild::count("uid"));

    let results = with_metrics_sink(&sink, || run(subgraph));

    assert!(results.is_empty());
    assert_eq!(sink.count("index_skip"), 2);
}

#[test]
fn omitted_aggregates_leave_other_aggregates_intact() {
    let sink = RecordingSink::default();
    let subgraph = color_subgraph().with_child(AggregateChild::function(
        "avg",
        "score",
        vec![1, 2],
        vec![Value::from("n/a"), Value::Int(8)],
    ));

    let results = with_metrics_sink(&sink, || run(subgraph));

    let blue = &results.groups[0];
    assert_eq!(blue.aggregates.len(), 1);
    let red = &results.groups[1];
    assert_eq!(red.aggregate("avg(score)"), Value::from_f64(8.0).as_ref());
    assert_eq!(sink.count("omitted"), 1);
    assert_eq!(sink.count("input_skip"), 1);
}

#[test]
fn misaligned_child_fails_before_grouping() {
    let mut subgraph = SubGraph::new("people", vec![1])
        .with_child(GroupKeyChild::values("color", vec![1], texts(&["red", "blue"])));

    let err = process_group_by(&mut subgraph, None).expect_err("payload outruns parents");

    assert_eq!(err.class, ErrorClass::InvariantViolation);
    assert_eq!(err.origin, ErrorOrigin::Query);
    assert!(subgraph.groupby_result().is_none());
}

#[test]
fn misaligned_aggregate_child_fails() {
    let mut subgraph = color_subgraph().with_child(AggregateChild::function(
        "sum",
        "weight",
        vec![1, 2],
        vec![Value::Int(1)],
    ));

    let err = process_group_by(&mut subgraph, None).expect_err("values not parallel to uids");
    assert!(err.is_invariant_violation());
}

#[test]
fn unrecognized_function_child_is_not_validated() {
    let subgraph = color_subgraph().with_child(AggregateChild::function(
        "median",
        "weight",
        vec![1, 2],
        vec![Value::Int(1)],
    ));
    let results = run(subgraph);

    assert_eq!(results, run(color_subgraph()));
    assert!(results.iter().all(|group| group.aggregate("median(weight)").is_none()));
}

#[test]
fn group_limit_surfaces_resource_exhaustion() {
    let sink = RecordingSink::default();
    let mut subgraph = color_subgraph();
    let config = GroupedExecutionConfig::with_hard_limits(1, u64::MAX);

    let err = with_metrics_sink(&sink, || process_group_by(&mut subgraph, Some(config)))
        .expect_err("two groups exceed a one-group limit");

    assert_eq!(err.class, ErrorClass::ResourceExhausted);
    assert!(subgraph.groupby_result().is_none());
    assert_eq!(sink.count("failed"), 1);
}

#[test]
fn failed_rerun_clears_previous_result() {
    let mut subgraph = color_subgraph();
    process_group_by(&mut subgraph, None).expect("first run succeeds");
    assert!(subgraph.groupby_result().is_some());

    let config = GroupedExecutionConfig::with_hard_limits(1, u64::MAX);
    process_group_by(&mut subgraph, Some(config)).expect_err("second run exceeds the limit");
    assert!(subgraph.groupby_result().is_none());
}

#[test]
fn rerun_is_idempotent() {
    let mut subgraph = color_subgraph();
    process_group_by(&mut subgraph, None).expect("first run");
    let first = subgraph.take_groupby_result();
    process_group_by(&mut subgraph, None).expect("second run");

    assert_eq!(first, subgraph.take_groupby_result());
}

#[test]
fn result_serializes_keys_aggregates_and_members() {
    let results = run(color_subgraph());
    let json = serde_json::to_value(&results).expect("results serialize");

    let first = &json["groups"][0];
    assert_eq!(first["keys"][0]["attr"], "color");
    assert_eq!(first["keys"][0]["key"]["Text"], "blue");
    assert_eq!(first["aggregates"][0]["attr"], "count");
    assert_eq!(first["aggregates"][0]["key"]["Int"], 2);
    assert_eq!(first["uids"], serde_json::json!([3, 4]));
}

#[test]
fn members_are_sorted_even_when_parents_are_not() {
    let subgraph = SubGraph::new("people", vec![9, 4, 7])
        .with_child(GroupKeyChild::values("team", vec![9, 4, 7], texts(&["x", "x", "x"])));
    let results = run(subgraph);

    let uids: &[Uid] = &results.groups[0].uids;
    assert_eq!(uids, &[4, 7, 9]);
}
