//! Module: executor::group
//! Responsibility: the group-by stage for one query subtree.
//! Does not own: child classification, value decoding, or accumulator math.
//! Boundary: `process_group_by` is the only entrypoint; everything else here
//! is per-run scratch state.

mod form;
mod index;
mod order;

#[cfg(test)]
mod tests;

use crate::{
    db::{
        executor::{
            ExecutionConfig, ExecutionContext,
            aggregate::{AggregateDriver, GroupError},
        },
        query::{ChildGraph, GroupedExecutionConfig, SubGraph},
        response::{GroupResult, GroupResults},
        uid::sort_dedup,
    },
    error::InternalError,
    obs::sink::Span,
};
use tracing::debug;

use form::form_groups;
use index::GroupAttributeIndex;
use order::sort_groups;

/// Run the group-by stage over `subgraph` and attach the ordered result.
///
/// `config` overrides the default grouped hard limits. On failure the
/// subtree is left without a grouped result.
pub fn process_group_by(
    subgraph: &mut SubGraph,
    config: Option<GroupedExecutionConfig>,
) -> Result<(), InternalError> {
    subgraph.groupby_result = None;

    let mut span = Span::new(&subgraph.attr);
    let results = group_subgraph(subgraph, ExecutionConfig::from_planner_config(config))?;

    let members = results
        .iter()
        .map(|group| group.uids.len() as u64)
        .fold(0u64, u64::saturating_add);
    span.set_output(results.len() as u64, members);
    debug!(
        attr = %subgraph.attr,
        groups = results.len(),
        members,
        "group-by finished"
    );

    subgraph.groupby_result = Some(results);

    Ok(())
}

fn group_subgraph(
    subgraph: &SubGraph,
    config: ExecutionConfig,
) -> Result<GroupResults, InternalError> {
    validate_children(subgraph)?;

    let mut context = ExecutionContext::new(config);
    let driver = AggregateDriver::new(subgraph.aggregate_children());

    let mut groups = if subgraph.group_key_children().next().is_none() {
        keyless_group(subgraph, &driver, &mut context)?
    } else {
        let index = GroupAttributeIndex::from_children(subgraph.group_key_children());
        form_groups(&index, &mut context)?
    };

    for group in &mut groups {
        driver.aggregate_group(group);
    }
    sort_groups(&mut groups)?;

    let budget = context.budget();
    debug!(
        groups = budget.groups(),
        estimated_bytes = budget.estimated_bytes(),
        max_groups = context.config().max_groups(),
        max_group_bytes = context.config().max_group_bytes(),
        "grouped budget usage"
    );

    Ok(GroupResults { groups })
}

fn validate_children(subgraph: &SubGraph) -> Result<(), InternalError> {
    for child in &subgraph.children {
        match child {
            ChildGraph::GroupKey(child) => child.validate_alignment()?,
            ChildGraph::Aggregate(child) => child.validate_alignment()?,
        }
    }

    Ok(())
}

// With no grouping attribute, aggregates run over the whole parent universe.
// The group exists only when some child will actually aggregate.
fn keyless_group(
    subgraph: &SubGraph,
    driver: &AggregateDriver<'_>,
    context: &mut ExecutionContext,
) -> Result<Vec<GroupResult>, GroupError> {
    if driver.is_empty() || subgraph.src_uids.is_empty() {
        return Ok(Vec::new());
    }

    let mut members = subgraph.src_uids.clone();
    sort_dedup(&mut members);
    context.record_new_group(0, members.len())?;

    Ok(vec![GroupResult::new(Vec::new(), members)])
}
