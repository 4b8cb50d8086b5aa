//! Module: executor::context
//! Responsibility: grouped hard limits and budget accounting for one stage run.
//! Does not own: group formation or aggregation semantics.
//! Boundary: policy consumed by the group former as groups materialize.

use crate::db::{
    Uid,
    executor::aggregate::GroupError,
    query::GroupedExecutionConfig,
    response::{GroupPair, GroupResult},
};

///
/// ExecutionBudget
///
/// ExecutionBudget tracks grouped-execution resource usage counters.
/// `groups` is a structural counter; `estimated_bytes` is a conservative
/// allocation estimate used for memory guardrails.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(in crate::db) struct ExecutionBudget {
    groups: u64,
    estimated_bytes: u64,
}

impl ExecutionBudget {
    #[must_use]
    pub(in crate::db) const fn groups(&self) -> u64 {
        self.groups
    }

    #[must_use]
    pub(in crate::db) const fn estimated_bytes(&self) -> u64 {
        self.estimated_bytes
    }

    fn record_new_group(
        &mut self,
        config: &ExecutionConfig,
        key_count: usize,
        uid_count: usize,
    ) -> Result<(), GroupError> {
        let next_groups = self.groups.saturating_add(1);
        if next_groups > config.max_groups() {
            return Err(GroupError::MemoryLimitExceeded {
                resource: "groups",
                attempted: next_groups,
                limit: config.max_groups(),
            });
        }

        let next_bytes = self
            .estimated_bytes
            .saturating_add(estimated_group_bytes(key_count, uid_count));
        if next_bytes > config.max_group_bytes() {
            return Err(GroupError::MemoryLimitExceeded {
                resource: "estimated_bytes",
                attempted: next_bytes,
                limit: config.max_group_bytes(),
            });
        }

        self.groups = next_groups;
        self.estimated_bytes = next_bytes;

        Ok(())
    }
}

///
/// ExecutionConfig
///
/// ExecutionConfig defines hard grouped-execution limits.
/// Limits stay policy-owned at executor boundaries instead of inside the
/// group former so memory policy remains centralized.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(in crate::db) struct ExecutionConfig {
    max_groups: u64,
    max_group_bytes: u64,
}

impl ExecutionConfig {
    /// Build one grouped hard-limit configuration.
    #[must_use]
    pub(in crate::db) const fn with_hard_limits(max_groups: u64, max_group_bytes: u64) -> Self {
        Self {
            max_groups,
            max_group_bytes,
        }
    }

    /// Build one unbounded grouped configuration for tests.
    #[cfg(test)]
    #[must_use]
    pub(in crate::db) const fn unbounded() -> Self {
        Self::with_hard_limits(u64::MAX, u64::MAX)
    }

    /// Resolve executor limits from optional caller config.
    #[must_use]
    pub(in crate::db) const fn from_planner_config(
        planner_config: Option<GroupedExecutionConfig>,
    ) -> Self {
        let config = match planner_config {
            Some(config) => config,
            None => GroupedExecutionConfig::conservative(),
        };

        Self::with_hard_limits(config.max_groups(), config.max_group_bytes())
    }

    #[must_use]
    pub(in crate::db) const fn max_groups(&self) -> u64 {
        self.max_groups
    }

    #[must_use]
    pub(in crate::db) const fn max_group_bytes(&self) -> u64 {
        self.max_group_bytes
    }
}

///
/// ExecutionContext
///
/// ExecutionContext carries grouped execution policy plus mutable budget
/// usage for exactly one stage run.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(in crate::db) struct ExecutionContext {
    config: ExecutionConfig,
    budget: ExecutionBudget,
}

impl ExecutionContext {
    #[must_use]
    pub(in crate::db) const fn new(config: ExecutionConfig) -> Self {
        Self {
            config,
            budget: ExecutionBudget {
                groups: 0,
                estimated_bytes: 0,
            },
        }
    }

    #[must_use]
    pub(in crate::db) const fn config(&self) -> &ExecutionConfig {
        &self.config
    }

    #[must_use]
    pub(in crate::db) const fn budget(&self) -> &ExecutionBudget {
        &self.budget
    }

    /// Charge one materialized group against the hard limits.
    pub(in crate::db) fn record_new_group(
        &mut self,
        key_count: usize,
        uid_count: usize,
    ) -> Result<(), GroupError> {
        self.budget.record_new_group(&self.config, key_count, uid_count)
    }
}

fn estimated_group_bytes(key_count: usize, uid_count: usize) -> u64 {
    let keys = key_count.saturating_mul(size_of::<GroupPair>());
    let uids = uid_count.saturating_mul(size_of::<Uid>());
    let total = size_of::<GroupResult>().saturating_add(keys).saturating_add(uids);

    u64::try_from(total).unwrap_or(u64::MAX)
}

///
/// TESTS
///
