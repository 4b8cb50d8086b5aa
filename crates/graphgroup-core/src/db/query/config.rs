use serde::{Deserialize, Serialize};

const GROUPED_DEFAULT_MAX_GROUPS: u64 = 10_000;
const GROUPED_DEFAULT_MAX_GROUP_BYTES: u64 = 16 * 1024 * 1024;

///
/// GroupedExecutionConfig
///
/// Caller-supplied hard limits for one group-by stage.
/// Missing fields fall back to the conservative defaults.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct GroupedExecutionConfig {
    max_groups: u64,
    max_group_bytes: u64,
}

impl GroupedExecutionConfig {
    /// Build one grouped hard-limit configuration.
    #[must_use]
    pub const fn with_hard_limits(max_groups: u64, max_group_bytes: u64) -> Self {
        Self {
            max_groups,
            max_group_bytes,
        }
    }

    /// Build the default grouped hard-limit configuration.
    #[must_use]
    pub const fn conservative() -> Self {
        Self::with_hard_limits(GROUPED_DEFAULT_MAX_GROUPS, GROUPED_DEFAULT_MAX_GROUP_BYTES)
    }

    #[must_use]
    pub const fn max_groups(&self) -> u64 {
        self.max_groups
    }

    #[must_use]
    pub const fn max_group_bytes(&self) -> u64 {
        self.max_group_bytes
    }
}

impl Default for GroupedExecutionConfig {
    fn default() -> Self {
        Self::conservative()
    }
}

///
/// TESTS
///
