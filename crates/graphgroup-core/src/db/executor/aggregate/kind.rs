use crate::value::CoercionTarget;
use std::fmt;

///
/// AggregateKind
///
/// Aggregation functions the driver recognizes by name.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(in crate::db) enum AggregateKind {
    Min,
    Max,
    Sum,
    Avg,
}

impl AggregateKind {
    /// Resolve one requested function name; names are case-sensitive.
    #[must_use]
    pub(in crate::db) fn parse(name: &str) -> Option<Self> {
        match name {
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "sum" => Some(Self::Sum),
            "avg" => Some(Self::Avg),
            _ => None,
        }
    }

    #[must_use]
    pub(in crate::db) const fn name(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Max => "max",
            Self::Sum => "sum",
            Self::Avg => "avg",
        }
    }

    /// Shape this function needs each input coerced into.
    #[must_use]
    pub(in crate::db) const fn coercion_target(self) -> CoercionTarget {
        match self {
            Self::Min | Self::Max => CoercionTarget::Ordered,
            Self::Sum | Self::Avg => CoercionTarget::Numeric,
        }
    }

    /// Output label for this function applied to `attr`.
    #[must_use]
    pub(in crate::db) fn label(self, attr: &str) -> String {
        format!("{}({attr})", self.name())
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Return true when `name` is a recognized aggregation function.
#[must_use]
pub fn is_aggregator_fn(name: &str) -> bool {
    AggregateKind::parse(name).is_some()
}

///
/// TESTS
///
