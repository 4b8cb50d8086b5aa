mod coercion;
mod compare;
mod marshal;
mod tag;


use crate::{
    db::Uid,
    types::{Float64, Timestamp},
};
use serde::Serialize;

// re-exports
pub use coercion::{CoercionTarget, coerce};
pub use compare::{CompareError, less, strict_order_cmp};
pub use marshal::{MarshalError, marshal_text};
pub use tag::ValueTag;

///
/// Value
///
/// Typed value flowing through grouping and aggregation.
///
/// Uid   → a reference to another entity, ordered by its raw identifier.
/// Null  → the attribute carried no value; never a grouping key.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum Value {
    Blob(Vec<u8>),
    Bool(bool),
    Float64(Float64),
    Int(i64),
    Null,
    Text(String),
    Timestamp(Timestamp),
    Uid(Uid),
}

impl Value {
    /// Stable type discriminator for this value.
    #[must_use]
    pub const fn tag(&self) -> ValueTag {
        tag::canonical_tag(self)
    }

    /// Build a float value, rejecting non-finite input.
    #[must_use]
    pub fn from_f64(v: f64) -> Option<Self> {
        Float64::try_new(v).map(Self::Float64)
    }

    #[must_use]
    pub const fn is_uid(&self) -> bool {
        matches!(self, Self::Uid(_))
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float64(_))
    }

    #[must_use]
    pub const fn as_uid(&self) -> Option<Uid> {
        match self {
            Self::Uid(uid) => Some(*uid),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric widening to `f64` for `Int` and `Float64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn to_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float64(v) => Some(v.get()),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Float64> for Value {
    fn from(v: Float64) -> Self {
        Self::Float64(v)
    }
}

impl From<Timestamp> for Value {
    fn from(v: Timestamp) -> Self {
        Self::Timestamp(v)
    }
}
