use crate::value::Value;

///
/// ValueTag
///
/// Stable canonical value-variant tag used by ordering and diagnostics.
///
/// IMPORTANT:
/// Tag values are part of stable behavior and must remain fixed.
///
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ValueTag {
    Blob = 1,
    Bool = 2,
    Float64 = 3,
    Int = 4,
    Null = 5,
    Text = 6,
    Timestamp = 7,
    Uid = 8,
}

impl ValueTag {
    /// Stable byte tag for this variant.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Stable human-readable value kind label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blob => "Blob",
            Self::Bool => "Bool",
            Self::Float64 => "Float64",
            Self::Int => "Int",
            Self::Null => "Null",
            Self::Text => "Text",
            Self::Timestamp => "Timestamp",
            Self::Uid => "Uid",
        }
    }
}

/// Stable canonical variant tag.
#[must_use]
pub(super) const fn canonical_tag(value: &Value) -> ValueTag {
    match value {
        Value::Blob(_) => ValueTag::Blob,
        Value::Bool(_) => ValueTag::Bool,
        Value::Float64(_) => ValueTag::Float64,
        Value::Int(_) => ValueTag::Int,
        Value::Null => ValueTag::Null,
        Value::Text(_) => ValueTag::Text,
        Value::Timestamp(_) => ValueTag::Timestamp,
        Value::Uid(_) => ValueTag::Uid,
    }
}
