use crate::value::{Value, ValueTag};
use std::cmp::Ordering;
use thiserror::Error as ThisError;

///
/// CompareError
///
/// The ordering primitive cannot relate two values.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, ThisError)]
pub enum CompareError {
    #[error("cannot order {} against {}", .left.label(), .right.label())]
    Incomparable { left: ValueTag, right: ValueTag },
}

/// Strict comparator for identical orderable variants.
///
/// Returns `None` for mismatched or non-orderable variants.
#[must_use]
pub fn strict_order_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Float64(a), Value::Float64(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
        (Value::Uid(a), Value::Uid(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Report whether `left` sorts strictly before `right`.
///
/// Uids compare by raw identifier; every other orderable kind compares only
/// against its own kind. `Blob`, `Null`, and mixed kinds are incomparable.
pub fn less(left: &Value, right: &Value) -> Result<bool, CompareError> {
    strict_order_cmp(left, right)
        .map(Ordering::is_lt)
        .ok_or(CompareError::Incomparable {
            left: left.tag(),
            right: right.tag(),
        })
}
