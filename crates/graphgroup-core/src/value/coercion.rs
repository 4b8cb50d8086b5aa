//! Best-effort coercion of aggregation inputs.
//!
//! Coercion never fails loudly: a value that cannot be brought into the
//! requested shape yields `None` and the caller skips it.

use crate::value::Value;

///
/// CoercionTarget
///
/// Shape an aggregation function needs its inputs in.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CoercionTarget {
    /// `Int` or `Float64`; numeric text is parsed.
    Numeric,
    /// Any value the ordering primitive can relate.
    Ordered,
}

/// Coerce one source value toward `target`, returning `None` when it cannot.
#[must_use]
pub fn coerce(value: &Value, target: CoercionTarget) -> Option<Value> {
    match target {
        CoercionTarget::Numeric => coerce_numeric(value),
        CoercionTarget::Ordered => coerce_ordered(value),
    }
}

fn coerce_numeric(value: &Value) -> Option<Value> {
    match value {
        Value::Int(_) | Value::Float64(_) => Some(value.clone()),
        Value::Text(text) => parse_numeric_text(text.trim()),
        Value::Blob(_)
        | Value::Bool(_)
        | Value::Null
        | Value::Timestamp(_)
        | Value::Uid(_) => None,
    }
}

fn coerce_ordered(value: &Value) -> Option<Value> {
    match value {
        Value::Blob(_) | Value::Null => None,
        _ => Some(value.clone()),
    }
}

fn parse_numeric_text(text: &str) -> Option<Value> {
    if let Ok(int) = text.parse::<i64>() {
        return Some(Value::Int(int));
    }

    text.parse::<f64>().ok().and_then(Value::from_f64)
}
