//! Module: executor::aggregate::state
//! Responsibility: per-group accumulator state machines.
//! Does not own: input lookup, coercion, or labelling.
//! Boundary: fed one coerced value at a time by the aggregate driver.

use crate::{
    db::executor::aggregate::{AggregateError, AggregateKind},
    value::{Value, less},
};

///
/// ApplyOutcome
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(in crate::db) enum ApplyOutcome {
    Accepted,
    Rejected,
}

///
/// NumericTotal
///
/// Running sum; stays integral until a float input or an overflow.
///

#[derive(Clone, Copy, Debug, PartialEq)]
enum NumericTotal {
    Int(i64),
    Float(f64),
}

impl NumericTotal {
    #[allow(clippy::cast_precision_loss)]
    fn add(self, value: &Value) -> Option<Self> {
        match (self, value) {
            (Self::Int(total), Value::Int(v)) => Some(
                total
                    .checked_add(*v)
                    .map_or_else(|| Self::Float(total as f64 + *v as f64), Self::Int),
            ),
            (Self::Int(total), other) => other.to_f64().map(|v| Self::Float(total as f64 + v)),
            (Self::Float(total), other) => other.to_f64().map(|v| Self::Float(total + v)),
        }
    }

    fn start(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(Self::Int(*v)),
            other => other.to_f64().map(Self::Float),
        }
    }
}

///
/// AggregateReducerState
///
/// Shared reducer state so update semantics stay centralized per function.
///

#[derive(Clone, Debug, PartialEq)]
enum AggregateReducerState {
    Min(Option<Value>),
    Max(Option<Value>),
    Sum(Option<NumericTotal>),
    Avg { total: f64, count: u64 },
}

impl AggregateReducerState {
    const fn for_kind(kind: AggregateKind) -> Self {
        match kind {
            AggregateKind::Min => Self::Min(None),
            AggregateKind::Max => Self::Max(None),
            AggregateKind::Sum => Self::Sum(None),
            AggregateKind::Avg => Self::Avg {
                total: 0.0,
                count: 0,
            },
        }
    }
}

///
/// AggregateState
///
/// AggregateState binds one aggregation function to its reducer state.
/// Inputs the reducer cannot use are rejected, never fatal.
///

#[derive(Clone, Debug, PartialEq)]
pub(in crate::db) struct AggregateState {
    kind: AggregateKind,
    reducer: AggregateReducerState,
}

impl AggregateState {
    #[must_use]
    pub(in crate::db) const fn new(kind: AggregateKind) -> Self {
        Self {
            kind,
            reducer: AggregateReducerState::for_kind(kind),
        }
    }

    /// Fold one coerced input value into the running state.
    pub(in crate::db) fn apply(&mut self, value: Value) -> ApplyOutcome {
        match &mut self.reducer {
            AggregateReducerState::Min(current) => {
                replace_extremum(current, value, |candidate, current| less(candidate, current))
            }
            AggregateReducerState::Max(current) => {
                replace_extremum(current, value, |candidate, current| less(current, candidate))
            }
            AggregateReducerState::Sum(total) => {
                let next = match total {
                    Some(total) => total.add(&value),
                    None => NumericTotal::start(&value),
                };
                match next {
                    Some(next) => {
                        *total = Some(next);
                        ApplyOutcome::Accepted
                    }
                    None => ApplyOutcome::Rejected,
                }
            }
            AggregateReducerState::Avg { total, count } => match value.to_f64() {
                Some(v) => {
                    *total += v;
                    *count = count.saturating_add(1);
                    ApplyOutcome::Accepted
                }
                None => ApplyOutcome::Rejected,
            },
        }
    }

    /// Read out the final aggregate value.
    #[allow(clippy::cast_precision_loss)]
    pub(in crate::db) fn finalize(self) -> Result<Value, AggregateError> {
        let kind = self.kind;
        match self.reducer {
            AggregateReducerState::Min(value) | AggregateReducerState::Max(value) => {
                value.ok_or(AggregateError::NoValues { kind })
            }
            AggregateReducerState::Sum(None) => Err(AggregateError::NoValues { kind }),
            AggregateReducerState::Sum(Some(NumericTotal::Int(total))) => Ok(Value::Int(total)),
            AggregateReducerState::Sum(Some(NumericTotal::Float(total))) => {
                Value::from_f64(total).ok_or(AggregateError::NonFinite { kind })
            }
            AggregateReducerState::Avg { count: 0, .. } => Err(AggregateError::NoValues { kind }),
            AggregateReducerState::Avg { total, count } => {
                Value::from_f64(total / count as f64).ok_or(AggregateError::NonFinite { kind })
            }
        }
    }
}

// Keep `current` unless `candidate` beats it; incomparable candidates are rejected.
fn replace_extremum<F, E>(current: &mut Option<Value>, candidate: Value, beats: F) -> ApplyOutcome
where
    F: FnOnce(&Value, &Value) -> Result<bool, E>,
{
    let Some(existing) = current.as_ref() else {
        *current = Some(candidate);
        return ApplyOutcome::Accepted;
    };

    match beats(&candidate, existing) {
        Ok(true) => {
            *current = Some(candidate);
            ApplyOutcome::Accepted
        }
        Ok(false) => ApplyOutcome::Accepted,
        Err(_) => ApplyOutcome::Rejected,
    }
}

///
/// TESTS
///
