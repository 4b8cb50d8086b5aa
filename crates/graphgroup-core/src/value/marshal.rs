use crate::{
    types::TimestampFormatError,
    value::{Value, ValueTag},
};
use thiserror::Error as ThisError;

///
/// MarshalError
///
/// A value has no canonical text form.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum MarshalError {
    #[error("{} values have no text form", .tag.label())]
    Unsupported { tag: ValueTag },

    #[error(transparent)]
    Timestamp(#[from] TimestampFormatError),
}

/// Marshal one value into its canonical text form.
///
/// Two values with equal text forms land in the same grouping bucket, so the
/// encoding must be stable across processes: integers and uids in decimal,
/// floats in shortest round-trip form, timestamps as RFC 3339 UTC.
pub fn marshal_text(value: &Value) -> Result<String, MarshalError> {
    match value {
        Value::Bool(v) => Ok(v.to_string()),
        Value::Float64(v) => Ok(v.get().to_string()),
        Value::Int(v) => Ok(v.to_string()),
        Value::Text(v) => Ok(v.clone()),
        Value::Timestamp(v) => Ok(v.to_rfc3339()?),
        Value::Uid(v) => Ok(v.to_string()),
        Value::Blob(_) | Value::Null => Err(MarshalError::Unsupported { tag: value.tag() }),
    }
}
