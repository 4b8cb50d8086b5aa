use derive_more::Display;
use serde::Serialize;
use thiserror::Error as ThisError;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

///
/// Timestamp
/// (in seconds)
///

#[derive(
    Clone, Copy, Debug, Default, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[repr(transparent)]
pub struct Timestamp(u64);

///
/// TimestampFormatError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TimestampFormatError {
    #[error("timestamp {secs}s is outside the representable calendar range")]
    OutOfRange { secs: u64 },

    #[error("timestamp {secs}s cannot be rendered as rfc3339: {reason}")]
    Format { secs: u64, reason: String },
}

impl Timestamp {
    pub const EPOCH: Self = Self(u64::MIN);

    /// Construct from seconds.
    #[must_use]
    pub const fn from_seconds(secs: u64) -> Self {
        Self(secs)
    }

    /// Construct from milliseconds (truncate to seconds).
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms / 1_000)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Render as an RFC 3339 UTC string.
    pub fn to_rfc3339(self) -> Result<String, TimestampFormatError> {
        let secs = self.0;
        let signed = i64::try_from(secs).map_err(|_| TimestampFormatError::OutOfRange { secs })?;
        let dt = OffsetDateTime::from_unix_timestamp(signed)
            .map_err(|_| TimestampFormatError::OutOfRange { secs })?;

        dt.format(&Rfc3339)
            .map_err(|err| TimestampFormatError::Format {
                secs,
                reason: err.to_string(),
            })
    }
}

impl From<u64> for Timestamp {
    fn from(u: u64) -> Self {
        Self(u)
    }
}

///
/// TESTS
///
