//! Strongly-typed revision identifier.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Number of digits in a revision identifier (`YYYYMMDDHHMMSS`).
pub const REVISION_DIGITS: usize = 14;

/// A 14-digit, timestamp-shaped migration revision.
///
/// Numeric and lexicographic order agree because the width is fixed, so the
/// derived `Ord` is the execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Revision(u64);

impl Revision {
    /// Build the revision for a point in time, e.g. when scaffolding a new
    /// migration file.
    ///
    /// Fails for years outside 0-9999, which do not format to 14 digits.
    pub fn from_datetime(at: DateTime<Utc>) -> Result<Self, CoreError> {
        at.format("%Y%m%d%H%M%S").to_string().parse()
    }

    /// The numeric value of this revision.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl FromStr for Revision {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != REVISION_DIGITS || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoreError::InvalidRevision {
                value: s.to_string(),
            });
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| CoreError::InvalidRevision {
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$}", self.0, width = REVISION_DIGITS)
    }
}

impl Serialize for Revision {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
#[path = "revision_test.rs"]
mod tests;
