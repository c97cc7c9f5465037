//! Published model version identifiers (`MAJOR.MINOR.TIMESTAMP`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::error::Error;

pub const VERSION_MAJOR: u32 = 1;
pub const VERSION_MINOR: u32 = 0;

/// Identifier of a published global model.
///
/// The last component is a Unix timestamp in seconds, so versions from
/// successive cycles order by publish time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ModelVersion {
    pub major: u32,
    pub minor: u32,
    pub timestamp: i64,
}

impl ModelVersion {
    /// Version reported before anything has been published.
    pub const INITIAL: ModelVersion = ModelVersion {
        major: VERSION_MAJOR,
        minor: VERSION_MINOR,
        timestamp: 0,
    };

    /// Version stamped with the given Unix timestamp.
    pub fn at(timestamp: i64) -> Self {
        Self {
            major: VERSION_MAJOR,
            minor: VERSION_MINOR,
            timestamp,
        }
    }

    /// Version stamped with the current wall-clock time.
    pub fn now() -> Self {
        Self::at(chrono::Utc::now().timestamp())
    }
}

impl fmt::Display for ModelVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.timestamp)
    }
}

impl FromStr for ModelVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut parts = trimmed.splitn(3, '.');
        let (Some(major), Some(minor), Some(timestamp)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::InvalidVersion(trimmed.to_string()));
        };
        let invalid = |_: ParseIntError| Error::InvalidVersion(trimmed.to_string());
        Ok(Self {
            major: major.parse::<u32>().map_err(invalid)?,
            minor: minor.parse::<u32>().map_err(invalid)?,
            timestamp: timestamp.parse::<i64>().map_err(invalid)?,
        })
    }
}

impl From<ModelVersion> for String {
    fn from(v: ModelVersion) -> Self {
        v.to_string()
    }
}

impl TryFrom<String> for ModelVersion {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
