//! Snapshot: an immutable publish date for one version of measure data.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

/// ISO date format used for snapshot storage and input.
pub const SNAPSHOT_FORMAT: &str = "%Y-%m-%d";

/// Publish date identifying a fixed set of measure observations.
///
/// Serializes as `"YYYY-MM-DD"`. Ordering follows the calendar, so the most
/// recent snapshot is the maximum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct Snapshot(NaiveDate);

impl Snapshot {
    #[must_use]
    pub const fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Build a snapshot from calendar components.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSnapshot` if the date does not exist.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, CoreError> {
        NaiveDate::from_ymd_opt(year, month, day)
            .map(Self)
            .ok_or_else(|| CoreError::InvalidSnapshot(format!("{year:04}-{month:02}-{day:02}")))
    }

    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }

    /// String form used in SQL storage.
    #[must_use]
    pub fn as_iso(self) -> String {
        self.0.format(SNAPSHOT_FORMAT).to_string()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(SNAPSHOT_FORMAT))
    }
}

impl FromStr for Snapshot {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), SNAPSHOT_FORMAT)
            .map(Self)
            .map_err(|_| CoreError::InvalidSnapshot(s.to_string()))
    }
}
