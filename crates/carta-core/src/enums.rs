//! Classification enums for facilities, measures, matrix cells and benchmarks.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` for SQL storage. `FromStr` accepts the same strings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// FacilityType
// ---------------------------------------------------------------------------

/// Provider classification of a facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FacilityType {
    SkilledNursing,
    Hospital,
    Clinic,
    HomeHealth,
    Hospice,
    InpatientRehab,
    LongTermCare,
}

impl FacilityType {
    pub const ALL: [Self; 7] = [
        Self::SkilledNursing,
        Self::Hospital,
        Self::Clinic,
        Self::HomeHealth,
        Self::Hospice,
        Self::InpatientRehab,
        Self::LongTermCare,
    ];

    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SkilledNursing => "skilled_nursing",
            Self::Hospital => "hospital",
            Self::Clinic => "clinic",
            Self::HomeHealth => "home_health",
            Self::Hospice => "hospice",
            Self::InpatientRehab => "inpatient_rehab",
            Self::LongTermCare => "long_term_care",
        }
    }
}

impl fmt::Display for FacilityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacilityType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == needle)
            .ok_or_else(|| CoreError::UnknownVariant {
                kind: "facility type",
                value: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Which way a raw score improves.
///
/// Only raw-score interpretation depends on this; percentiles already encode
/// relative standing and are compared without it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
}

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HigherIsBetter => "higher_is_better",
            Self::LowerIsBetter => "lower_is_better",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "higher_is_better" => Ok(Self::HigherIsBetter),
            "lower_is_better" => Ok(Self::LowerIsBetter),
            other => Err(CoreError::UnknownVariant {
                kind: "direction",
                value: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// SourceCategory
// ---------------------------------------------------------------------------

/// Shape of a measure's raw score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceCategory {
    /// Discrete star/rating scale (e.g. 1–5).
    RatingScale,
    /// Continuous rate or percentage.
    Continuous,
}

impl SourceCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RatingScale => "rating_scale",
            Self::Continuous => "continuous",
        }
    }
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "rating_scale" => Ok(Self::RatingScale),
            "continuous" => Ok(Self::Continuous),
            other => Err(CoreError::UnknownVariant {
                kind: "source category",
                value: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Per-cell label derived from percentile comparison within a matrix column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Best,
    Worst,
    Neutral,
    NoData,
}

impl Classification {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Best => "best",
            Self::Worst => "worst",
            Self::Neutral => "neutral",
            Self::NoData => "no_data",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// BenchmarkLevel
// ---------------------------------------------------------------------------

/// Reference-population scope for benchmark aggregates.
///
/// ```text
/// national ⊃ state ⊃ county
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkLevel {
    National,
    State,
    County,
}

impl BenchmarkLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::National => "national",
            Self::State => "state",
            Self::County => "county",
        }
    }

    /// Whether this level needs a geographic key.
    #[must_use]
    pub const fn requires_key(self) -> bool {
        !matches!(self, Self::National)
    }

    /// Canonical storage form of a geographic key for this level.
    ///
    /// National drops any key. State keys are two ASCII letters, upper-cased.
    /// County keys are five-digit FIPS codes.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if a keyed level has no key or the key
    /// is malformed.
    pub fn normalize_key(self, key: Option<&str>) -> Result<Option<String>, CoreError> {
        if !self.requires_key() {
            return Ok(None);
        }
        let key = key.map(str::trim).filter(|k| !k.is_empty()).ok_or_else(|| {
            CoreError::Validation(format!("benchmark level '{self}' requires a key"))
        })?;
        let valid = match self {
            Self::State => key.len() == 2 && key.bytes().all(|b| b.is_ascii_alphabetic()),
            Self::County => key.len() == 5 && key.bytes().all(|b| b.is_ascii_digit()),
            Self::National => true,
        };
        if valid {
            Ok(Some(key.to_ascii_uppercase()))
        } else {
            Err(CoreError::Validation(format!(
                "malformed {self} key '{key}'"
            )))
        }
    }
}

impl fmt::Display for BenchmarkLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BenchmarkLevel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "national" => Ok(Self::National),
            "state" => Ok(Self::State),
            "county" => Ok(Self::County),
            other => Err(CoreError::UnknownVariant {
                kind: "benchmark level",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facility_type_parses_snake_and_kebab_case() {
        assert_eq!(
            "skilled_nursing".parse::<FacilityType>().unwrap(),
            FacilityType::SkilledNursing
        );
        assert_eq!(
            "Home-Health".parse::<FacilityType>().unwrap(),
            FacilityType::HomeHealth
        );
        assert!("spa".parse::<FacilityType>().is_err());
    }

    #[test]
    fn as_str_matches_serde() {
        for t in FacilityType::ALL {
            let json = serde_json::to_value(t).unwrap();
            assert_eq!(json, serde_json::Value::String(t.as_str().to_string()));
        }
        let json = serde_json::to_value(Classification::NoData).unwrap();
        assert_eq!(json, "no_data");
    }

    #[test]
    fn benchmark_keys_normalize() {
        assert_eq!(BenchmarkLevel::National.normalize_key(Some("xx")), Ok(None));
        assert_eq!(
            BenchmarkLevel::State.normalize_key(Some(" fl ")),
            Ok(Some("FL".to_string()))
        );
        assert_eq!(
            BenchmarkLevel::County.normalize_key(Some("12086")),
            Ok(Some("12086".to_string()))
        );
        assert!(BenchmarkLevel::State.normalize_key(None).is_err());
        assert!(BenchmarkLevel::State.normalize_key(Some("FLA")).is_err());
        assert!(BenchmarkLevel::County.normalize_key(Some("1208A")).is_err());
    }

    #[test]
    fn only_national_is_keyless() {
        assert!(!BenchmarkLevel::National.requires_key());
        assert!(BenchmarkLevel::State.requires_key());
        assert!(BenchmarkLevel::County.requires_key());
    }
}
