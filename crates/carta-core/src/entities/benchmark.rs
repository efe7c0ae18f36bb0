use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::enums::BenchmarkLevel;
use crate::errors::CoreError;
use crate::snapshot::Snapshot;

/// Raw population counts for one benchmark scope and snapshot.
///
/// Percentages are never stored; see [`BenchmarkPercentages`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BenchmarkAggregate {
    pub level: BenchmarkLevel,
    /// State code or county FIPS; `None` for national.
    #[serde(default)]
    pub key: Option<String>,
    pub snapshot: Snapshot,
    pub total_count: u64,
    pub dual_eligible_count: u64,
    pub aged_count: u64,
    pub disabled_count: u64,
    pub advantage_count: u64,
}

/// Shares of the total population, derived at resolution time.
///
/// Every field is `None` when the total population is zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BenchmarkPercentages {
    pub dual_eligible_pct: Option<f64>,
    pub aged_pct: Option<f64>,
    pub disabled_pct: Option<f64>,
    pub advantage_pct: Option<f64>,
}

/// Aggregate counts plus their derived percentages.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BenchmarkReport {
    pub aggregate: BenchmarkAggregate,
    pub percentages: BenchmarkPercentages,
}

/// Requested reference population: `national`, `state:FL`, `county:12086`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct BenchmarkSelector {
    pub level: BenchmarkLevel,
    #[serde(default)]
    pub key: Option<String>,
}

impl BenchmarkSelector {
    #[must_use]
    pub const fn national() -> Self {
        Self {
            level: BenchmarkLevel::National,
            key: None,
        }
    }

    #[must_use]
    pub fn state(code: impl Into<String>) -> Self {
        Self {
            level: BenchmarkLevel::State,
            key: Some(code.into()),
        }
    }

    #[must_use]
    pub fn county(fips: impl Into<String>) -> Self {
        Self {
            level: BenchmarkLevel::County,
            key: Some(fips.into()),
        }
    }
}

impl fmt::Display for BenchmarkSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}:{key}", self.level),
            None => f.write_str(self.level.as_str()),
        }
    }
}

impl FromStr for BenchmarkSelector {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (level, key) = match s.split_once(':') {
            Some((level, key)) => (level, Some(key.trim())),
            None => (s, None),
        };
        let level: BenchmarkLevel = level.parse()?;
        let key = key.filter(|k| !k.is_empty()).map(String::from);
        if level.requires_key() && key.is_none() {
            return Err(CoreError::Validation(format!(
                "benchmark level '{level}' requires a key (e.g. '{level}:<key>')"
            )));
        }
        Ok(Self {
            level,
            key: if level.requires_key() { key } else { None },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_parses_all_levels() {
        assert_eq!(
            "national".parse::<BenchmarkSelector>().unwrap(),
            BenchmarkSelector::national()
        );
        assert_eq!(
            "state:FL".parse::<BenchmarkSelector>().unwrap(),
            BenchmarkSelector::state("FL")
        );
        assert_eq!(
            "county:12086".parse::<BenchmarkSelector>().unwrap(),
            BenchmarkSelector::county("12086")
        );
    }

    #[test]
    fn selector_requires_key_below_national() {
        assert!("state".parse::<BenchmarkSelector>().is_err());
        assert!("county:".parse::<BenchmarkSelector>().is_err());
        assert!("planet:earth".parse::<BenchmarkSelector>().is_err());
    }

    #[test]
    fn national_selector_drops_key() {
        let sel: BenchmarkSelector = "national:US".parse().unwrap();
        assert_eq!(sel.key, None);
        assert_eq!(sel.to_string(), "national");
    }
}
