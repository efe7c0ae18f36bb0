use carta_core::Snapshot;
use carta_core::entities::BenchmarkSelector;
use serde::de::DeserializeOwned;

/// Parse a snake_case enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Parse an optional `YYYY-MM-DD` snapshot argument.
pub fn parse_snapshot(raw: Option<&str>) -> anyhow::Result<Option<Snapshot>> {
    raw.map(|value| {
        value
            .parse::<Snapshot>()
            .map_err(|error| anyhow::anyhow!("invalid --snapshot: {error}"))
    })
    .transpose()
}

/// Parse `national`, `state:<XX>` or `county:<FIPS>`.
pub fn parse_selector(raw: &str) -> anyhow::Result<BenchmarkSelector> {
    raw.parse::<BenchmarkSelector>()
        .map_err(|error| anyhow::anyhow!("invalid benchmark selector '{raw}': {error}"))
}
