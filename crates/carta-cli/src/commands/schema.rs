use anyhow::bail;
use carta_core::dataset::{Dataset, ImportSummary};
use carta_core::entities::BenchmarkReport;
use carta_core::matrix::ComparisonMatrix;
use carta_core::responses::{MeasuresResponse, NearbyResponse, SnapshotsResponse};
use schemars::schema_for;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

pub const SCHEMA_TYPES: [&str; 7] = [
    "matrix",
    "nearby",
    "benchmark",
    "measures",
    "snapshots",
    "dataset",
    "import-summary",
];

/// Handle `carta schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = schema_json(&args.type_name)?;
    output(&schema, flags.format)
}

fn schema_json(type_name: &str) -> anyhow::Result<serde_json::Value> {
    let schema = match type_name.trim().to_ascii_lowercase().as_str() {
        "matrix" => schema_for!(ComparisonMatrix),
        "nearby" => schema_for!(NearbyResponse),
        "benchmark" => schema_for!(BenchmarkReport),
        "measures" => schema_for!(MeasuresResponse),
        "snapshots" => schema_for!(SnapshotsResponse),
        "dataset" => schema_for!(Dataset),
        "import-summary" | "import_summary" => schema_for!(ImportSummary),
        other => bail!(
            "unknown schema type '{other}' (expected one of: {})",
            SCHEMA_TYPES.join(", ")
        ),
    };
    Ok(serde_json::to_value(schema)?)
}

#[cfg(test)]
mod tests {
    use super::{SCHEMA_TYPES, schema_json};

    #[test]
    fn every_listed_type_has_a_schema() {
        for name in SCHEMA_TYPES {
            let schema = schema_json(name).expect("schema should generate");
            assert!(schema.get("$schema").is_some(), "{name} lacks $schema");
        }
    }

    #[test]
    fn unknown_type_lists_choices() {
        let err = schema_json("config").unwrap_err();
        assert!(err.to_string().contains("import-summary"));
    }
}
