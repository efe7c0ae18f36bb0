use std::io::Read;

use anyhow::Context;
use carta_core::dataset::Dataset;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ImportArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `carta import`.
pub async fn handle(args: &ImportArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let raw = read_input(&args.path)?;
    let dataset = parse_dataset(&raw).with_context(|| format!("invalid dataset in {}", args.path))?;
    let summary = ctx
        .service()
        .import_dataset(&dataset)
        .await
        .context("import failed; no rows were written")?;
    output(&summary, flags.format)
}

fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read dataset from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
}

fn parse_dataset(raw: &str) -> anyhow::Result<Dataset> {
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use carta_db::test_support::helpers::fixture_dataset;

    use super::parse_dataset;

    #[test]
    fn exported_fixture_parses_back() {
        let json = serde_json::to_string(&fixture_dataset()).unwrap();
        let dataset = parse_dataset(&json).unwrap();
        assert_eq!(dataset.facilities.len(), 6);
        assert_eq!(dataset.snapshots.len(), 2);
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(parse_dataset("{\"facilities\": 3}").is_err());
    }
}
