use crate::cli::GlobalFlags;
use crate::cli::root_commands::BenchmarkArgs;
use crate::commands::shared::parse::{parse_selector, parse_snapshot};
use crate::context::AppContext;
use crate::output::output;

/// Handle `carta benchmark`.
pub async fn handle(
    args: &BenchmarkArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let selector = parse_selector(&args.selector)?;
    let snapshot = parse_snapshot(args.snapshot.as_deref())?;
    let report = ctx.engine.benchmark(&selector, snapshot).await?;
    output(&report, flags.format)
}
