use carta_core::responses::MeasuresResponse;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::cli::root_commands::MeasuresArgs;
use crate::commands::shared::limit::{effective_limit, truncate_to};
use crate::context::AppContext;
use crate::output::output;

/// Handle `carta measures`.
pub async fn handle(
    args: &MeasuresArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut measures = ctx.service().list_measures(args.all).await?;
    let limit = effective_limit(None, flags.limit, ctx.config.general.default_limit);
    truncate_to(&mut measures, limit);

    if flags.format == OutputFormat::Table {
        // Tabulate the list itself rather than the wrapper object.
        return output(&measures, flags.format);
    }
    output(&MeasuresResponse { measures }, flags.format)
}
