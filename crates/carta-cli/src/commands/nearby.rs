use carta_core::responses::NearbyResponse;

use crate::cli::root_commands::NearbyArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::limit::{effective_limit, truncate_to};
use crate::context::AppContext;
use crate::output::{output, print_table, table};

/// Handle `carta nearby`.
pub async fn handle(args: &NearbyArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let radius_miles = args
        .radius
        .unwrap_or(ctx.config.engine.default_radius_miles);
    let include_origin = ctx.config.engine.include_origin && !args.exclude_origin;
    let mut results = ctx
        .engine
        .nearby_with_origin(&args.facility_id, radius_miles, include_origin)
        .await?;

    let limit = effective_limit(None, flags.limit, ctx.config.general.default_limit);
    truncate_to(&mut results, limit);

    let response = NearbyResponse {
        origin_facility_id: args.facility_id.clone(),
        radius_miles,
        results,
    };
    if flags.format == OutputFormat::Table {
        print_table(|options| table::render_nearby(&response, options));
        return Ok(());
    }
    output(&response, flags.format)
}
