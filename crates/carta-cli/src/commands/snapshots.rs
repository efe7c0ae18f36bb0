use carta_core::responses::SnapshotsResponse;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `carta snapshots`.
pub async fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let snapshots = ctx.service().list_snapshots().await?;
    let response = SnapshotsResponse {
        latest: snapshots.first().copied(),
        snapshots,
    };
    output(&response, flags.format)
}
