use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Nearby(args) => commands::nearby::handle(&args, ctx, flags).await,
        Commands::Matrix(args) => commands::matrix::handle(&args, ctx, flags).await,
        Commands::Benchmark(args) => commands::benchmark::handle(&args, ctx, flags).await,
        Commands::Measures(args) => commands::measures::handle(&args, ctx, flags).await,
        Commands::Snapshots => commands::snapshots::handle(ctx, flags).await,
        Commands::Import(args) => commands::import::handle(&args, ctx, flags).await,
        Commands::Schema(_) => unreachable!("schema is pre-dispatched in main"),
    }
}
