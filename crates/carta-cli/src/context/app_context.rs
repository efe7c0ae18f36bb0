use std::path::Path;

use anyhow::Context;
use carta_config::CartaConfig;
use carta_db::service::CartaService;
use carta_engine::{EngineOptions, MatrixBuilder, MatrixCache, cache_from_config};

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub engine: MatrixBuilder<CartaService, Box<dyn MatrixCache>>,
    pub config: CartaConfig,
}

impl AppContext {
    /// Open the configured store and wire the matrix engine over it.
    pub async fn init(config: CartaConfig) -> anyhow::Result<Self> {
        let database = &config.database;
        if !database.is_remote() && !database.is_in_memory() {
            ensure_parent_dir(Path::new(&database.path))?;
        }

        let service = CartaService::from_config(database)
            .await
            .with_context(|| {
                if database.is_remote() {
                    format!("failed to connect to remote database {}", database.url)
                } else {
                    format!("failed to open database at {}", database.path)
                }
            })?
            .with_chunk_size(config.engine.query_chunk_size);

        let engine = MatrixBuilder::new(
            service,
            cache_from_config(&config.engine),
            EngineOptions::from(&config.engine),
        );

        Ok(Self { engine, config })
    }

    pub const fn service(&self) -> &CartaService {
        self.engine.source()
    }
}

fn ensure_parent_dir(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(())
}
