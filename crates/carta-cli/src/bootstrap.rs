use anyhow::Context;
use carta_config::CartaConfig;

use crate::cli::GlobalFlags;

/// Load layered configuration, then apply command-line overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<CartaConfig> {
    let mut config = CartaConfig::load_with_dotenv().context("failed to load carta configuration")?;
    apply_overrides(&mut config, flags);
    config.validate()?;
    Ok(config)
}

/// `--db` always selects a local file, even when a remote database is
/// configured.
fn apply_overrides(config: &mut CartaConfig, flags: &GlobalFlags) {
    if let Some(path) = &flags.db {
        if config.database.is_remote() {
            tracing::debug!(path, "--db overrides configured remote database");
        }
        config.database.path.clone_from(path);
        config.database.url.clear();
        config.database.auth_token.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::apply_overrides;
    use crate::cli::{GlobalFlags, OutputFormat};
    use carta_config::CartaConfig;

    fn flags(db: Option<&str>) -> GlobalFlags {
        GlobalFlags {
            format: OutputFormat::Json,
            limit: None,
            quiet: false,
            verbose: false,
            db: db.map(str::to_string),
        }
    }

    #[test]
    fn db_flag_forces_local_file() {
        let mut config = CartaConfig::default();
        config.database.url = "libsql://example.turso.io".into();
        config.database.auth_token = "token".into();

        apply_overrides(&mut config, &flags(Some("/tmp/other.db")));

        assert_eq!(config.database.path, "/tmp/other.db");
        assert!(!config.database.is_remote());
    }

    #[test]
    fn no_flag_keeps_config() {
        let mut config = CartaConfig::default();
        let before = config.database.path.clone();
        apply_overrides(&mut config, &flags(None));
        assert_eq!(config.database.path, before);
    }
}
