use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `carta` binary.
#[derive(Debug, Parser)]
#[command(
    name = "carta",
    version,
    about = "Carta - facility proximity and quality benchmarks"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Local database file (overrides configuration)
    #[arg(long, global = true)]
    pub db: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            verbose: self.verbose,
            db: self.db.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands, GlobalFlags, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "carta",
            "--format",
            "table",
            "--limit",
            "10",
            "--verbose",
            "snapshots",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Snapshots));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["carta", "snapshots", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["carta", "--format", "xml", "snapshots"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn matrix_arguments_parse() {
        let cli = Cli::try_parse_from([
            "carta",
            "matrix",
            "F-ORIGIN",
            "--radius",
            "12.5",
            "--type",
            "hospital",
            "--measures",
            "STAR,FALLS",
            "--benchmark",
            "county:12086",
        ])
        .expect("cli should parse");

        let Commands::Matrix(args) = cli.command else {
            panic!("expected matrix command");
        };
        assert_eq!(args.facility_id, "F-ORIGIN");
        assert_eq!(args.radius, Some(12.5));
        assert_eq!(args.facility_type.as_deref(), Some("hospital"));
        assert_eq!(args.measures, vec!["STAR", "FALLS"]);
        assert_eq!(args.benchmark.as_deref(), Some("county:12086"));
    }

    #[test]
    fn nearby_origin_flag_defaults_off() {
        let cli = Cli::try_parse_from(["carta", "nearby", "F-ORIGIN", "-r", "5"])
            .expect("cli should parse");
        let Commands::Nearby(args) = cli.command else {
            panic!("expected nearby command");
        };
        assert_eq!(args.radius, Some(5.0));
        assert!(!args.exclude_origin);

        let cli = Cli::try_parse_from(["carta", "nearby", "F-ORIGIN", "--exclude-origin"])
            .expect("cli should parse");
        let Commands::Nearby(args) = cli.command else {
            panic!("expected nearby command");
        };
        assert!(args.exclude_origin);
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let cli = Cli::try_parse_from(["carta", "--db", "/tmp/carta.db", "measures"])
            .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.db.as_deref(), Some("/tmp/carta.db"));
    }
}
