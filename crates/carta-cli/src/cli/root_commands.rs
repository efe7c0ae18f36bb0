use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Facilities within a radius of a facility.
    Nearby(NearbyArgs),
    /// Comparison matrix for a focal facility and its market.
    Matrix(MatrixArgs),
    /// National, state or county benchmark aggregate.
    Benchmark(BenchmarkArgs),
    /// Quality-measure dictionary.
    Measures(MeasuresArgs),
    /// Published snapshots, newest first.
    Snapshots,
    /// Load an exported dataset into the local store.
    Import(ImportArgs),
    /// Print the JSON schema of a command's output.
    Schema(SchemaArgs),
}

/// Arguments for `carta nearby`.
#[derive(Clone, Debug, Args)]
pub struct NearbyArgs {
    pub facility_id: String,
    /// Search radius in miles (defaults to `engine.default_radius_miles`)
    #[arg(short, long)]
    pub radius: Option<f64>,
    /// Leave the origin facility out of the results
    #[arg(long)]
    pub exclude_origin: bool,
}

/// Arguments for `carta matrix`.
#[derive(Clone, Debug, Args)]
pub struct MatrixArgs {
    pub facility_id: String,
    /// Search radius in miles (defaults to `engine.default_radius_miles`)
    #[arg(short, long)]
    pub radius: Option<f64>,
    /// Restrict competitors to one facility type
    #[arg(short = 't', long = "type")]
    pub facility_type: Option<String>,
    /// Snapshot publish date (YYYY-MM-DD); latest when omitted
    #[arg(short, long)]
    pub snapshot: Option<String>,
    /// Ordered measure codes, comma separated; full dictionary when omitted
    #[arg(short, long, value_delimiter = ',')]
    pub measures: Vec<String>,
    /// Benchmark selector: national, state:<XX> or county:<FIPS>
    #[arg(short, long)]
    pub benchmark: Option<String>,
}

/// Arguments for `carta benchmark`.
#[derive(Clone, Debug, Args)]
pub struct BenchmarkArgs {
    /// national, state:<XX> or county:<FIPS>
    pub selector: String,
    /// Snapshot publish date (YYYY-MM-DD); latest when omitted
    #[arg(short, long)]
    pub snapshot: Option<String>,
}

/// Arguments for `carta measures`.
#[derive(Clone, Debug, Args)]
pub struct MeasuresArgs {
    /// Include retired measures
    #[arg(long)]
    pub all: bool,
}

/// Arguments for `carta import`.
#[derive(Clone, Debug, Args)]
pub struct ImportArgs {
    /// Dataset JSON file, or `-` for stdin
    pub path: String,
}

/// Arguments for `carta schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    pub type_name: String,
}
