use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "The quakelt developers",
    version,
    about = "quakelt CLI - Builds the logic-tree realizations of a probabilistic seismic hazard calculation.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the realizations of a job and print them.
    Build(BuildArgs),
    /// Validate a job file and the source models it references.
    Check(CheckArgs),
}

/// Arguments for the `build` subcommand.
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Path to the job file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Write the realizations to a CSV file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    // --- Logic-tree Overrides ---
    /// Override the master random seed.
    #[arg(short, long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Override the number of logic-tree samples (0 for full enumeration).
    #[arg(short, long, value_name = "INT")]
    pub num_samples: Option<usize>,

    /// Override the mesh spacing used to split area sources, in km.
    #[arg(long, value_name = "FLOAT")]
    pub area_source_discretization: Option<f64>,

    /// Print the (group, GSIM) -> realizations association.
    #[arg(long)]
    pub show_assoc: bool,

    /// Set a specific configuration value, overriding the job file.
    /// Can be used multiple times. Example: -S logic-tree.random-seed=7
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Path to the job file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,
}
