#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]

mod commands;
mod host;
mod logging;
mod manifest;

use clap::Parser;
use fedshare_core::Config;
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fedshare")]
#[command(
    author,
    version,
    about = "Plan shared module providers for federated builds",
    long_about = None
)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Compute the shared module providers for a set of resolved modules
    Plan {
        /// Federation options file (default: federation.json)
        #[arg(long, short = 'c', value_name = "FILE", env = "FEDSHARE_CONFIG")]
        config: Option<PathBuf>,

        /// Resolution manifest (default: resolutions.json)
        #[arg(long, short = 'm', value_name = "FILE")]
        manifest: Option<PathBuf>,

        /// Build targets; each runs as an independent pass (default: main)
        #[arg(long = "target", short = 't', value_delimiter = ',')]
        targets: Vec<String>,

        /// Look up the nearest package.json above each resource
        #[arg(long)]
        find_description_files: bool,

        /// Fail inclusion of resources that don't exist on disk
        #[arg(long)]
        verify_resources: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::new(cwd.clone())
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(),
        Some(Commands::Plan {
            config,
            manifest,
            targets,
            find_description_files,
            verify_resources,
        }) => commands::plan::run(
            commands::plan::PlanAction {
                cwd,
                config,
                manifest,
                targets,
                find_description_files,
                verify_resources,
            },
            cli.json,
        ),
    }
}
