#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use costar_core::error::ErrorCode;
use output::{CliError, OutputMode, resolve_output_mode};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "costar: degrees of separation across a media library",
    long_about = None
)]
struct Cli {
    /// Config file [default: <config dir>/costar/config.toml].
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Snapshot file, overriding `cache.path` from the config.
    #[arg(long, global = true, value_name = "PATH")]
    cache: Option<PathBuf>,

    /// Output format. Falls back to $FORMAT, then pretty on a TTY and text otherwise.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Graph",
        about = "Build the graph from a catalog export",
        long_about = "Rebuild the people/media graph from a catalog export and save a snapshot.",
        after_help = "EXAMPLES:\n    # Build from an export\n    costar build --catalog library.json\n\n    # Only rebuild when the snapshot is missing or stale\n    costar build --catalog library.json --if-stale"
    )]
    Build(cmd::build::BuildArgs),

    #[command(
        next_help_heading = "Graph",
        about = "Show snapshot freshness",
        after_help = "EXAMPLES:\n    costar status\n\n    # Emit machine-readable output\n    costar status --json"
    )]
    Status(cmd::status::StatusArgs),

    #[command(
        next_help_heading = "Query",
        about = "Find the shortest connection between two people",
        long_about = "Breadth-first search over shared credits. Each degree is one person-media or media-person hop.",
        after_help = "EXAMPLES:\n    # Connect two people\n    costar path p-hanks p-bacon\n\n    # Search at most two people away\n    costar path p-hanks p-bacon --max-depth 2 --json"
    )]
    Path(cmd::path::PathArgs),

    #[command(
        next_help_heading = "Query",
        about = "Expand the neighborhood around a person",
        after_help = "EXAMPLES:\n    costar neighbors p-bacon --degree 1\n\n    # Cap the result size\n    costar neighbors p-bacon --degree 3 --max-nodes 100 --json"
    )]
    Neighbors(cmd::neighbors::NeighborsArgs),

    #[command(
        next_help_heading = "Query",
        about = "Show one person or media item with its credits",
        after_help = "EXAMPLES:\n    costar show p-bacon\n\n    # Look up a media item\n    costar show m-apollo --media --json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Query",
        about = "Search people by name",
        after_help = "EXAMPLES:\n    costar search bacon\n\n    # Second page\n    costar search tom --limit 20 --offset 20"
    )]
    Search(cmd::search::SearchArgs),

    #[command(
        next_help_heading = "Query",
        about = "List people alphabetically",
        after_help = "EXAMPLES:\n    costar people --limit 10"
    )]
    People(cmd::people::PeopleArgs),

    #[command(
        next_help_heading = "Query",
        about = "Show graph statistics",
        after_help = "EXAMPLES:\n    costar stats --json"
    )]
    Stats(cmd::stats::StatsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("COSTAR_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "costar=debug,info"
        } else {
            "costar=info,warn"
        })
    });
    let format = env::var("COSTAR_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let output = cli.output_mode();
    debug!(?output, "resolved output mode");

    let session = match cmd::Session::open(cli.config.as_deref(), cli.cache.as_deref()) {
        Ok(session) => session,
        Err(e) => {
            let error = CliError::from_code(format!("{e:#}"), ErrorCode::ConfigParseError);
            return cmd::fail(output, error);
        }
    };

    match &cli.command {
        Commands::Build(args) => cmd::build::run_build(args, output, &session),
        Commands::Status(args) => cmd::status::run_status(args, output, &session),
        Commands::Path(args) => cmd::path::run_path(args, output, &session),
        Commands::Neighbors(args) => cmd::neighbors::run_neighbors(args, output, &session),
        Commands::Show(args) => cmd::show::run_show(args, output, &session),
        Commands::Search(args) => cmd::search::run_search(args, output, &session),
        Commands::People(args) => cmd::people::run_people(args, output, &session),
        Commands::Stats(args) => cmd::stats::run_stats(args, output, &session),
    }
}
