#![forbid(unsafe_code)]

mod cmd;
mod output;

use assetgraph_core::config::{ProjectConfig, load_project_config};
use assetgraph_core::error::ErrorCode;
use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, render_error};
use std::env;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ag: inspect asset dependency graphs and live status",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides --json, FORMAT and config).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags, environment and config.
    fn output_mode(&self, config: &ProjectConfig) -> OutputMode {
        output::resolve_output_mode(self.format, self.json, config.output.format.as_deref())
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Graph",
        about = "Summarize the asset graph",
        long_about = "Build the dependency graph from a definitions snapshot and list nodes with their neighbours.",
        after_help = "EXAMPLES:\n    # Summarize every asset\n    ag graph --defs defs.json\n\n    # One asset's neighbours\n    ag graph --defs defs.json --id warehouse/orders\n\n    # Emit machine-readable output\n    ag graph --defs defs.json --json"
    )]
    Graph(cmd::graph::GraphArgs),

    #[command(
        next_help_heading = "Graph",
        about = "Report dependency cycles",
        long_about = "Detect dependency cycles and list every group of mutually dependent assets.",
        after_help = "EXAMPLES:\n    # Report cycles\n    ag cycles --defs defs.json\n\n    # Fail the build on cycles\n    ag cycles --defs defs.json --fail\n\n    # Read definitions from stdin\n    cat defs.json | ag cycles --defs -"
    )]
    Cycles(cmd::cycles::CyclesArgs),

    #[command(
        next_help_heading = "Status",
        about = "Show live status per asset",
        long_about = "Merge a live-feed snapshot into per-asset status records.",
        after_help = "EXAMPLES:\n    # Status for every asset in the feed\n    ag live --live live.json\n\n    # Only stale assets\n    ag live --live live.json --stale\n\n    # Emit machine-readable output\n    ag live --live live.json --json"
    )]
    Live(cmd::live::LiveArgs),

    #[command(
        next_help_heading = "Status",
        about = "Show one asset",
        long_about = "Show an asset's definition, neighbours and, with --live, its live status.",
        after_help = "EXAMPLES:\n    # Show by token\n    ag show warehouse/orders --defs defs.json\n\n    # Disambiguate with a JSON key\n    ag show '[\"warehouse\",\"orders\"]' --defs defs.json\n\n    # Include live status\n    ag show warehouse/orders --defs defs.json --live live.json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    ag completions bash\n\n    # Generate zsh completions\n    ag completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("ASSETGRAPH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "assetgraph=debug,ag=debug,info"
        } else {
            "assetgraph=info,ag=info,warn"
        })
    });

    let format = env::var("ASSETGRAPH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    let config = match load_project_config(&project_root) {
        Ok(config) => config,
        Err(err) => {
            let mode = output::resolve_output_mode(cli.format, cli.json, None);
            render_error(
                mode,
                &CliError::from_code(ErrorCode::ConfigParseError, format!("{err:#}")),
            )?;
            return Err(err);
        }
    };
    let output = cli.output_mode(&config);
    debug!(?output, "output mode resolved");

    match cli.command {
        Commands::Graph(ref args) => cmd::graph::run_graph(args, output, &config),
        Commands::Cycles(ref args) => cmd::cycles::run_cycles(args, output, &config),
        Commands::Live(ref args) => cmd::live::run_live(args, output),
        Commands::Show(ref args) => cmd::show::run_show(args, output, &config),
        Commands::Completions(ref args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command, &mut std::io::stdout())
        }
    }
}
