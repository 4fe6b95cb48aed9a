#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use cmd::CommandContext;
use ftree_core::config::{ConfigSource, resolve_config};
use output::{CliError, OutputMode, render_error, resolve_output_mode};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "ftree: fault tree analysis",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Emit JSON output (alias for `--format json`).
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Config file to use instead of ./ftree.toml and the user config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Analysis",
        about = "Analyse a fault tree",
        long_about = "Compute minimal cut sets, top event probability and structural importance.",
        after_help = "EXAMPLES:\n    # Analyse the detected top event\n    ftree analyze tree.json\n\n    # Analyse a subtree\n    ftree analyze tree.json --root g2\n\n    # Emit machine-readable output\n    ftree analyze tree.json --format json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "List minimal cut sets",
        long_about = "List the minimal cut sets of the top event, most probable first.",
        after_help = "EXAMPLES:\n    # All minimal cut sets\n    ftree cut-sets tree.json\n\n    # Single and double failures only\n    ftree cut-sets tree.json --max-order 2"
    )]
    CutSets(cmd::cut_sets::CutSetsArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Rank events by structural importance",
        long_about = "Rank basic and conditional events by structural importance.",
        after_help = "EXAMPLES:\n    # Top five events\n    ftree importance tree.json --limit 5"
    )]
    Importance(cmd::importance::ImportanceArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Check snapshot structure",
        long_about = "Report top-event candidates, dangling connections, duplicate ids and cycles.",
        after_help = "EXAMPLES:\n    # Report problems\n    ftree check tree.json\n\n    # Fail on problems (for CI)\n    ftree check tree.json --strict"
    )]
    Check(cmd::check::CheckArgs),

    #[command(
        next_help_heading = "Project Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    ftree completions bash\n\n    # Generate zsh completions\n    ftree completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("FTREE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "ftree=debug,info"
        } else {
            "ftree=info,warn"
        })
    });

    let format = env::var("FTREE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

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

fn run(cli: Cli) -> Result<(), (OutputMode, CliError)> {
    let early_mode = resolve_output_mode(cli.format, cli.json, None);

    let working_dir = env::current_dir()
        .map_err(|e| (early_mode, CliError::new(format!("cannot resolve working directory: {e}"))))?;
    let (config, source) = resolve_config(cli.config.as_deref(), &working_dir)
        .map_err(|e| (early_mode, CliError::from(&e)))?;
    match source {
        ConfigSource::Defaults => debug!("using default config"),
        ConfigSource::Explicit(ref path)
        | ConfigSource::WorkingDir(ref path)
        | ConfigSource::User(ref path) => debug!(path = %path.display(), "config loaded"),
    }

    let output = resolve_output_mode(cli.format, cli.json, config.report.output.as_deref());
    let ctx = CommandContext { output, config };

    let result = match cli.command {
        Commands::Analyze(ref args) => cmd::analyze::run_analyze(args, &ctx),
        Commands::CutSets(ref args) => cmd::cut_sets::run_cut_sets(args, &ctx),
        Commands::Importance(ref args) => cmd::importance::run_importance(args, &ctx),
        Commands::Check(ref args) => cmd::check::run_check(args, &ctx),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    };

    result.map_err(|e| (output, CliError::from_anyhow(&e)))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err((mode, error)) => {
            if render_error(mode, &error).is_err() {
                eprintln!("error: {}", error.message);
            }
            ExitCode::FAILURE
        }
    }
}
