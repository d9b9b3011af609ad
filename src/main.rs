use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use funcsum::cli::commands::summarize::SummarizeOptions;

#[derive(Parser)]
#[command(name = "funcsum")]
#[command(
    version,
    about = "Dependency-ordered summaries of decompiled binary functions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Extra configuration file, merged last
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Debug logging and per-function trace
    #[arg(long, short, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a program's functions in dependency order
    Summarize {
        #[arg(help = "Directory holding the call graph and decompilations")]
        program_dir: PathBuf,
        #[arg(long, short, help = "Model to use")]
        model: Option<String>,
        #[arg(long, short, help = "Only this function and its dependencies")]
        function: Option<String>,
        #[arg(long = "call-graph", short = 'g', help = "Call graph JSON file")]
        call_graph: Option<PathBuf>,
        #[arg(long, short, help = "Decompilations JSON file")]
        decompilations: Option<PathBuf>,
        #[arg(long, short, help = "Summaries JSONL file")]
        output: Option<PathBuf>,
        #[arg(long = "max-lines", short = 'l', help = "Starting chunk size in lines")]
        max_lines: Option<usize>,
        #[arg(long, help = "Completion service URL")]
        endpoint: Option<String>,
        #[arg(long = "max-retries", help = "Retries per request (default: unlimited)")]
        max_retries: Option<u32>,
        #[arg(long = "no-report", help = "Skip the HTML report")]
        no_report: bool,
        #[arg(long = "log-prompts", help = "Log every prompt and completion")]
        log_prompts: bool,
    },

    /// Print the processing order
    Order {
        program_dir: PathBuf,
        #[arg(long, short, help = "Only this function and its dependencies")]
        function: Option<String>,
        #[arg(long = "call-graph", short = 'g', help = "Call graph JSON file")]
        call_graph: Option<PathBuf>,
    },

    /// Print the call tree below a function
    Tree {
        program_dir: PathBuf,
        function: String,
        #[arg(long = "call-graph", short = 'g', help = "Call graph JSON file")]
        call_graph: Option<PathBuf>,
    },

    /// Render a summaries file as HTML
    Report {
        program_dir: PathBuf,
        #[arg(long, short, help = "Summaries JSONL file")]
        summaries: PathBuf,
        #[arg(long, short, help = "Decompilations JSON file")]
        decompilations: Option<PathBuf>,
        #[arg(long, short, help = "Output directory")]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "toml",
            help = "Output format: toml, json"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mfuncsum encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }

        eprintln!("\n\x1b[33mSummaries written so far are kept; rerun to resume.\x1b[0m");
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::Summarize {
            program_dir,
            model,
            function,
            call_graph,
            decompilations,
            output,
            max_lines,
            endpoint,
            max_retries,
            no_report,
            log_prompts,
        } => {
            funcsum::cli::commands::summarize::run(SummarizeOptions {
                program_dir,
                model,
                function,
                call_graph,
                decompilations,
                output,
                max_lines,
                endpoint,
                max_retries,
                no_report,
                log_prompts,
                verbose: cli.verbose,
                quiet: cli.quiet,
                config: cli.config.clone(),
            })?;
        }
        Commands::Order {
            program_dir,
            function,
            call_graph,
        } => {
            funcsum::cli::commands::graph::order(
                &program_dir,
                function.as_deref(),
                call_graph,
                config,
            )?;
        }
        Commands::Tree {
            program_dir,
            function,
            call_graph,
        } => {
            funcsum::cli::commands::graph::tree(&program_dir, &function, call_graph, config)?;
        }
        Commands::Report {
            program_dir,
            summaries,
            decompilations,
            output,
        } => {
            funcsum::cli::commands::report::run(
                &program_dir,
                &summaries,
                decompilations,
                output,
                config,
            )?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                funcsum::cli::commands::config::show(&format, config)?;
            }
            ConfigAction::Path => {
                funcsum::cli::commands::config::path()?;
            }
        },
    }

    Ok(())
}
