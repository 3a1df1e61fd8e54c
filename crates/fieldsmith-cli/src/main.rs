//! Fieldsmith CLI - field specifications to validators and Zod source
//!
//! This is the main entry point for the `fieldsmith` binary, providing
//! commands to emit Zod modules, validate sample data, compare the emitted
//! source against the built-in validator, and run the golden corpus.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands, OutputFormat};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::path::PathBuf;
use std::process;
use tracing::instrument;
use tracing_appender::non_blocking::WorkerGuard;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Set up colored output
    control::set_override(cli.use_color());

    // Configuration feeds the logging setup, so it is loaded first
    let loaded = Config::load_with_file(cli.config.as_deref());
    let (config, loaded_from) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => exit_with(&e),
    };

    let _guard = match init_logging(&cli, &config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    match run(cli, config, loaded_from) {
        Ok(()) => {}
        Err(e) => {
            // flush file logs before exiting
            drop(_guard);
            exit_with(&e);
        }
    }
}

fn exit_with(e: &error::Error) -> ! {
    eprintln!("{}", error::format_error(e, control::SHOULD_COLORIZE.should_colorize()));

    if e.should_show_help() {
        eprintln!("\nFor more information, try '--help'");
    }

    process::exit(e.exit_code());
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
fn run(cli: Cli, config: Config, loaded_from: Option<PathBuf>) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let format = cli
        .output
        .or_else(|| OutputFormat::from_config(&config.output.format))
        .unwrap_or(OutputFormat::Human);
    let use_color = cli.use_color() && config.output.color;

    let mut output = OutputWriter::new(format, use_color, cli.quiet, cli.verbosity_level());
    if !config.output.progress {
        output = output.without_progress();
    }

    log_with_request_id!(
        info,
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        config = ?loaded_from,
        "Executing command"
    );

    match cli.command {
        Commands::Emit(args) => handlers::handle_emit(args, &config, &mut output),
        Commands::Check(args) => handlers::handle_check(args, &config, &mut output),
        Commands::Parity(args) => handlers::handle_parity(args, &config, &mut output),
        Commands::Lint(args) => handlers::handle_lint(args, &config, &mut output),
        Commands::Types(args) => handlers::handle_types(args, &mut output),
        Commands::Corpus(args) => handlers::handle_corpus(args, &config, &mut output),
        Commands::Config(args) => {
            handlers::handle_config(args, &config, loaded_from.as_deref(), &mut output)
        }
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<Option<WorkerGuard>> {
    let verbosity = cli.verbosity_level();
    let mut logging_config = LoggingConfig::from_verbosity(verbosity);

    logging_config.apply_file_config(&config.logging, verbosity)?;
    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
