//! gozig CLI binary
//!
//! ```bash
//! # Transpile the module in the current directory into ./.zig
//! gz build
//!
//! # Transpile the test variants and run them with Zig
//! gz test ./hello && (cd ./hello/.zig && zig build test)
//!
//! # Use recorded package dumps and show escape verdicts
//! gz build ./hello --snapshot ./dumps --escapes
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use gz_cli::{
    commands::{self, BuildArgs},
    diagnostics::{render_cli_error, setup_error_reporting},
    GzConfig, Result,
};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "gz",
    version = env!("CARGO_PKG_VERSION"),
    about = "Transpiles Go packages to Zig source"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (use multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Set log level (overrides --verbose/--quiet)
    #[arg(long, global = true, value_enum)]
    log: Option<LogLevel>,

    /// Set log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    directory: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Transpile a Go module
    Build(BuildArgs),

    /// Transpile the test variants of a Go module
    Test(BuildArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_error_reporting()?;
    setup_logging(cli.verbose, cli.quiet, cli.log, cli.log_format);

    if let Some(dir) = &cli.directory {
        std::env::set_current_dir(dir)?;
    }

    let result = match GzConfig::load(cli.config.as_deref()) {
        Ok(config) => match cli.command {
            Commands::Build(args) => commands::build_command(args, &config).await,
            Commands::Test(args) => commands::test_command(args, &config).await,
        },
        Err(err) => Err(err),
    };

    match result {
        Ok(summary) => {
            info!(
                "wrote {} package(s) to {}",
                summary.packages.len(),
                summary.output.display()
            );
            Ok(())
        }
        Err(e) => {
            render_cli_error(&e);
            if cli.verbose > 0 {
                error!(?e, "detailed error context");
            }
            eprintln!("{:?}", miette::Report::new(e));
            std::process::exit(1);
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool, log_level: Option<LogLevel>, log_format: LogFormat) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if let Some(level) = log_level {
        EnvFilter::new(match level {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        })
    } else if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let formatter = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_level(true);

    match log_format {
        LogFormat::Pretty => {
            tracing_subscriber::registry().with(formatter).with(filter).init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry().with(formatter.json()).with(filter).init();
        }
    }
}
