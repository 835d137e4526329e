mod ansi;
mod clock;
mod config;
mod coordinator;
mod display;
mod glyph;
mod screen;
mod signals;
mod state;
mod stats;
mod terminal;
mod worker;

use clap::Parser;
use config::{ClockConfig, Overrides};
use state::ClockColor;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// A large terminal clock with live CPU usage: Ctrl-C cycles the color,
/// Ctrl-\ toggles 12/24-hour format, Enter exits.
#[derive(Parser, Debug)]
#[command(name = "bigclock", version, about)]
pub struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "clock.toml")]
    config: PathBuf,

    /// Refresh interval in milliseconds (overrides config)
    #[arg(short, long, value_name = "MS")]
    interval: Option<u64>,

    /// Start in 12-hour format
    #[arg(long)]
    twelve_hour: bool,

    /// Initial color: default, red or green (overrides config)
    #[arg(long)]
    color: Option<ClockColor>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Validate config and print resolved settings, don't run
    #[arg(long)]
    dry_run: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

/// The screen belongs to the clock, so logs never go to stdout.
fn init_logging(cli: &Cli) -> Result<(), String> {
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false);

    match &cli.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| format!("failed to open log file {}: {e}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<ClockConfig, config::ConfigError> {
    let mut config = ClockConfig::load(&cli.config)?;
    config.apply(&Overrides {
        refresh_interval_ms: cli.interval,
        twelve_hour: cli.twelve_hour,
        color: cli.color,
    });
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    tracing::debug!(?cli, "parsed CLI arguments");

    let config = match resolve_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.dry_run {
        match toml::to_string_pretty(&config) {
            Ok(text) => {
                println!("# resolved from {}", cli.config.display());
                print!("{text}");
                return ExitCode::SUCCESS;
            }
            Err(e) => {
                eprintln!("Error: failed to render config: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    match coordinator::run(&config).await {
        Ok(failures) => {
            for failure in &failures {
                eprintln!("Warning: {failure}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "clock failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
