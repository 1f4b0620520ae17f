use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;
mod commands;
mod config;
mod dispatch;
mod incident;
mod model;
mod persona;
mod session;

use cli::{Cli, Commands};
use config::{Config, LogLevel};

fn setup_logging(log_level: LogLevel) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("warroom")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("warroom.log");

    // The console belongs to the conversation, so logs only go to the file
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG env var takes precedence, otherwise use config log_level
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(log_level.to_level_filter());
    }

    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    info!(
        "Log level: {} (from {})",
        log_level.as_filter(),
        if std::env::var("RUST_LOG").is_ok() { "RUST_LOG env" } else { "config" }
    );
    Ok(())
}

/// `--quiet` wins over `--verbose`; neither keeps the configured level
fn effective_log_level(cli: &Cli, configured: LogLevel) -> LogLevel {
    if cli.quiet {
        LogLevel::Error
    } else if cli.verbose {
        LogLevel::Debug
    } else {
        configured
    }
}

fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        None => commands::chat::run(Default::default(), &config, cli.quiet),
        Some(Commands::Chat(args)) => commands::chat::run(args, &config, cli.quiet),
        Some(Commands::Agents { format }) => commands::agents::run(cli::OutputFormat::resolve(format), &config),
        Some(Commands::Incidents { format }) => commands::incidents::run(cli::OutputFormat::resolve(format)),
        Some(Commands::Completions { shell }) => commands::completions::run(shell),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration (before logging, so log messages in Config::load are silent)
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let log_level = effective_log_level(&cli, config.log_level);
    setup_logging(log_level).context("Failed to setup logging")?;

    info!("Starting warroom with config from: {:?}", cli.config);

    run(cli, config).context("Command failed")?;

    Ok(())
}
