use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::io::IsTerminal;
use std::path::PathBuf;

mod cli;
mod config;
mod event;
mod options;
mod render;
mod session;
mod severity;
mod transport;

use cli::Cli;
use config::{Config, LogLevel};
use options::RenderConfig;
use session::Session;
use transport::StreamTarget;

fn setup_logging(log_level: &LogLevel) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("evmon")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("evmon.log");

    // Stdout carries rendered events, so diagnostics go to a file
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
        builder.filter_level(log_level.as_filter());
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

fn run(cli: Cli, config: Config) -> Result<()> {
    // Validate everything before touching the remote
    let render_config = RenderConfig::from_options(cli.monitor_options())?;
    let (name, remote) = config.resolve_remote(cli.target.as_deref())?;
    let target = StreamTarget::from_remote(&name, &remote)?;

    let rt = tokio::runtime::Runtime::new().context("Failed to create tokio runtime")?;
    let color = std::io::stdout().is_terminal();

    let result = rt.block_on(async {
        Session::new(&target, &render_config)
            .with_color(color)
            .run(std::io::stdout())
            .await
    });

    // A reader blocked on stdin must not hold up exit
    rt.shutdown_background();
    result
}

fn main() -> Result<()> {
    // Parse CLI arguments first
    let cli = Cli::parse();

    // Load configuration (before logging, so log messages in Config::load are silent)
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(&config.log_level).context("Failed to setup logging")?;

    info!("Starting evmon with config from: {:?}", cli.config);

    run(cli, config)
}
