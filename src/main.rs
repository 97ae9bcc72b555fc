use clap::Parser;
use datamgr::{
    app::config::Config,
    cli::{self, handler::Context, Cli, Commands},
    transfer::progress::CancelFlag,
};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;

fn main() {
    // Parse CLI arguments first to get verbose flag and config override
    let cli = Cli::parse();

    // Set config directory override before anything resolves paths
    if let Some(ref config_dir) = cli.config {
        datamgr::util::paths::set_config_dir_override(Some(config_dir.clone()));
    }

    // Get logs directory (creates if needed)
    let logs_dir = datamgr::util::paths::get_logs_dir().unwrap_or_else(|_| PathBuf::from("."));
    std::fs::create_dir_all(&logs_dir).ok();

    // Set up daily rotating file appender (app.jsonl.YYYY-MM-DD)
    let file_appender = tracing_appender::rolling::daily(&logs_dir, "app.jsonl");
    let (non_blocking, log_guard) = tracing_appender::non_blocking(file_appender);

    // Set log level based on verbose flag
    let log_level = if cli.verbose {
        tracing::Level::TRACE
    } else {
        tracing::Level::INFO
    };

    // Initialize logging with JSON format for structured logs
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(tracing_subscriber::filter::LevelFilter::from_level(
                    log_level,
                )),
        )
        .init();

    tracing::info!("Starting datamgr...");
    if cli.verbose {
        tracing::info!("Verbose logging enabled (TRACE level)");
    }
    tracing::trace!("CLI arguments: {:?}", cli);
    if let Some(ref config_dir) = cli.config {
        tracing::info!("Using config directory override: {:?}", config_dir);
    }

    // Load configuration, falling back to defaults if it is unreadable or invalid
    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load configuration, using defaults: {:#}", e);
        eprintln!("Warning: {:#}; using default settings", e);
        Config::default()
    });
    tracing::info!("Config loaded: {:?}", config);

    // Ctrl-C raises the shared flag; engines stop at the next chunk or file
    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Interrupt received");
        handler_flag.raise();
    }) {
        tracing::warn!("Failed to install Ctrl-C handler: {}", e);
    }

    // Interactive drop session when no subcommand is given
    let command = cli.command.unwrap_or(Commands::Drop {
        dest: None,
        move_items: false,
        max_attempts: None,
    });

    let ctx = Context::new(config, cancel);
    let exit_code = cli::handler::handle_command(command, &ctx);
    tracing::info!("Exiting with code {}", exit_code);

    // Flush the non-blocking log writer before exiting
    drop(log_guard);
    std::process::exit(exit_code);
}
