//! journ - a command-line client for a journ journaling server.
//!
//! Keeps the login session between runs and lets you write, browse and
//! summarize journal entries from the terminal.

mod app;
mod cli;
mod render;

use std::io;
use std::path::Path;

use clap::Parser;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use journ_core::config::Config;

use app::App;
use cli::Cli;

/// Log file written in the data directory
const LOG_FILE: &str = "journ.log";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr and, when the data directory is writable, to a log
/// file there. The returned guard flushes the file writer on drop.
fn init_tracing(data_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match data_dir.filter(|dir| std::fs::create_dir_all(dir).is_ok()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let loaded = Config::load();
    let mut config = match loaded {
        Ok(ref config) => config.clone(),
        Err(_) => Config::default(),
    };
    if let Some(url) = cli.base_url.clone() {
        config.base_url = url;
    }

    let guard = init_tracing(config.data_dir().ok().as_deref());
    if let Err(e) = loaded {
        warn!(error = %e, "Failed to load config, using defaults");
    }
    info!(base_url = %config.base_url, "journ starting");

    let result = match App::new(config).await {
        Ok(mut app) => app.run(cli.command).await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        render::print_error(&e);
        drop(guard);
        std::process::exit(1);
    }
}
