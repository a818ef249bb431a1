//! Dresktop - Entry Point
//!
//! Operates containerized desktop environments and SSH cloud hosts:
//! infrastructure, commands, synchronization and deployments.

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};

use dresktop::app::cli::Cli;
use dresktop::app::run::run;
use dresktop::logs::{init_logging, LogOptions};
use dresktop::storage::layout::StorageLayout;
use dresktop::storage::settings::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let layout = match &cli.home {
        Some(home) => StorageLayout::new(home),
        None => StorageLayout::default(),
    };
    if let Err(e) = layout.setup().await {
        eprintln!("Unable to prepare {}: {e}", layout.base_dir.display());
        return ExitCode::FAILURE;
    }

    // Retrieve the settings file
    let settings = match Settings::load(&layout.settings_file()).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to read settings file: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level,
        json_format: settings.json_logs,
        log_dir: settings
            .log_to_file
            .then(|| layout.logs_dir().path().to_path_buf()),
        ..Default::default()
    };
    let _guard = match init_logging(log_options) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        }
    };

    debug!("Using data directory {}", layout.base_dir.display());
    match run(cli, layout, settings).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("Operation failed: {e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
