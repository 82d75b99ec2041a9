use log::{error, info};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub mod commands;
pub mod config;
pub mod db;
pub mod error;
pub mod shelf;
pub mod store;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use commands::{App, EventOutcome, UiEvent};
pub use config::AppConfig;
pub use db::{Blob, Database, FileRecord, IncomingFile};
pub use error::{ConfigError, StorageError, UploadError};
pub use store::FileStore;

use shelf::TempRefs;
use ui::ConsoleUi;

// Log lines share the terminal with the console
const DEFAULT_LOG_FILTER: &str = "warn";

fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn init_logging() {
    // `log` records from the library are forwarded through the tracing-log bridge
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() -> ExitCode {
    init_logging();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            eprintln!("blobshelf: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize database in the data directory
    if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
        eprintln!(
            "blobshelf: failed to create data dir {}: {}",
            config.data_dir.display(),
            e
        );
        return ExitCode::FAILURE;
    }
    let db_path = config.database_path();
    info!("Using file database {}", db_path.display());

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("blobshelf: failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let store = Arc::new(Database::new(db_path.to_string_lossy().into_owned()));
    let console = Arc::new(ConsoleUi::stdio(config.download_dir.clone()));
    let app = App::new(store, console.clone(), TempRefs::new(config.release_delay()));

    match runtime.block_on(ui::console::run_session(&app, &console)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("blobshelf: console error: {}", e);
            ExitCode::FAILURE
        }
    }
}
