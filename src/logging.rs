//! Log setup.
//!
//! The terminal belongs to the UI, so everything goes to a daily rolling file
//! under the state directory. `PLAYDECK_LOG` overrides the configured level.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{LoggingSettings, default_state_dir};

const LOG_ENV: &str = "PLAYDECK_LOG";
const LOG_FILE: &str = "playdeck.log";

/// Where log files go: the configured directory, else the XDG state dir.
pub fn log_dir(settings: &LoggingSettings) -> Option<PathBuf> {
    settings.directory.clone().or_else(default_state_dir)
}

/// Filter from `PLAYDECK_LOG`, falling back to the configured level and then `info`.
pub fn build_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber.
///
/// Returns the writer guard, which must live until the process exits so
/// buffered lines get flushed. A failure here is reported on stderr and the
/// player runs without logs.
pub fn init_logging(settings: &LoggingSettings) -> Option<WorkerGuard> {
    let Some(dir) = log_dir(settings) else {
        eprintln!("playdeck: no log directory (HOME unset), logging disabled");
        return None;
    };
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("playdeck: cannot create {}: {e}, logging disabled", dir.display());
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(&dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(build_filter(settings))
        .finish();

    match tracing::subscriber::set_global_default(subscriber) {
        Ok(()) => Some(guard),
        Err(e) => {
            eprintln!("playdeck: failed to install logger: {e}");
            None
        }
    }
}
