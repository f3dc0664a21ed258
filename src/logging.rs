//! File-based tracing setup.
//!
//! The alternate screen owns stdout, so diagnostics go to a log file under
//! the state dir. Filtering follows `EASEL_LOG` (tracing env-filter
//! syntax), defaulting to `info`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

pub fn init_file_logging(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter = EnvFilter::try_from_env("EASEL_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    // try_init: a second call (tests, or an embedding caller that already
    // installed a subscriber) keeps the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}
