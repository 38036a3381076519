/// Tracing setup.
///
/// The terminal is in raw mode on the alternate screen while the game runs,
/// so log lines go to `keybound.log` instead of stderr. Filter with the
/// `KEYBOUND_LOG` env var (same syntax as `RUST_LOG`), default `info`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::filter::{EnvFilter, LevelFilter};

pub const LOG_FILE: &str = "keybound.log";
const LOG_ENV: &str = "KEYBOUND_LOG";

/// Install the global subscriber. Logging stays off if the file can't be opened.
pub fn init(dir: &Path) {
    let path = dir.join(LOG_FILE);
    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(_) => return,
    };

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var(LOG_ENV)
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init();
}
