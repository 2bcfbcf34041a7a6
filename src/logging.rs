use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "workshift.log";

/// Route `tracing` output to `<log_dir>/workshift.log`.
///
/// The terminal belongs to the TUI, so nothing is written to stdout or stderr.
/// `RUST_LOG` takes precedence over `level`. Returns the log file path.
pub fn init(log_dir: &Path, level: &str) -> std::io::Result<PathBuf> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_log_file_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = init(&dir.path().join("logs"), "debug").unwrap();
        assert!(path.exists());
        assert_eq!(path.file_name().unwrap(), LOG_FILE);
    }
}
