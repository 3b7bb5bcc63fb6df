//! Log setup
//!
//! The TUI owns stdout and stderr, so log events go to a file. The default
//! location is `apodsaver.log` in the XDG cache directory (`~/.cache/apodsaver/`
//! on Linux). The filter comes from `RUST_LOG`, defaulting to `apodsaver=info`.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::ProjectDirs;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "apodsaver=info";

/// Default log file location, if a cache directory can be determined
pub fn default_log_path() -> Option<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "apodsaver")?;
    Some(project_dirs.cache_dir().join("apodsaver.log"))
}

/// Opens `path` for appending, creating parent directories as needed
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global subscriber writing to `log_file` (or the default path)
///
/// # Returns
/// * `Ok(PathBuf)` - Where events are written
/// * `Err` - No usable path, the file could not be opened, or another global
///   subscriber is already installed; events do not reach the file
pub fn init(log_file: Option<PathBuf>) -> io::Result<PathBuf> {
    let path = log_file
        .or_else(default_log_path)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no cache directory for the log file"))?;
    let file = open_log_file(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::AlreadyExists, e))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_log_file_creates_directories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("nested").join("logs").join("apodsaver.log");

        open_log_file(&path).expect("open should succeed");

        assert!(path.exists(), "Log file should exist");
    }

    #[test]
    fn test_open_log_file_appends() {
        use std::io::Write;

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("apodsaver.log");

        writeln!(open_log_file(&path).unwrap(), "first").unwrap();
        writeln!(open_log_file(&path).unwrap(), "second").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_default_log_path_is_xdg_compliant() {
        if let Some(path) = default_log_path() {
            let path_str = path.to_string_lossy();
            assert!(path_str.contains("apodsaver"), "Log path should contain project name");
            assert!(path_str.ends_with("apodsaver.log"));
        }
        // Test passes if there is no home directory (e.g., in CI)
    }

    // the only test installing the global subscriber, so both calls live here
    #[test]
    fn test_init_reports_log_path_and_refuses_second_subscriber() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("init.log");

        let used = init(Some(path.clone())).expect("init should succeed");
        assert_eq!(used, path);
        assert!(path.exists());

        let err = init(Some(temp_dir.path().join("second.log"))).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }
}
