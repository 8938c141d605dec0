//! Runtime settings resolution for the CLI.
//!
//! Explicit flags (or their environment variables, handled by clap) win;
//! anything left unset falls back to the platform data directory.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const DATA_FILE_NAME: &str = "epicboard.json";
const LOG_DIR_NAME: &str = "logs";

/// Fully resolved CLI settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub data_file: PathBuf,
    /// `None` when logging is disabled.
    pub logging: Option<LogSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    /// Always absolute.
    pub dir: PathBuf,
}

impl Settings {
    pub fn resolve(
        data_file: Option<PathBuf>,
        log_dir: Option<PathBuf>,
        log_level: Option<String>,
        no_log: bool,
    ) -> Result<Self> {
        let data_file = match data_file {
            Some(path) => path,
            None => data_dir()?.join(DATA_FILE_NAME),
        };

        let logging = if no_log {
            None
        } else {
            let dir = match log_dir {
                Some(path) => absolutize(&path)?,
                None => data_dir()?.join(LOG_DIR_NAME),
            };
            let level = log_level
                .unwrap_or_else(|| epicboard_core::default_log_level().to_string());
            Some(LogSettings { level, dir })
        };

        Ok(Self { data_file, logging })
    }
}

fn data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "epicboard")
        .context("could not determine a data directory; pass --data-file and --log-dir")?;
    Ok(dirs.data_dir().to_path_buf())
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::Settings;
    use std::path::PathBuf;

    #[test]
    fn explicit_values_are_used_as_given() {
        let dir = tempfile::tempdir().unwrap();
        let data_file = dir.path().join("board.json");
        let log_dir = dir.path().join("logs");

        let settings = Settings::resolve(
            Some(data_file.clone()),
            Some(log_dir.clone()),
            Some("warn".to_string()),
            false,
        )
        .unwrap();

        assert_eq!(settings.data_file, data_file);
        let logging = settings.logging.unwrap();
        assert_eq!(logging.dir, log_dir);
        assert_eq!(logging.level, "warn");
    }

    #[test]
    fn no_log_skips_log_settings() {
        let settings =
            Settings::resolve(Some(PathBuf::from("board.json")), None, None, true).unwrap();

        assert_eq!(settings.data_file, PathBuf::from("board.json"));
        assert!(settings.logging.is_none());
    }

    #[test]
    fn relative_log_dir_becomes_absolute() {
        let settings = Settings::resolve(
            Some(PathBuf::from("board.json")),
            Some(PathBuf::from("logs")),
            None,
            false,
        )
        .unwrap();

        let logging = settings.logging.unwrap();
        assert!(logging.dir.is_absolute());
        assert!(logging.dir.ends_with("logs"));
        assert_eq!(logging.level, epicboard_core::default_log_level());
    }
}
