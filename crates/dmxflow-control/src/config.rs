//! Startup configuration
//!
//! Read once at startup from a TOML file. The session never writes settings
//! back; [`DmxFlowConfig::save`] exists for generating a starting file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::cycle::CycleInterval;
use crate::{ControlError, Result};

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DmxFlowConfig {
    /// Serial port to open at startup
    pub port: Option<String>,
    /// Colour cycle step in milliseconds (minimum 100)
    pub cycle_interval_ms: u64,
    /// Start the colour cycle right after connecting
    pub start_cycle: bool,
    /// Logging settings
    pub log: LogConfig,
}

impl Default for DmxFlowConfig {
    fn default() -> Self {
        Self {
            port: None,
            cycle_interval_ms: CycleInterval::DEFAULT_MS,
            start_cycle: false,
            log: LogConfig::default(),
        }
    }
}

impl DmxFlowConfig {
    /// Default location: `<config dir>/DmxFlow/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("DmxFlow");
            p.push("config.toml");
            p
        })
    }

    /// Load and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load a config file, or defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Write the config as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Cycle interval with the usual fallback applied
    pub fn cycle_interval(&self) -> CycleInterval {
        CycleInterval::from_millis(i64::try_from(self.cycle_interval_ms).unwrap_or(i64::MAX))
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Log to stderr
    pub console_output: bool,
    /// Log to a file in `log_dir`
    pub file_output: bool,
    pub log_dir: PathBuf,
    /// Number of daily log files to keep
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
            log_dir: PathBuf::from("logs"),
            max_files: 10,
        }
    }
}

impl LogConfig {
    pub const FILE_PREFIX: &'static str = "dmxflow";
    pub const FILE_SUFFIX: &'static str = "log";

    /// Parse `level`, falling back to INFO
    pub fn parse_level(&self) -> tracing::Level {
        self.level.parse().unwrap_or(tracing::Level::INFO)
    }

    /// Daily log files `dmxflow.<date>.log` in `log_dir`.
    ///
    /// Files are opened in append mode, so a restart on the same day keeps
    /// the earlier output. Once more than `max_files` files exist, the oldest
    /// are removed when the appender rolls over to a new day.
    pub fn file_appender(&self) -> Result<RollingFileAppender> {
        fs::create_dir_all(&self.log_dir)?;
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(Self::FILE_PREFIX)
            .filename_suffix(Self::FILE_SUFFIX)
            .max_log_files(self.max_files.max(1))
            .build(&self.log_dir)
            .map_err(|e| ControlError::Logging(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DmxFlowConfig::default();
        assert_eq!(config.port, None);
        assert_eq!(config.cycle_interval().as_millis(), 1000);
        assert!(!config.start_cycle);
        assert_eq!(config.log.parse_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: DmxFlowConfig = toml::from_str("port = \"/dev/ttyUSB0\"").unwrap();
        assert_eq!(config.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(config.cycle_interval_ms, 1000);
        assert!(config.log.console_output);
    }

    #[test]
    fn test_short_interval_falls_back() {
        let config = DmxFlowConfig {
            cycle_interval_ms: 20,
            ..Default::default()
        };
        assert_eq!(config.cycle_interval().as_millis(), 1000);
    }

    #[test]
    fn test_bad_level_falls_back_to_info() {
        let log = LogConfig {
            level: "loud".to_string(),
            ..Default::default()
        };
        assert_eq!(log.parse_level(), tracing::Level::INFO);

        let log = LogConfig {
            level: "debug".to_string(),
            ..Default::default()
        };
        assert_eq!(log.parse_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = DmxFlowConfig {
            port: Some("COM4".to_string()),
            cycle_interval_ms: 250,
            start_cycle: true,
            ..Default::default()
        };
        config.save(&path).unwrap();

        let loaded = DmxFlowConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DmxFlowConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, DmxFlowConfig::default());
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "cycle_interval_ms = \"soon\"").unwrap();

        let err = DmxFlowConfig::load(&path).unwrap_err();
        assert!(matches!(err, crate::ControlError::Config(_)));
    }

    fn log_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with("dmxflow") && name.ends_with(".log"))
            .collect();
        names.sort();
        names
    }

    fn write_run(log: &LogConfig, line: &str) {
        let mut appender = log.file_appender().unwrap();
        writeln!(appender, "{}", line).unwrap();
        appender.flush().unwrap();
    }

    #[test]
    fn test_restart_appends_to_todays_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = LogConfig {
            file_output: true,
            log_dir: dir.path().join("logs"),
            ..Default::default()
        };

        write_run(&log, "first run");
        write_run(&log, "second run");

        let files = log_files(&log.log_dir);
        assert_eq!(files.len(), 1);
        let content = fs::read_to_string(log.log_dir.join(&files[0])).unwrap();
        assert!(content.contains("first run"));
        assert!(content.contains("second run"));
    }

    #[test]
    fn test_runs_on_different_days_keep_separate_files() {
        let dir = tempfile::tempdir().unwrap();
        let log = LogConfig {
            file_output: true,
            log_dir: dir.path().to_path_buf(),
            max_files: 3,
            ..Default::default()
        };
        // Left behind by a run on an earlier day
        let earlier = dir.path().join("dmxflow.2000-01-01.log");
        fs::write(&earlier, "earlier run\n").unwrap();

        write_run(&log, "today's run");

        let files = log_files(dir.path());
        assert_eq!(files.len(), 2, "{:?}", files);
        assert_eq!(fs::read_to_string(&earlier).unwrap(), "earlier run\n");
    }
}
