// src/config/model.rs

use serde::Deserialize;
use std::{path::PathBuf, time::Duration};
use thiserror::Error;

/// Top-level runtime config
#[derive(Debug, Clone)]
pub struct Config {
    pub logging:  LoggingConfig,
    pub database: DatabaseConfig,
    pub scan:     ScanConfig,
    pub report:   ReportConfig,
}

/// Mirror of the whole TOML file, before paths and durations are resolved
#[derive(Debug, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub logging:  LoggingConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub scan:     RawScanConfig,
    #[serde(default)]
    pub report:   RawReportConfig,
}

/// Mirror of the `[logging]` table
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]            pub enable: bool,
    #[serde(default)]            pub file:   Option<String>,
    #[serde(default = "default_level")] pub level: String,
}
fn default_level() -> String { "INFO".into() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { enable: false, file: None, level: default_level() }
    }
}

/// Mirror of the `[database]` table
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path:            String,
    #[serde(default = "default_synchronous")]
    pub synchronous:     String,
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u64,
}
fn default_db_path() -> String { "clamtrack.db".into() }
fn default_synchronous() -> String { "NORMAL".into() }
fn default_busy_timeout() -> u64 { 1_000 }

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path:            default_db_path(),
            synchronous:     default_synchronous(),
            busy_timeout_ms: default_busy_timeout(),
        }
    }
}

/// Mirror of the `[scan]` table
#[derive(Debug, Deserialize)]
pub struct RawScanConfig {
    pub dir:       String,
    #[serde(default = "default_clamscan")]
    pub clamscan:  String,
    #[serde(default)]
    pub freshclam: Option<String>,
    #[serde(default = "default_scan_log")]
    pub log:       String,
    #[serde(default)]
    pub excludes:  Vec<String>,
    #[serde(default)]
    pub ignores:   Vec<String>,
}
fn default_clamscan() -> String { "clamscan".into() }
fn default_scan_log() -> String { "logs/clamscan.log".into() }

/// Mirror of the `[report]` table
#[derive(Debug, Deserialize)]
pub struct RawReportConfig {
    #[serde(default = "default_report_path")]
    pub path:   String,
    #[serde(default = "default_window")]
    pub window: String,
}
fn default_report_path() -> String { "clamtrack-report.json".into() }
fn default_window() -> String { "30days".into() }

impl Default for RawReportConfig {
    fn default() -> Self {
        Self { path: default_report_path(), window: default_window() }
    }
}

/// Fully-typed scanner settings
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Target directory; identifies the history a scan belongs to.
    pub dir:       String,
    pub clamscan:  PathBuf,
    pub freshclam: Option<PathBuf>,
    pub log:       PathBuf,
    /// File extensions handed to `clamscan --exclude`.
    pub excludes:  Vec<String>,
    /// Regex patterns of log lines dropped before parsing.
    pub ignores:   Vec<String>,
}

/// Fully-typed report settings
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub path:   PathBuf,
    /// Length of the trailing window used for chart series.
    pub window: Duration,
}

/// All the ways config loading can go wrong
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid duration '{0}': {1}")]
    InvalidDuration(String, #[source] humantime::DurationError),

    #[error("invalid ignore pattern '{0}': {1}")]
    InvalidIgnore(String, #[source] regex::Error),

    #[error("scan directory must not be empty")]
    EmptyScanDir,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
