// src/config/loader.rs

//! # Configuration Loader
//!
//! Reads the TOML file, deserializes it into `RawConfig`, and resolves
//! relative paths and human-readable durations into the runtime `Config`.

use crate::clamtrack_log;
use crate::config::model::{
    Config, ConfigError, RawConfig, RawReportConfig, RawScanConfig, ReportConfig, ScanConfig,
};
use log::Level;
use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Load and parse the configuration from `path`.
/// Relative paths inside the file are resolved against the file's directory.
/// Logs at DEBUG before reading and INFO on success.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    clamtrack_log!(Level::Debug, "config", "Reading config from {:?}", path);
    let txt = fs::read_to_string(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let cfg = from_toml_str(&txt, base)?;
    clamtrack_log!(Level::Info, "config", "Loaded config from {:?}", path);
    Ok(cfg)
}

/// Parse configuration text, resolving relative paths against `base`.
pub fn from_toml_str(txt: &str, base: &Path) -> Result<Config, ConfigError> {
    let raw: RawConfig = toml::from_str(txt)?;
    let mut database = raw.database;
    database.path = resolve(base, &database.path).to_string_lossy().into_owned();

    Ok(Config {
        logging: raw.logging,
        database,
        scan: convert_scan(raw.scan, base)?,
        report: convert_report(raw.report, base)?,
    })
}

fn resolve(base: &Path, p: &str) -> PathBuf {
    let p = Path::new(p);
    if p.is_absolute() { p.to_path_buf() } else { base.join(p) }
}

/// Bare program names (`clamscan`) are left for `PATH` lookup.
fn resolve_program(base: &Path, p: &str) -> PathBuf {
    if p.contains('/') || p.contains('\\') { resolve(base, p) } else { PathBuf::from(p) }
}

fn convert_scan(raw: RawScanConfig, base: &Path) -> Result<ScanConfig, ConfigError> {
    if raw.dir.trim().is_empty() {
        return Err(ConfigError::EmptyScanDir);
    }
    // Reject bad ignore patterns here rather than halfway through a run.
    for pattern in &raw.ignores {
        Regex::new(pattern).map_err(|e| ConfigError::InvalidIgnore(pattern.clone(), e))?;
    }
    clamtrack_log!(
        Level::Debug,
        "config",
        "Scan target {:?}: {} exclude(s), {} ignore pattern(s)",
        raw.dir,
        raw.excludes.len(),
        raw.ignores.len()
    );
    Ok(ScanConfig {
        dir: raw.dir,
        clamscan: resolve_program(base, &raw.clamscan),
        freshclam: raw.freshclam.as_deref().map(|p| resolve_program(base, p)),
        log: resolve(base, &raw.log),
        excludes: raw.excludes,
        ignores: raw.ignores,
    })
}

fn convert_report(raw: RawReportConfig, base: &Path) -> Result<ReportConfig, ConfigError> {
    let window = humantime::parse_duration(&raw.window)
        .map_err(|e| ConfigError::InvalidDuration(raw.window.clone(), e))?;
    Ok(ReportConfig { path: resolve(base, &raw.path), window })
}
