// src/runner.rs

//! Thin wrapper around the `freshclam` and `clamscan` executables.

use std::{
    fs,
    path::PathBuf,
    process::{Command, ExitStatus},
};

use chrono::{DateTime, Utc};
use log::Level;
use thiserror::Error;

use crate::clamtrack_log;
use crate::config::ScanConfig;

/// `clamscan` exit status when at least one file was infected.
const CLAMSCAN_VIRUS_FOUND: i32 = 1;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to launch {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{program:?} exited with {status}")]
    Failed { program: PathBuf, status: ExitStatus },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Timing and log location of one finished `clamscan` run.
#[derive(Debug, Clone)]
pub struct ScanRun {
    pub start: DateTime<Utc>,
    pub complete: DateTime<Utc>,
    pub log_path: PathBuf,
}

/// Run `freshclam` when one is configured. Returns whether it ran cleanly.
pub fn update_definitions(cfg: &ScanConfig) -> bool {
    let Some(freshclam) = &cfg.freshclam else {
        clamtrack_log!(Level::Debug, "runner", "No freshclam configured, skipping update");
        return false;
    };
    clamtrack_log!(Level::Info, "runner", "freshclam: start");
    match Command::new(freshclam).arg("--quiet").status() {
        Ok(status) if status.success() => {
            clamtrack_log!(Level::Info, "runner", "freshclam: complete");
            true
        }
        Ok(status) => {
            clamtrack_log!(Level::Warn, "runner", "freshclam exited with {}", status);
            false
        }
        Err(e) => {
            clamtrack_log!(Level::Warn, "runner", "freshclam could not be started: {}", e);
            false
        }
    }
}

/// `--exclude` regex for the configured extensions, e.g. `\.(mp3|avi)$`.
pub fn exclude_pattern(extensions: &[String]) -> Option<String> {
    if extensions.is_empty() {
        return None;
    }
    let alternatives: Vec<String> = extensions.iter().map(|e| regex::escape(e)).collect();
    Some(format!(r"\.({})$", alternatives.join("|")))
}

/// Scan `cfg.dir` recursively, writing the report to `cfg.log`.
pub fn run_scan(cfg: &ScanConfig) -> Result<ScanRun, RunnerError> {
    if let Some(parent) = cfg.log.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    // clamscan appends; a stale log would be parsed twice.
    if cfg.log.exists() {
        fs::remove_file(&cfg.log)?;
    }

    let mut cmd = Command::new(&cfg.clamscan);
    cmd.arg("-r").arg("--quiet").arg(format!("--log={}", cfg.log.display()));
    if let Some(pattern) = exclude_pattern(&cfg.excludes) {
        cmd.arg(format!("--exclude={pattern}"));
    }
    cmd.arg(&cfg.dir);

    clamtrack_log!(Level::Info, "runner", "clamscan: start ({:?})", cfg.dir);
    let start = Utc::now();
    let status = cmd.status().map_err(|source| RunnerError::Spawn {
        program: cfg.clamscan.clone(),
        source,
    })?;
    let complete = Utc::now();

    if !status.success() && status.code() != Some(CLAMSCAN_VIRUS_FOUND) {
        return Err(RunnerError::Failed { program: cfg.clamscan.clone(), status });
    }
    clamtrack_log!(
        Level::Info,
        "runner",
        "clamscan: complete in {}s (exit {:?})",
        (complete - start).num_seconds(),
        status.code()
    );
    Ok(ScanRun { start, complete, log_path: cfg.log.clone() })
}
