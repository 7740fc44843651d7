// tests/common/mod.rs
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use tempfile::TempDir;

use clamtrack::config::DatabaseConfig;
use clamtrack::db::{Scan, ScanStore};
use clamtrack::parser::{InfectionPair, ParsedSummary};

pub const TARGET: &str = "/home/alice";

/// Seconds since the epoch as a UTC timestamp.
pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).expect("valid timestamp")
}

/// A file-backed store in a fresh temp directory. Keep the `TempDir` alive.
pub fn temp_store() -> (TempDir, ScanStore) {
    let tmp = TempDir::new().expect("tempdir");
    let store = ScanStore::open(&tmp.path().join("scans.db"), &DatabaseConfig::default())
        .expect("open store");
    (tmp, store)
}

pub fn summary(known_viruses: i64, infections: &[(&str, &str)]) -> ParsedSummary {
    ParsedSummary {
        infections_count: Some(infections.len() as i64),
        dirs_scanned: Some(10),
        files_scanned: Some(200),
        data_scanned: Some(1_048_576.0),
        data_read: Some(1_048_576.0),
        known_viruses: Some(known_viruses),
        engine_version: Some("0.103.8".into()),
        infections: infections
            .iter()
            .map(|(file, name)| InfectionPair::new(*file, *name))
            .collect(),
    }
}

/// Record a one-minute scan of `dir` completing at `complete` seconds.
pub fn record(store: &mut ScanStore, dir: &str, complete: i64, parsed: &ParsedSummary) -> Scan {
    store
        .create_scan(at(complete - 60), at(complete), dir, parsed)
        .expect("create_scan")
}
