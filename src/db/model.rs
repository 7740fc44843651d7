// src/db/model.rs

//! Persisted record types.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A de-duplicated `(file, signature)` finding shared by every scan that
/// reported it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Infection {
    pub id: i64,
    pub file: String,
    pub infection: String,
}

/// One completed scanner run over `dir`.
///
/// `id` is the insertion sequence number; together with `complete` it gives
/// every target's history a total order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scan {
    pub id: i64,
    pub start: DateTime<Utc>,
    pub complete: DateTime<Utc>,
    pub dir: String,
    pub infections_count: Option<i64>,
    pub dirs_scanned: Option<i64>,
    pub files_scanned: Option<i64>,
    /// Bytes.
    pub data_scanned: Option<f64>,
    /// Bytes.
    pub data_read: Option<f64>,
    pub known_viruses: Option<i64>,
    pub engine_version: Option<String>,
    /// Attached infections in the order their FOUND lines first appeared.
    pub infections: Vec<Infection>,
}

impl Scan {
    /// File paths flagged by this scan; a file carrying two signatures appears twice.
    pub fn infected_files(&self) -> impl Iterator<Item = &str> {
        self.infections.iter().map(|i| i.file.as_str())
    }
}
