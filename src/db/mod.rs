// src/db/mod.rs
//! Public façade for the scan history database.

pub mod connection;
pub mod model;
pub mod store;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use model::{Infection, Scan};
pub use store::ScanStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timestamp {0}µs is out of range")]
    InvalidTimestamp(i64),

    #[error("scan completed at {complete} before it started at {start}")]
    InvalidRange {
        start: DateTime<Utc>,
        complete: DateTime<Utc>,
    },
}
