// src/db/store.rs

//! # Scan/Infection Store
//!
//! Sole owner of the `scans`, `infections` and `infections_scans` tables.
//! Everything outside this module reads through the queries below.
//!
//! **Responsibilities:**
//! - Create the schema when it is missing, without touching existing data.
//! - Persist a scan and all of its infection links in one transaction.
//! - Reuse an existing `infections` row for every `(file, signature)` pair
//!   seen before.
//! - Answer the ordered per-target history queries used by the navigator and
//!   the aggregator.

use std::{collections::HashSet, path::Path, time::Duration};

use chrono::{DateTime, Utc};
use log::Level;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::clamtrack_log;
use crate::config::DatabaseConfig;
use crate::parser::ParsedSummary;
use super::connection::{open_db_connection, open_in_memory};
use super::model::{Infection, Scan};
use super::StoreError;

const SCHEMA: &str = include_str!("../../resources/schema.sql");
const TABLES: [&str; 3] = ["scans", "infections", "infections_scans"];

const SCAN_COLUMNS: &str = "id, start, complete, dir, infections_count, dirs_scanned, \
                            files_scanned, data_scanned, data_read, known_viruses, engine_version";

pub struct ScanStore {
    conn: Connection,
}

impl ScanStore {
    /// Open (or create) the database file and make sure the schema exists.
    pub fn open(path: &Path, cfg: &DatabaseConfig) -> Result<Self, StoreError> {
        let store = Self { conn: open_db_connection(path, cfg)? };
        store.ensure_schema()?;
        clamtrack_log!(Level::Info, "store", "Database ready at {}", path.display());
        Ok(store)
    }

    /// Throwaway database, used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self { conn: open_in_memory()? };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Create any missing table. Returns `true` when the schema script ran.
    pub fn ensure_schema(&self) -> Result<bool, StoreError> {
        let mut missing = 0;
        for table in TABLES {
            let found: i64 = self.conn.query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |r| r.get(0),
            )?;
            if found == 0 {
                missing += 1;
            }
        }

        if missing == 0 {
            clamtrack_log!(Level::Info, "store", "Database contains {} scans", self.scan_count()?);
            return Ok(false);
        }
        clamtrack_log!(Level::Info, "store", "Initializing db schema ({} table(s) missing)", missing);
        self.conn.execute_batch(SCHEMA)?;
        Ok(true)
    }

    /// Persist a new scan built from `parsed`.
    ///
    /// The scan row, any new infection rows and every link are written in a
    /// single transaction. `infections_count` is stored as the number of
    /// distinct links so it always agrees with the attached set.
    pub fn create_scan(
        &mut self,
        start: DateTime<Utc>,
        complete: DateTime<Utc>,
        dir: &str,
        parsed: &ParsedSummary,
    ) -> Result<Scan, StoreError> {
        if complete < start {
            return Err(StoreError::InvalidRange { start, complete });
        }

        let distinct = parsed.infections.iter().collect::<HashSet<_>>().len() as i64;
        let infections_count = parsed.infections_count.map(|reported| {
            if reported != distinct {
                clamtrack_log!(
                    Level::Warn,
                    "store",
                    "Log reports {} infected file(s) but {} distinct finding(s) survived filtering",
                    reported,
                    distinct
                );
            }
            distinct
        });

        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO scans (start, complete, dir, infections_count, dirs_scanned, files_scanned, \
                                data_scanned, data_read, known_viruses, engine_version) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                start.timestamp_micros(),
                complete.timestamp_micros(),
                dir,
                infections_count,
                parsed.dirs_scanned,
                parsed.files_scanned,
                parsed.data_scanned,
                parsed.data_read,
                parsed.known_viruses,
                parsed.engine_version,
            ],
        )?;
        let scan_id = tx.last_insert_rowid();

        let mut infections = Vec::with_capacity(distinct as usize);
        let mut reused = 0usize;
        {
            let mut find = tx.prepare_cached(
                "SELECT id FROM infections WHERE file = ?1 AND infection = ?2",
            )?;
            let mut insert = tx.prepare_cached(
                "INSERT INTO infections (file, infection) VALUES (?1, ?2)",
            )?;
            let mut link = tx.prepare_cached(
                "INSERT OR IGNORE INTO infections_scans (scan_id, infection_id, position) \
                 VALUES (?1, ?2, ?3)",
            )?;

            for (position, pair) in parsed.infections.iter().enumerate() {
                let existing: Option<i64> = find
                    .query_row(params![pair.file, pair.infection], |r| r.get(0))
                    .optional()?;
                let infection_id = match existing {
                    Some(id) => {
                        reused += 1;
                        id
                    }
                    None => {
                        insert.execute(params![pair.file, pair.infection])?;
                        tx.last_insert_rowid()
                    }
                };
                // Duplicate FOUND lines resolve to the same row and link once.
                if link.execute(params![scan_id, infection_id, position as i64])? == 1 {
                    infections.push(Infection {
                        id: infection_id,
                        file: pair.file.clone(),
                        infection: pair.infection.clone(),
                    });
                }
            }
        }
        tx.commit()?;

        clamtrack_log!(
            Level::Info,
            "store",
            "Saved scan #{} of {:?}: {} infection(s), {} reused",
            scan_id,
            dir,
            infections.len(),
            reused
        );

        Ok(Scan {
            id: scan_id,
            start: from_micros(start.timestamp_micros())?,
            complete: from_micros(complete.timestamp_micros())?,
            dir: dir.to_owned(),
            infections_count,
            dirs_scanned: parsed.dirs_scanned,
            files_scanned: parsed.files_scanned,
            data_scanned: parsed.data_scanned,
            data_read: parsed.data_read,
            known_viruses: parsed.known_viruses,
            engine_version: parsed.engine_version.clone(),
            infections,
        })
    }

    pub fn find_by_id(&self, id: i64) -> Result<Option<Scan>, StoreError> {
        let sql = format!("SELECT {SCAN_COLUMNS} FROM scans WHERE id = ?1");
        self.query_one(&sql, params![id])
    }

    /// Most recently completed scan of `dir`.
    pub fn find_latest(&self, dir: &str) -> Result<Option<Scan>, StoreError> {
        let sql = format!(
            "SELECT {SCAN_COLUMNS} FROM scans WHERE dir = ?1 \
             ORDER BY complete DESC, id DESC LIMIT 1"
        );
        self.query_one(&sql, params![dir])
    }

    /// The scan of `dir` ordered immediately before `(complete, id)`.
    /// Equal completion times fall back to insertion order.
    pub fn find_before(
        &self,
        dir: &str,
        complete: DateTime<Utc>,
        id: i64,
    ) -> Result<Option<Scan>, StoreError> {
        let sql = format!(
            "SELECT {SCAN_COLUMNS} FROM scans \
             WHERE dir = ?1 AND (complete < ?2 OR (complete = ?2 AND id < ?3)) \
             ORDER BY complete DESC, id DESC LIMIT 1"
        );
        self.query_one(&sql, params![dir, complete.timestamp_micros(), id])
    }

    /// Scans of `dir` completed in `(reference.complete - window, reference.complete]`,
    /// oldest first.
    pub fn find_in_window(
        &self,
        dir: &str,
        reference: &Scan,
        window: Duration,
    ) -> Result<Vec<Scan>, StoreError> {
        let upper = reference.complete.timestamp_micros();
        let span = i64::try_from(window.as_micros()).unwrap_or(i64::MAX);
        let lower = upper.saturating_sub(span);

        let sql = format!(
            "SELECT {SCAN_COLUMNS} FROM scans \
             WHERE dir = ?1 AND complete > ?2 AND complete <= ?3 \
             ORDER BY complete ASC, id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut scans = stmt
            .query_map(params![dir, lower, upper], scan_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        for scan in &mut scans {
            scan.infections = self.infections_for(scan.id)?;
        }
        clamtrack_log!(
            Level::Debug,
            "store",
            "Window of {:?} ending at scan #{}: {} scan(s)",
            window,
            reference.id,
            scans.len()
        );
        Ok(scans)
    }

    /// Infections attached to `scan_id`, in log order.
    pub fn infections_for(&self, scan_id: i64) -> Result<Vec<Infection>, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT i.id, i.file, i.infection FROM infections i \
             JOIN infections_scans s ON s.infection_id = i.id \
             WHERE s.scan_id = ?1 ORDER BY s.position",
        )?;
        let rows = stmt
            .query_map([scan_id], |r| {
                Ok(Infection { id: r.get(0)?, file: r.get(1)?, infection: r.get(2)? })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn scan_count(&self) -> Result<i64, StoreError> {
        Ok(self.conn.query_row("SELECT COUNT(*) FROM scans", [], |r| r.get(0))?)
    }

    pub fn infection_count(&self) -> Result<i64, StoreError> {
        Ok(self.conn.query_row("SELECT COUNT(*) FROM infections", [], |r| r.get(0))?)
    }

    fn query_one(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Option<Scan>, StoreError> {
        let scan = self.conn.query_row(sql, params, scan_from_row).optional()?;
        match scan {
            Some(mut scan) => {
                scan.infections = self.infections_for(scan.id)?;
                Ok(Some(scan))
            }
            None => Ok(None),
        }
    }
}

fn from_micros(us: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_micros(us).ok_or(StoreError::InvalidTimestamp(us))
}

/// Map a `SCAN_COLUMNS` row; infections are filled in by the caller.
fn scan_from_row(r: &Row<'_>) -> rusqlite::Result<Scan> {
    let ts = |idx: usize| -> rusqlite::Result<DateTime<Utc>> {
        let us: i64 = r.get(idx)?;
        DateTime::from_timestamp_micros(us).ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, us))
    };
    Ok(Scan {
        id: r.get(0)?,
        start: ts(1)?,
        complete: ts(2)?,
        dir: r.get(3)?,
        infections_count: r.get(4)?,
        dirs_scanned: r.get(5)?,
        files_scanned: r.get(6)?,
        data_scanned: r.get(7)?,
        data_read: r.get(8)?,
        known_viruses: r.get(9)?,
        engine_version: r.get(10)?,
        infections: Vec::new(),
    })
}
