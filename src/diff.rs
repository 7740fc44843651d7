// src/diff.rs

//! # Diff Engine
//!
//! Compares a scan with the previous scan of the same target.
//!
//! With no previous scan there is no baseline: fields report "unchanged",
//! nothing is removed, and every infection is new.

use std::{collections::HashSet, fmt};

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::db::{Infection, Scan, StoreError};
use crate::report::context::ReportContext;

/// A comparable per-scan value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanField {
    InfectionsCount,
    DirsScanned,
    FilesScanned,
    DataScanned,
    DataRead,
    KnownViruses,
    EngineVersion,
}

impl ScanField {
    pub const ALL: [ScanField; 7] = [
        ScanField::InfectionsCount,
        ScanField::DirsScanned,
        ScanField::FilesScanned,
        ScanField::DataScanned,
        ScanField::DataRead,
        ScanField::KnownViruses,
        ScanField::EngineVersion,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ScanField::InfectionsCount => "Infected files",
            ScanField::DirsScanned => "Scanned directories",
            ScanField::FilesScanned => "Scanned files",
            ScanField::DataScanned => "Data scanned",
            ScanField::DataRead => "Data read",
            ScanField::KnownViruses => "Known viruses",
            ScanField::EngineVersion => "Engine version",
        }
    }

    /// `None` when the summary log did not provide the value.
    pub fn value(self, scan: &Scan) -> Option<FieldValue> {
        match self {
            ScanField::InfectionsCount => scan.infections_count.map(FieldValue::Count),
            ScanField::DirsScanned => scan.dirs_scanned.map(FieldValue::Count),
            ScanField::FilesScanned => scan.files_scanned.map(FieldValue::Count),
            ScanField::DataScanned => scan.data_scanned.map(FieldValue::Bytes),
            ScanField::DataRead => scan.data_read.map(FieldValue::Bytes),
            ScanField::KnownViruses => scan.known_viruses.map(FieldValue::Count),
            ScanField::EngineVersion => scan.engine_version.clone().map(FieldValue::Text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Count(i64),
    Bytes(f64),
    Text(String),
    Time(DateTime<Utc>),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Count(n) => write!(f, "{n}"),
            FieldValue::Bytes(b) => write!(f, "{b}"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Time(t) => write!(f, "{}", t.with_timezone(&Local).to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    /// The previous scan's value; `None` without a previous scan or when it
    /// left the field unset.
    pub previous: Option<FieldValue>,
    pub changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InfectionStatus {
    /// The file was already flagged by the previous scan.
    Unchanged,
    /// First appearance, or reappearance after a clean scan.
    Changed,
}

pub fn field_changed(
    ctx: &mut ReportContext<'_>,
    scan: &Scan,
    field: ScanField,
) -> Result<FieldChange, StoreError> {
    let Some(prev) = ctx.previous(scan)? else {
        return Ok(FieldChange { previous: None, changed: false });
    };
    let previous = field.value(prev);
    let changed = previous != field.value(scan);
    Ok(FieldChange { previous, changed })
}

/// Classify `file` by whether the previous scan flagged the same path.
pub fn infection_status(
    ctx: &mut ReportContext<'_>,
    scan: &Scan,
    file: &str,
) -> Result<InfectionStatus, StoreError> {
    let seen = match ctx.previous(scan)? {
        Some(prev) => prev.infected_files().any(|f| f == file),
        None => false,
    };
    Ok(if seen { InfectionStatus::Unchanged } else { InfectionStatus::Changed })
}

/// Previous-scan infections whose file is no longer flagged by `scan`.
pub fn removed_infections(
    ctx: &mut ReportContext<'_>,
    scan: &Scan,
) -> Result<Vec<Infection>, StoreError> {
    let Some(prev) = ctx.previous(scan)? else {
        return Ok(Vec::new());
    };
    let current: HashSet<&str> = scan.infected_files().collect();
    Ok(prev
        .infections
        .iter()
        .filter(|i| !current.contains(i.file.as_str()))
        .cloned()
        .collect())
}

/// `true` when `scan` links exactly the same infection rows as the previous
/// scan, in any order. Without a previous scan the baseline is empty.
pub fn infections_unchanged(
    ctx: &mut ReportContext<'_>,
    scan: &Scan,
) -> Result<bool, StoreError> {
    let current: HashSet<i64> = scan.infections.iter().map(|i| i.id).collect();
    let previous: HashSet<i64> = match ctx.previous(scan)? {
        Some(prev) => prev.infections.iter().map(|i| i.id).collect(),
        None => HashSet::new(),
    };
    Ok(current == previous)
}
