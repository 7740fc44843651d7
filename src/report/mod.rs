// src/report/mod.rs

//! # Report Data
//!
//! Collects everything the HTML renderer displays for one scan: current
//! values, previous values with change flags, infections with their status,
//! removed infections and the chart series. The renderer only lays these out.

pub mod context;
pub mod format;

use std::{fs, path::Path, time::Duration};

use chrono::{DateTime, Utc};
use log::Level;
use serde::Serialize;
use thiserror::Error;

use crate::aggregate::{bar_width, counter_series, CounterField, SeriesPoint};
use crate::clamtrack_log;
use crate::db::{Infection, Scan, StoreError};
use crate::diff::{
    field_changed, infection_status, infections_unchanged, removed_infections, FieldValue,
    InfectionStatus, ScanField,
};
pub use context::ReportContext;
pub use format::Formatter;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub generated: DateTime<Utc>,
    pub scan: ScanHeader,
    pub previous_scan_id: Option<i64>,
    pub fields: Vec<FieldRow>,
    pub infections: Vec<InfectionRow>,
    pub removed_infections: Vec<Infection>,
    pub infections_unchanged: bool,
    pub window_ms: i64,
    pub infection_series: Vec<SeriesPoint>,
    pub known_virus_series: Vec<SeriesPoint>,
    pub bar_width_ms: i64,
}

#[derive(Debug, Serialize)]
pub struct ScanHeader {
    pub id: i64,
    pub dir: String,
    pub start: DateTime<Utc>,
    pub complete: DateTime<Utc>,
    pub start_display: String,
    pub complete_display: String,
    pub duration_ms: i64,
}

#[derive(Debug, Serialize)]
pub struct FieldRow {
    pub field: ScanField,
    pub label: &'static str,
    pub current: Option<FieldValue>,
    pub previous: Option<FieldValue>,
    pub changed: bool,
    pub display: Option<String>,
    pub previous_display: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InfectionRow {
    pub file: String,
    pub infection: String,
    pub status: InfectionStatus,
}

pub fn build_report(
    ctx: &mut ReportContext<'_>,
    scan: &Scan,
    window: Duration,
) -> Result<Report, ReportError> {
    let previous_scan_id = ctx.previous(scan)?.map(|p| p.id);

    let mut fields = Vec::with_capacity(ScanField::ALL.len());
    for field in ScanField::ALL {
        let change = field_changed(ctx, scan, field)?;
        let fmt = Formatter::for_field(field);
        let current = field.value(scan);
        fields.push(FieldRow {
            field,
            label: field.label(),
            display: current.as_ref().map(|v| fmt.apply(v)),
            previous_display: change.previous.as_ref().map(|v| fmt.apply(v)),
            current,
            previous: change.previous,
            changed: change.changed,
        });
    }

    let mut infections = Vec::with_capacity(scan.infections.len());
    for infection in &scan.infections {
        infections.push(InfectionRow {
            file: infection.file.clone(),
            infection: infection.infection.clone(),
            status: infection_status(ctx, scan, &infection.file)?,
        });
    }

    let removed = removed_infections(ctx, scan)?;
    let unchanged = infections_unchanged(ctx, scan)?;
    let infection_series = counter_series(ctx, &scan.dir, scan, window, CounterField::InfectionsCount)?;
    let known_virus_series = counter_series(ctx, &scan.dir, scan, window, CounterField::KnownViruses)?;
    let bar_width_ms = bar_width(ctx, &scan.dir, scan, window)?;

    clamtrack_log!(
        Level::Info,
        "report",
        "Report for scan #{}: {} infection(s), {} removed, {} point(s) in window",
        scan.id,
        infections.len(),
        removed.len(),
        infection_series.len()
    );

    Ok(Report {
        generated: Utc::now(),
        scan: ScanHeader {
            id: scan.id,
            dir: scan.dir.clone(),
            start: scan.start,
            complete: scan.complete,
            start_display: Formatter::Timestamp.apply(&FieldValue::Time(scan.start)),
            complete_display: Formatter::Timestamp.apply(&FieldValue::Time(scan.complete)),
            duration_ms: (scan.complete - scan.start).num_milliseconds(),
        },
        previous_scan_id,
        fields,
        infections,
        removed_infections: removed,
        infections_unchanged: unchanged,
        window_ms: i64::try_from(window.as_millis()).unwrap_or(i64::MAX),
        infection_series,
        known_virus_series,
        bar_width_ms,
    })
}

/// Write `report` as pretty JSON, creating the parent directory if needed.
pub fn write_report(report: &Report, path: &Path) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    clamtrack_log!(Level::Info, "report", "Report written to {}", path.display());
    Ok(())
}
