// src/aggregate.rs

//! Trailing-window series for the report charts.

use std::time::Duration;

use serde::Serialize;

use crate::db::{Scan, StoreError};
use crate::report::context::ReportContext;

/// Counters that can be charted as scan-to-scan deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterField {
    InfectionsCount,
    KnownViruses,
}

impl CounterField {
    /// Unset counters count as zero.
    pub fn value(self, scan: &Scan) -> i64 {
        match self {
            CounterField::InfectionsCount => scan.infections_count,
            CounterField::KnownViruses => scan.known_viruses,
        }
        .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    /// Scan completion, milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    pub delta: i64,
}

/// One point per windowed scan, oldest first. Each delta is taken against
/// the scan before it in the window; the first point is always 0.
pub fn counter_series(
    ctx: &mut ReportContext<'_>,
    dir: &str,
    reference: &Scan,
    window: Duration,
    field: CounterField,
) -> Result<Vec<SeriesPoint>, StoreError> {
    let scans = ctx.window(dir, reference, window)?;
    let mut last: Option<i64> = None;
    let series = scans
        .iter()
        .map(|scan| {
            let value = field.value(scan);
            let delta = last.map_or(0, |prev| value - prev);
            last = Some(value);
            SeriesPoint { timestamp_ms: scan.complete.timestamp_millis(), delta }
        })
        .collect();
    Ok(series)
}

/// Average spacing between windowed scans in milliseconds, used as the chart
/// bar width. Zero when the window holds fewer than two scans.
pub fn bar_width(
    ctx: &mut ReportContext<'_>,
    dir: &str,
    reference: &Scan,
    window: Duration,
) -> Result<i64, StoreError> {
    let scans = ctx.window(dir, reference, window)?;
    if scans.len() < 2 {
        return Ok(0);
    }
    let Some(oldest) = scans.iter().map(|s| s.complete).min() else {
        return Ok(0);
    };
    let span = (reference.complete - oldest).num_milliseconds();
    Ok(span / scans.len() as i64)
}
