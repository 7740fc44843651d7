// src/history.rs

//! History navigation within one target's scans.
//!
//! A target's history is ordered by `(complete, id)`: completion time first,
//! insertion order for scans that completed at the same instant.

use crate::db::{Scan, ScanStore, StoreError};

/// The scan of the same target immediately before `scan`, or `None` for the
/// earliest one.
pub fn previous(store: &ScanStore, scan: &Scan) -> Result<Option<Scan>, StoreError> {
    let prev = store.find_before(&scan.dir, scan.complete, scan.id)?;
    log::debug!(
        "previous(#{}) -> {:?}",
        scan.id,
        prev.as_ref().map(|p| p.id)
    );
    Ok(prev)
}
