// src/report/context.rs

//! Memoised lookups for one report-generation pass.
//!
//! Persisted scans never change, so a previous-scan or window lookup made
//! once can be served from here for the rest of the pass. Build a fresh
//! context for every report.

use std::{collections::HashMap, time::Duration};

use crate::db::{Scan, ScanStore, StoreError};
use crate::history;

type WindowKey = (String, i64, Duration);

pub struct ReportContext<'a> {
    store: &'a ScanStore,
    previous: HashMap<i64, Option<Scan>>,
    windows: HashMap<WindowKey, Vec<Scan>>,
}

impl<'a> ReportContext<'a> {
    pub fn new(store: &'a ScanStore) -> Self {
        Self { store, previous: HashMap::new(), windows: HashMap::new() }
    }

    /// Memoised [`history::previous`].
    pub fn previous(&mut self, scan: &Scan) -> Result<Option<&Scan>, StoreError> {
        if !self.previous.contains_key(&scan.id) {
            let prev = history::previous(self.store, scan)?;
            self.previous.insert(scan.id, prev);
        }
        Ok(self.previous.get(&scan.id).and_then(Option::as_ref))
    }

    /// Memoised [`ScanStore::find_in_window`].
    pub fn window(
        &mut self,
        dir: &str,
        reference: &Scan,
        window: Duration,
    ) -> Result<&[Scan], StoreError> {
        let key = (dir.to_owned(), reference.id, window);
        if !self.windows.contains_key(&key) {
            let scans = self.store.find_in_window(dir, reference, window)?;
            self.windows.insert(key.clone(), scans);
        }
        Ok(self.windows.get(&key).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Number of memoised lookups, previous and window combined.
    pub fn cached_lookups(&self) -> usize {
        self.previous.len() + self.windows.len()
    }
}
