// src/parser/summary.rs

//! # Summary Log Parser
//!
//! Turns the `----------- SCAN SUMMARY -----------` block that `clamscan`
//! writes to its log into a `ParsedSummary`.
//!
//! **Responsibilities:**
//! - First-match extraction of each labelled summary value.
//! - Conversion of `Data scanned` / `Data read` megabytes into bytes.
//! - Enumeration of `<file>: <signature> FOUND` lines, in log order.
//!
//! Nothing here fails: a label that is missing or garbled leaves its field
//! unset.

use crate::clamtrack_log;
use log::Level;
use regex::Regex;
use serde::Serialize;

/// Bytes per reported megabyte.
pub const BYTES_PER_MEGABYTE: f64 = 1_048_576.0;

/// One `(file, signature)` finding as reported in the log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InfectionPair {
    pub file: String,
    pub infection: String,
}

impl InfectionPair {
    pub fn new(file: impl Into<String>, infection: impl Into<String>) -> Self {
        Self { file: file.into(), infection: infection.into() }
    }
}

/// Structured fields extracted from a summary log.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedSummary {
    pub infections_count: Option<i64>,
    pub dirs_scanned: Option<i64>,
    pub files_scanned: Option<i64>,
    /// Bytes.
    pub data_scanned: Option<f64>,
    /// Bytes.
    pub data_read: Option<f64>,
    pub known_viruses: Option<i64>,
    pub engine_version: Option<String>,
    /// Every FOUND line in log order; duplicates are kept.
    pub infections: Vec<InfectionPair>,
}

/// Compiled label patterns. Build once per run and reuse.
#[derive(Debug, Clone)]
pub struct SummaryParser {
    infected_files: Regex,
    dirs_scanned: Regex,
    files_scanned: Regex,
    data_scanned: Regex,
    data_read: Regex,
    known_viruses: Regex,
    engine_version: Regex,
    found: Regex,
}

impl Default for SummaryParser {
    fn default() -> Self {
        Self::new()
    }
}

/// The patterns are literals; failing to compile one is a programming error.
fn pattern(re: &str) -> Regex {
    Regex::new(re).unwrap_or_else(|e| panic!("invalid built-in pattern {re:?}: {e}"))
}

impl SummaryParser {
    pub fn new() -> Self {
        Self {
            infected_files: pattern(r"(?m)Infected files: (\d+)\r?$"),
            dirs_scanned: pattern(r"(?m)Scanned directories: (\d+)\r?$"),
            files_scanned: pattern(r"(?m)Scanned files: (\d+)\r?$"),
            data_scanned: pattern(r"Data scanned: ([\d.]+) "),
            data_read: pattern(r"Data read: ([\d.]+) "),
            known_viruses: pattern(r"(?m)Known viruses: (\d+)\r?$"),
            engine_version: pattern(r"(?m)Engine version: ([\d.]+)\r?$"),
            found: pattern(r"(?m)^(.*): (.*) FOUND\r?$"),
        }
    }

    /// Parse an already-filtered summary log.
    pub fn parse(&self, summary: &str) -> ParsedSummary {
        let mut parsed = ParsedSummary {
            infections_count: first_int(&self.infected_files, summary),
            dirs_scanned: first_int(&self.dirs_scanned, summary),
            files_scanned: first_int(&self.files_scanned, summary),
            data_scanned: first_megabytes(&self.data_scanned, summary),
            data_read: first_megabytes(&self.data_read, summary),
            known_viruses: first_int(&self.known_viruses, summary),
            engine_version: first_capture(&self.engine_version, summary).map(str::to_owned),
            infections: Vec::new(),
        };

        if parsed.infections_count.is_some_and(|n| n > 0) {
            parsed.infections = self
                .found
                .captures_iter(summary)
                .map(|caps| InfectionPair::new(&caps[1], &caps[2]))
                .collect();
        }

        clamtrack_log!(
            Level::Debug,
            "parser",
            "Parsed summary: infected={:?} files={:?} found_lines={}",
            parsed.infections_count,
            parsed.files_scanned,
            parsed.infections.len()
        );
        parsed
    }
}

fn first_capture<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
}

fn first_int(re: &Regex, text: &str) -> Option<i64> {
    first_capture(re, text).and_then(|s| s.parse().ok())
}

fn first_megabytes(re: &Regex, text: &str) -> Option<f64> {
    first_capture(re, text)
        .and_then(|s| s.parse::<f64>().ok())
        .map(|mb| mb * BYTES_PER_MEGABYTE)
}
