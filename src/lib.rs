// src/lib.rs
// ────────────────────────────────────────────────────────────────────────────
// Public library entry point.  Re-export everything for both `main.rs` and
// integration tests.

mod macros;

pub mod aggregate;
pub mod config;
pub mod db;
pub mod diff;
pub mod history;
pub mod parser;
pub mod report;
pub mod runner;
