// src/main.rs

//! clamtrack entry-point.
//!
//! 1. Parse the command line and load the TOML configuration
//! 2. Set up logging
//! 3. Open SQLite and create the schema on first run
//! 4. Update definitions, run clamscan and record the parsed scan
//! 5. Build the report data for the newest scan and write it as JSON
//!
// ───── std / 3rd-party imports ──────────────────────────────────────────────
use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use fern::Dispatch;
use log::LevelFilter;
use std::{
    fs,
    path::{Path, PathBuf},
    process,
    thread,
};

// ───── local imports ────────────────────────────────────────────────────────
use clamtrack::config::{self, Config, LoggingConfig};
use clamtrack::db::{Scan, ScanStore};
use clamtrack::parser::{IgnoreFilter, SummaryParser};
use clamtrack::report::{build_report, write_report, ReportContext};
use clamtrack::runner::{run_scan, update_definitions};

const DEFAULT_CONFIG: &str = "clamtrack.toml";

/// Run clamscan over a directory and report what changed since last time.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Configuration file (default: clamtrack.toml next to the executable)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip the scan and report on the latest recorded one
    #[arg(long)]
    report_only: bool,

    /// Do not run freshclam before scanning
    #[arg(long)]
    skip_update: bool,
}

// ───── helpers ──────────────────────────────────────────────────────────────

/// Print an error with context and terminate the process.
macro_rules! fatal {
    ($ctx:expr, $($arg:tt)+) => {{
        eprintln!(
            "[{}][ERROR][{}] {}",
            chrono::Local::now().to_rfc3339(),
            $ctx,
            format!($($arg)+)
        );
        std::process::exit(1);
    }};
}

/// Directory that contains the running executable.
fn exe_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot determine executable path")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("executable must live in some directory")
}

/// Configure global logging as requested in `[logging]`.
fn setup_logging(base: &Path, logging: &LoggingConfig) -> Result<(), fern::InitError> {
    let level = match logging.level.to_uppercase().as_str() {
        "ERROR" => LevelFilter::Error,
        "WARN" => LevelFilter::Warn,
        "DEBUG" => LevelFilter::Debug,
        "TRACE" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    let log_path = logging
        .enable
        .then(|| base.join(logging.file.as_deref().unwrap_or("clamtrack.log")));

    let mut dispatch = Dispatch::new()
        .format(|out, msg, record| {
            out.finish(format_args!(
                "[{}][{:5}][{}][pid={}][tid={:?}] {}",
                Local::now().to_rfc3339(),
                record.level(),
                record.target(),
                process::id(),
                thread::current().id(),
                msg
            ))
        })
        .level(level)
        .chain(std::io::stdout());

    if let Some(path) = log_path {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        dispatch = dispatch.chain(fern::log_file(path)?);
    }

    dispatch.apply()?;
    Ok(())
}

/// Run the scanner and persist the parsed result.
fn record_scan(store: &mut ScanStore, cfg: &Config, skip_update: bool) -> Result<Scan> {
    if !skip_update {
        update_definitions(&cfg.scan);
    }
    let run = run_scan(&cfg.scan).context("clamscan run failed")?;

    let raw = fs::read(&run.log_path)
        .with_context(|| format!("reading {}", run.log_path.display()))?;
    let filter = IgnoreFilter::new(&cfg.scan.ignores)?;
    let summary = filter.apply(&String::from_utf8_lossy(&raw));
    let parsed = SummaryParser::new().parse(&summary);

    let scan = store
        .create_scan(run.start, run.complete, &cfg.scan.dir, &parsed)
        .context("saving scan")?;
    match scan.infections_count {
        Some(n) if n > 0 => log::warn!("{} infected file(s) found in {}", n, scan.dir),
        Some(_) => log::info!("No infections found in {}", scan.dir),
        None => log::warn!("Summary log had no 'Infected files' line"),
    }
    Ok(scan)
}

// ───── run logic ────────────────────────────────────────────────────────────

fn run(cli: Cli, cfg: Config) -> Result<()> {
    log::info!("========== clamtrack: start ==========");

    let mut store = ScanStore::open(Path::new(&cfg.database.path), &cfg.database)
        .context("opening scan database")?;

    let scan = if cli.report_only {
        store
            .find_latest(&cfg.scan.dir)?
            .with_context(|| format!("no scans recorded for {}", cfg.scan.dir))?
    } else {
        record_scan(&mut store, &cfg, cli.skip_update)?
    };

    let mut ctx = ReportContext::new(&store);
    let report = build_report(&mut ctx, &scan, cfg.report.window).context("building report")?;
    write_report(&report, &cfg.report.path).context("writing report")?;

    log::info!("========== clamtrack: complete ==========");
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let cfg_path = match &cli.config {
        Some(path) => path.clone(),
        None => exe_dir()
            .unwrap_or_else(|e| fatal!("main", "{:#}", e))
            .join(DEFAULT_CONFIG),
    };
    let cfg = config::load(&cfg_path)
        .unwrap_or_else(|e| fatal!("config", "{}: {}", cfg_path.display(), e));

    let base = cfg_path.parent().unwrap_or_else(|| Path::new("."));
    setup_logging(base, &cfg.logging).unwrap_or_else(|e| fatal!("logging", "{}", e));

    if let Err(e) = run(cli, cfg) {
        log::error!("{:#}", e);
        process::exit(1);
    }
}
