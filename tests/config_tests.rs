// tests/config_tests.rs

use std::{fs, path::Path, time::Duration};

use tempfile::TempDir;

use clamtrack::config::{from_toml_str, load, ConfigError};

const SAMPLE: &str = r#"
[logging]
enable = true
file = "logs/clamtrack.log"
level = "DEBUG"

[database]
path = "db/clamtrack.db"

[scan]
dir = "/Users/bob"
clamscan = "/usr/local/clamXav/bin/clamscan"
freshclam = "bin/freshclam"
log = "logs/clamscan.log"
excludes = ["mp3", "avi"]
ignores = ["^/Users/bob/Library/Mail/", "Heuristics\\."]

[report]
path = "out/report.json"
window = "30days"
"#;

#[test]
fn sample_config_resolves_paths_and_durations() {
    let base = Path::new("/opt/clamtrack");
    let cfg = from_toml_str(SAMPLE, base).unwrap();

    assert!(cfg.logging.enable);
    assert_eq!(cfg.logging.level, "DEBUG");
    assert_eq!(Path::new(&cfg.database.path), base.join("db/clamtrack.db"));
    assert_eq!(cfg.database.synchronous, "NORMAL");

    assert_eq!(cfg.scan.dir, "/Users/bob");
    assert_eq!(cfg.scan.clamscan, Path::new("/usr/local/clamXav/bin/clamscan"));
    assert_eq!(cfg.scan.freshclam.as_deref(), Some(base.join("bin/freshclam").as_path()));
    assert_eq!(cfg.scan.log, base.join("logs/clamscan.log"));
    assert_eq!(cfg.scan.excludes, vec!["mp3", "avi"]);
    assert_eq!(cfg.scan.ignores.len(), 2);

    assert_eq!(cfg.report.path, base.join("out/report.json"));
    assert_eq!(cfg.report.window, Duration::from_secs(30 * 86_400));
}

#[test]
fn minimal_config_uses_defaults() {
    let cfg = from_toml_str("[scan]\ndir = \"/data\"\n", Path::new("/etc")).unwrap();
    assert!(!cfg.logging.enable);
    assert_eq!(cfg.logging.level, "INFO");
    assert_eq!(cfg.scan.clamscan, Path::new("clamscan"));
    assert!(cfg.scan.freshclam.is_none());
    assert_eq!(cfg.report.window, Duration::from_secs(30 * 86_400));
    assert_eq!(Path::new(&cfg.database.path), Path::new("/etc/clamtrack.db"));
}

#[test]
fn invalid_values_are_reported() {
    let bad_window = "[scan]\ndir = \"/d\"\n[report]\nwindow = \"soon\"\n";
    assert!(matches!(
        from_toml_str(bad_window, Path::new(".")),
        Err(ConfigError::InvalidDuration(..))
    ));

    let bad_ignore = "[scan]\ndir = \"/d\"\nignores = [\"(unclosed\"]\n";
    assert!(matches!(
        from_toml_str(bad_ignore, Path::new(".")),
        Err(ConfigError::InvalidIgnore(..))
    ));

    assert!(matches!(
        from_toml_str("[scan]\ndir = \"  \"\n", Path::new(".")),
        Err(ConfigError::EmptyScanDir)
    ));
    assert!(matches!(from_toml_str("[logging]\n", Path::new(".")), Err(ConfigError::Toml(_))));
}

#[test]
fn load_reads_file_relative_to_its_directory() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("clamtrack.toml");
    fs::write(&path, SAMPLE).unwrap();

    let cfg = load(&path).unwrap();
    assert_eq!(cfg.scan.log, tmp.path().join("logs/clamscan.log"));

    assert!(matches!(load(&tmp.path().join("missing.toml")), Err(ConfigError::Io(_))));
}
