// tests/store_tests.rs

mod common;

use std::time::Duration;

use rusqlite::Connection;
use tempfile::TempDir;

use clamtrack::config::DatabaseConfig;
use clamtrack::db::{ScanStore, StoreError};
use clamtrack::parser::InfectionPair;
use common::{at, record, summary, temp_store, TARGET};

#[test]
fn ensure_schema_is_idempotent_and_keeps_data() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("scans.db");
    let cfg = DatabaseConfig::default();

    {
        let mut store = ScanStore::open(&path, &cfg).unwrap();
        record(&mut store, TARGET, 1_000, &summary(100, &[("/a", "X")]));
        assert!(!store.ensure_schema().unwrap(), "schema already present");
    }

    // Reopening runs ensure_schema again.
    let store = ScanStore::open(&path, &cfg).unwrap();
    assert_eq!(store.scan_count().unwrap(), 1);
    assert_eq!(store.infection_count().unwrap(), 1);
}

#[test]
fn ensure_schema_repairs_missing_tables() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("scans.db");
    let cfg = DatabaseConfig::default();
    drop(ScanStore::open(&path, &cfg).unwrap());

    Connection::open(&path)
        .unwrap()
        .execute_batch("DROP TABLE infections_scans;")
        .unwrap();

    let store = ScanStore::open(&path, &cfg).unwrap();
    assert!(!store.ensure_schema().unwrap());
    assert!(store.infections_for(1).unwrap().is_empty());
}

#[test]
fn create_scan_persists_fields_and_infections() {
    let (_tmp, mut store) = temp_store();
    let parsed = summary(900_000, &[("/tmp/x/eicar.com", "Eicar-Test-Signature")]);
    let scan = record(&mut store, TARGET, 5_000, &parsed);

    let loaded = store.find_by_id(scan.id).unwrap().expect("scan stored");
    assert_eq!(loaded, scan);
    assert_eq!(loaded.known_viruses, Some(900_000));
    assert_eq!(loaded.infections_count, Some(1));
    assert_eq!(loaded.infections.len(), 1);
    assert_eq!(loaded.infections[0].file, "/tmp/x/eicar.com");
    assert_eq!(loaded.infections[0].infection, "Eicar-Test-Signature");
}

#[test]
fn identical_pairs_reuse_infection_rows() {
    let (_tmp, mut store) = temp_store();
    let first = record(&mut store, TARGET, 1_000, &summary(1, &[("/a", "X"), ("/b", "Y")]));
    let second = record(&mut store, TARGET, 2_000, &summary(1, &[("/a", "X"), ("/c", "Z")]));

    assert_eq!(store.infection_count().unwrap(), 3);
    assert_eq!(first.infections[0].id, second.infections[0].id);
    assert_ne!(first.infections[1].id, second.infections[1].id);

    // Same file, different signature is a different finding.
    record(&mut store, TARGET, 3_000, &summary(1, &[("/a", "Other")]));
    assert_eq!(store.infection_count().unwrap(), 4);
}

#[test]
fn duplicate_lines_in_one_run_link_once() {
    let (_tmp, mut store) = temp_store();
    let mut parsed = summary(1, &[("/a", "X"), ("/b", "Y"), ("/a", "X")]);
    parsed.infections_count = Some(3);

    let scan = record(&mut store, TARGET, 1_000, &parsed);
    assert_eq!(scan.infections.len(), 2);
    assert_eq!(scan.infections_count, Some(2));
    assert_eq!(store.infection_count().unwrap(), 2);

    let loaded = store.find_by_id(scan.id).unwrap().unwrap();
    let files: Vec<_> = loaded.infected_files().collect();
    assert_eq!(files, vec!["/a", "/b"]);
}

#[test]
fn unset_fields_round_trip_as_none() {
    let (_tmp, mut store) = temp_store();
    let parsed = clamtrack::parser::ParsedSummary::default();
    let scan = record(&mut store, TARGET, 1_000, &parsed);
    let loaded = store.find_by_id(scan.id).unwrap().unwrap();
    assert_eq!(loaded.infections_count, None);
    assert_eq!(loaded.data_scanned, None);
    assert_eq!(loaded.engine_version, None);
}

#[test]
fn complete_before_start_is_rejected_and_nothing_is_written() {
    let (_tmp, mut store) = temp_store();
    let parsed = summary(1, &[("/a", "X")]);
    let err = store.create_scan(at(2_000), at(1_000), TARGET, &parsed).unwrap_err();
    assert!(matches!(err, StoreError::InvalidRange { .. }));
    assert_eq!(store.scan_count().unwrap(), 0);
    assert_eq!(store.infection_count().unwrap(), 0);
}

#[test]
fn failed_link_rolls_back_the_whole_scan() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("scans.db");
    let mut store = ScanStore::open(&path, &DatabaseConfig::default()).unwrap();

    Connection::open(&path)
        .unwrap()
        .execute_batch(
            "CREATE TRIGGER fail_second_link BEFORE INSERT ON infections_scans
             WHEN NEW.position = 1
             BEGIN SELECT RAISE(ABORT, 'link rejected'); END;",
        )
        .unwrap();

    let parsed = summary(1, &[("/a", "X"), ("/b", "Y")]);
    let err = store.create_scan(at(1_000), at(1_060), TARGET, &parsed).unwrap_err();
    assert!(matches!(err, StoreError::Sql(_)));

    // Neither the scan row nor the first infection survives.
    assert_eq!(store.scan_count().unwrap(), 0);
    assert_eq!(store.infection_count().unwrap(), 0);
    assert!(store.find_latest(TARGET).unwrap().is_none());
}

#[test]
fn window_includes_scans_sharing_the_reference_completion() {
    let (_tmp, mut store) = temp_store();
    let a = record(&mut store, TARGET, 1_000, &summary(100, &[]));
    let b = record(&mut store, TARGET, 1_000, &summary(140, &[]));

    let ids: Vec<i64> = store
        .find_in_window(TARGET, &a, Duration::from_secs(500))
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec![a.id, b.id]);
}

#[test]
fn find_latest_is_scoped_to_target() {
    let (_tmp, mut store) = temp_store();
    assert!(store.find_latest(TARGET).unwrap().is_none());

    record(&mut store, TARGET, 1_000, &summary(1, &[]));
    let newest = record(&mut store, TARGET, 3_000, &summary(2, &[]));
    record(&mut store, "/srv", 9_000, &summary(3, &[]));
    // Inserted later but completed earlier.
    record(&mut store, TARGET, 2_000, &summary(4, &[]));

    assert_eq!(store.find_latest(TARGET).unwrap().unwrap().id, newest.id);
    assert_eq!(store.find_latest("/srv").unwrap().unwrap().known_viruses, Some(3));
    assert!(store.find_latest("/nowhere").unwrap().is_none());
}

#[test]
fn find_in_window_bounds_and_order() {
    let (_tmp, mut store) = temp_store();
    let a = record(&mut store, TARGET, 1_000, &summary(1, &[]));
    let b = record(&mut store, TARGET, 1_500, &summary(1, &[]));
    let c = record(&mut store, TARGET, 1_200, &summary(1, &[]));
    let later = record(&mut store, TARGET, 2_000, &summary(1, &[]));
    record(&mut store, "/srv", 1_400, &summary(1, &[]));

    // (1500 - 500, 1500] excludes the scan exactly at the lower bound.
    let ids: Vec<i64> = store
        .find_in_window(TARGET, &b, Duration::from_secs(500))
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec![c.id, b.id]);

    let ids: Vec<i64> = store
        .find_in_window(TARGET, &b, Duration::from_secs(501))
        .unwrap()
        .iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, vec![a.id, c.id, b.id]);
    assert!(!ids.contains(&later.id));
}

#[test]
fn infections_for_follows_log_order() {
    let (_tmp, mut store) = temp_store();
    record(&mut store, TARGET, 1_000, &summary(1, &[("/z", "Z")]));
    let scan = record(&mut store, TARGET, 2_000, &summary(1, &[("/b", "B"), ("/z", "Z"), ("/a", "A")]));

    let pairs: Vec<InfectionPair> = store
        .infections_for(scan.id)
        .unwrap()
        .into_iter()
        .map(|i| InfectionPair::new(i.file, i.infection))
        .collect();
    assert_eq!(
        pairs,
        vec![
            InfectionPair::new("/b", "B"),
            InfectionPair::new("/z", "Z"),
            InfectionPair::new("/a", "A"),
        ]
    );
}

#[test]
fn in_memory_store_works() {
    let mut store = ScanStore::open_in_memory().unwrap();
    record(&mut store, TARGET, 1_000, &summary(1, &[("/a", "X")]));
    assert_eq!(store.scan_count().unwrap(), 1);
}
