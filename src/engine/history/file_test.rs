use crate::engine::history::{CleanLogEntry, HistoryFile};
use std::fs;
use tempfile::tempdir;

fn entry(freed: f64) -> CleanLogEntry {
    CleanLogEntry {
        timestamp: "2025-09-07T12:34:56.000001+00:00".into(),
        before_percent: 85.5,
        after_percent: 72.3,
        freed_gb: freed,
    }
}

#[test]
fn missing_and_blank_files_are_empty() {
    let dir = tempdir().unwrap();
    let file = HistoryFile::new(dir.path().join("clean.log"));
    assert!(file.load_entries().unwrap().is_empty());

    fs::write(file.path(), b"  \n").unwrap();
    assert!(file.load_entries().unwrap().is_empty());
}

#[test]
fn persists_expected_keys() {
    let dir = tempdir().unwrap();
    let file = HistoryFile::new(dir.path().join("clean.log"));
    file.persist(&[entry(2.1)]).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(file.path()).unwrap()).unwrap();
    let obj = raw[0].as_object().unwrap();
    let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(
        keys,
        vec!["after_percent", "before_percent", "freed_gb", "timestamp"]
    );
    assert_eq!(file.load_entries().unwrap(), vec![entry(2.1)]);
}

#[test]
fn reads_entries_written_with_naive_timestamps() {
    let dir = tempdir().unwrap();
    let file = HistoryFile::new(dir.path().join("clean.log"));
    fs::write(
        file.path(),
        br#"[{"timestamp": "2024-03-01T08:15:30.123456", "before_percent": 88, "after_percent": 70.5, "freed_gb": 1.5}]"#,
    )
    .unwrap();

    let entries = file.load_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].before_percent, 88.0);
    assert_eq!(
        entries[0].display_line(),
        "[2024-03-01T08:15:30] 88% -> 70.5%, freed 1.5 GB"
    );
}

#[test]
fn decode_error_is_reported() {
    let dir = tempdir().unwrap();
    let file = HistoryFile::new(dir.path().join("clean.log"));
    fs::write(file.path(), b"{\"not\": \"an array\"}").unwrap();
    assert!(file.load_entries().is_err());
}

#[test]
fn lock_can_be_reacquired_after_drop() {
    let dir = tempdir().unwrap();
    let file = HistoryFile::new(dir.path().join("logs").join("clean.log"));
    {
        let _lock = file.lock().unwrap();
        assert!(dir.path().join("logs").join("clean.log.lock").exists());
    }
    let _again = file.lock().unwrap();
}
