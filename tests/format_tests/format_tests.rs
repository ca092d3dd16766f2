//! Tests for the snapshot format
//!
//! These tests verify:
//! - Exact chunk layout of encoded output
//! - Save → load reconstructs tables, absent slots and empty records
//! - Deterministic output (name order)
//! - Limit enforcement leaves the previous file untouched
//! - Rejection of corrupt streams

use std::fs;
use std::path::PathBuf;

use bytes::Bytes;
use slotstore::format::{self, decode, encode, read_snapshot, write_snapshot};
use slotstore::state::StoreState;
use slotstore::StoreError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_file() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.db");
    (temp_dir, path)
}

fn state_with(entries: &[(&str, u16, &[u8])]) -> StoreState {
    let mut state = StoreState::new();
    for (table, pos, data) in entries {
        state.put(table, *pos, Bytes::copy_from_slice(data));
    }
    state
}

// =============================================================================
// Layout Tests
// =============================================================================

#[test]
fn test_encode_empty_state() {
    let bytes = encode(&StoreState::new()).unwrap();
    assert!(bytes.is_empty());
}

#[test]
fn test_encode_layout() {
    let state = state_with(&[("t", 0, b"blah"), ("t", 2, b"")]);

    let bytes = encode(&state).unwrap();

    let mut expected = Vec::new();
    expected.extend_from_slice(b"TB\x01t");
    expected.extend_from_slice(b"R1\x00\x04blah");
    expected.extend_from_slice(b"R0");
    expected.extend_from_slice(b"R1\x00\x00");
    assert_eq!(bytes, expected);
}

#[test]
fn test_record_length_is_big_endian() {
    let data = vec![7u8; 0x0102];
    let state = state_with(&[("t", 0, &data)]);

    let bytes = encode(&state).unwrap();

    assert_eq!(&bytes[4..8], b"R1\x01\x02");
}

#[test]
fn test_encode_orders_tables_by_name() {
    let a = state_with(&[("b", 0, b"2"), ("a", 0, b"1"), ("c", 0, b"3")]);
    let b = state_with(&[("c", 0, b"3"), ("a", 0, b"1"), ("b", 0, b"2")]);

    let bytes = encode(&a).unwrap();
    assert_eq!(bytes, encode(&b).unwrap());
    assert!(bytes.starts_with(b"TB\x01aR1\x00\x011TB\x01b"));
}

// =============================================================================
// Round Trip Tests
// =============================================================================

#[test]
fn test_save_then_load_reconstructs_state() {
    let (_temp, path) = setup_temp_file();
    let state = state_with(&[
        ("users", 0, b"alice"),
        ("users", 3, b"dave"),
        ("orders", 1, b"#1001"),
        ("empty", 0, b""),
    ]);

    let size = write_snapshot(&path, &state).unwrap();
    assert_eq!(size, fs::metadata(&path).unwrap().len());

    let tables = read_snapshot(&path).unwrap();
    assert_eq!(tables.len(), 3);

    let users = &tables["users"];
    assert_eq!(users.len(), 4);
    assert_eq!(users.get(0), Some(&Bytes::from_static(b"alice")));
    assert_eq!(users.get(1), None);
    assert_eq!(users.get(2), None);
    assert_eq!(users.get(3), Some(&Bytes::from_static(b"dave")));

    let orders = &tables["orders"];
    assert_eq!(orders.len(), 2);
    assert_eq!(orders.get(0), None);

    // Empty record stays distinct from absent
    assert_eq!(tables["empty"].get(0), Some(&Bytes::new()));

    // Loaded tables are clean
    assert!(tables.values().all(|t| !t.is_modified()));
}

#[test]
fn test_max_record_length_round_trips() {
    let (_temp, path) = setup_temp_file();
    let data = vec![0x5au8; format::MAX_RECORD_LEN];
    let state = state_with(&[("big", 0, &data)]);

    write_snapshot(&path, &state).unwrap();

    let tables = read_snapshot(&path).unwrap();
    assert_eq!(tables["big"].get(0).map(|b| b.len()), Some(format::MAX_RECORD_LEN));
}

#[test]
fn test_save_leaves_no_temp_file() {
    let (temp, path) = setup_temp_file();
    write_snapshot(&path, &state_with(&[("t", 0, b"x")])).unwrap();

    let names: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("store.db")]);
}

// =============================================================================
// Limit Tests
// =============================================================================

#[test]
fn test_long_table_name_fails_and_keeps_previous_file() {
    let (temp, path) = setup_temp_file();
    write_snapshot(&path, &state_with(&[("ok", 0, b"v1")])).unwrap();
    let before = fs::read(&path).unwrap();

    let long_name = "n".repeat(256);
    let state = state_with(&[("ok", 0, b"v2"), (long_name.as_str(), 0, b"x")]);

    let err = write_snapshot(&path, &state).unwrap_err();
    assert!(matches!(err, StoreError::LimitExceeded(_)));

    assert_eq!(fs::read(&path).unwrap(), before);
    assert!(!temp.path().join("store.db.tmp").exists());
}

#[test]
fn test_name_of_255_bytes_is_allowed() {
    let name = "n".repeat(255);
    let state = state_with(&[(name.as_str(), 0, b"x")]);

    let bytes = encode(&state).unwrap();
    assert_eq!(bytes[2], 255);
}

#[test]
fn test_oversized_record_fails_and_keeps_previous_file() {
    let (_temp, path) = setup_temp_file();
    write_snapshot(&path, &state_with(&[("t", 0, b"old")])).unwrap();
    let before = fs::read(&path).unwrap();

    let huge = vec![0u8; format::MAX_RECORD_LEN + 1];
    let state = state_with(&[("t", 0, b"new"), ("t", 1, &huge)]);

    let err = write_snapshot(&path, &state).unwrap_err();
    assert!(matches!(err, StoreError::LimitExceeded(_)));
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_failed_first_save_creates_nothing() {
    let (_temp, path) = setup_temp_file();
    let huge = vec![0u8; format::MAX_RECORD_LEN + 1];

    assert!(write_snapshot(&path, &state_with(&[("t", 0, &huge)])).is_err());
    assert!(!path.exists());
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_unknown_tag_is_format_error() {
    let err = decode(&b"TB\x01tR1\x00\x01aXXjunk"[..]).unwrap_err();
    match err {
        StoreError::Format(msg) => assert!(msg.contains("XX"), "message: {}", msg),
        other => panic!("expected Format error, got {:?}", other),
    }
}

#[test]
fn test_record_before_table_header() {
    let err = decode(&b"R1\x00\x01a"[..]).unwrap_err();
    match err {
        StoreError::Format(msg) => assert!(msg.contains("before table header")),
        other => panic!("expected Format error, got {:?}", other),
    }
}

#[test]
fn test_tombstone_before_table_header() {
    assert!(matches!(decode(&b"R0"[..]), Err(StoreError::Format(_))));
}

#[test]
fn test_truncated_payload() {
    // Declares 4 bytes, provides 2
    let err = decode(&b"TB\x01tR1\x00\x04ab"[..]).unwrap_err();
    assert!(matches!(err, StoreError::Format(_)));
}

#[test]
fn test_truncated_length_prefix() {
    assert!(matches!(decode(&b"TB\x01tR1\x00"[..]), Err(StoreError::Format(_))));
}

#[test]
fn test_truncated_table_name() {
    assert!(matches!(decode(&b"TB\x05ab"[..]), Err(StoreError::Format(_))));
}

#[test]
fn test_duplicate_table_header() {
    let err = decode(&b"TB\x01tR0TB\x01t"[..]).unwrap_err();
    assert!(matches!(err, StoreError::Format(_)));
}

#[test]
fn test_table_without_records() {
    let tables = decode(&b"TB\x01t"[..]).unwrap();
    assert_eq!(tables["t"].len(), 0);
}

#[test]
fn test_legacy_zero_length_record_loads_as_empty() {
    let tables = decode(&b"TB\x01tR1\x00\x00R1\x00\x01v"[..]).unwrap();
    let t = &tables["t"];

    assert_eq!(t.len(), 2);
    assert_eq!(t.get(0), Some(&Bytes::new()));
    assert_eq!(t.get(1), Some(&Bytes::from_static(b"v")));
}

#[test]
fn test_missing_file_is_io_error() {
    let (_temp, path) = setup_temp_file();

    match read_snapshot(&path) {
        Err(StoreError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
        other => panic!("expected Io error, got {:?}", other.map(|t| t.len())),
    }
}
