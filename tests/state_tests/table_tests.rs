//! Tests for Table and StoreState
//!
//! These tests verify:
//! - Dense growth on write past the end
//! - Delete semantics (absent slot, no shrinking, missing table ignored)
//! - Not-found lookups
//! - Per-position and store-wide dirty tracking

use bytes::Bytes;
use slotstore::state::{StoreState, Table};
use slotstore::StoreError;

// =============================================================================
// Table Tests
// =============================================================================

#[test]
fn test_new_table_is_empty() {
    let table = Table::new();

    assert!(table.is_empty());
    assert_eq!(table.len(), 0);
    assert!(!table.is_modified());
    assert_eq!(table.get(0), None);
}

#[test]
fn test_put_past_end_pads_with_absent_slots() {
    let mut table = Table::new();

    table.put(5, Bytes::from_static(b"v"));

    assert_eq!(table.len(), 6);
    for pos in 0..5 {
        assert_eq!(table.get(pos), None, "position {} should be absent", pos);
    }
    assert_eq!(table.get(5), Some(&Bytes::from_static(b"v")));
}

#[test]
fn test_put_inside_range_does_not_grow() {
    let mut table = Table::new();
    table.put(3, Bytes::from_static(b"a"));
    table.put(1, Bytes::from_static(b"b"));

    assert_eq!(table.len(), 4);
    assert_eq!(table.get(1), Some(&Bytes::from_static(b"b")));
}

#[test]
fn test_put_overwrites() {
    let mut table = Table::new();
    table.put(0, Bytes::from_static(b"one"));
    table.put(0, Bytes::from_static(b"two"));

    assert_eq!(table.len(), 1);
    assert_eq!(table.get(0), Some(&Bytes::from_static(b"two")));
}

#[test]
fn test_put_at_max_position() {
    let mut table = Table::new();
    table.put(u16::MAX, Bytes::from_static(b"last"));

    assert_eq!(table.len(), 65_536);
    assert_eq!(table.get(u16::MAX), Some(&Bytes::from_static(b"last")));
}

#[test]
fn test_delete_clears_slot_without_shrinking() {
    let mut table = Table::new();
    table.put(2, Bytes::from_static(b"x"));

    assert!(table.delete(2));

    assert_eq!(table.len(), 3);
    assert_eq!(table.get(2), None);
}

#[test]
fn test_delete_past_end_is_noop() {
    let mut table = Table::new();
    table.put(0, Bytes::from_static(b"x"));
    table.mark_clean();

    assert!(!table.delete(10));

    assert_eq!(table.len(), 1);
    assert!(!table.is_modified());
}

#[test]
fn test_modified_positions_tracked_and_cleared() {
    let mut table = Table::new();
    table.put(4, Bytes::from_static(b"a"));
    table.put(1, Bytes::from_static(b"b"));
    table.delete(4);

    let modified: Vec<u16> = table.modified().iter().copied().collect();
    assert_eq!(modified, vec![1, 4]);

    table.mark_clean();
    assert!(!table.is_modified());
    // Contents survive
    assert_eq!(table.get(1), Some(&Bytes::from_static(b"b")));
}

#[test]
fn test_from_records_is_clean() {
    let table = Table::from_records(vec![None, Some(Bytes::from_static(b"z"))]);

    assert_eq!(table.len(), 2);
    assert!(!table.is_modified());
    assert_eq!(table.get(1), Some(&Bytes::from_static(b"z")));
}

// =============================================================================
// StoreState Tests
// =============================================================================

#[test]
fn test_state_creates_tables_lazily() {
    let mut state = StoreState::new();
    assert_eq!(state.table_count(), 0);
    assert!(!state.is_modified());

    state.put("users", 0, Bytes::from_static(b"alice"));

    assert_eq!(state.table_count(), 1);
    assert!(state.is_modified());
    assert_eq!(state.get("users", 0).unwrap(), Bytes::from_static(b"alice"));
}

#[test]
fn test_state_get_missing_table() {
    let state = StoreState::new();

    let err = state.get("nope", 0).unwrap_err();
    assert!(matches!(err, StoreError::TableNotFound(ref name) if name == "nope"));
    assert!(err.is_not_found());
}

#[test]
fn test_state_get_missing_record() {
    let mut state = StoreState::new();
    state.put("t", 2, Bytes::from_static(b"x"));

    // Absent slot inside the table
    let err = state.get("t", 0).unwrap_err();
    assert!(matches!(err, StoreError::RecordNotFound { pos: 0, .. }));

    // Beyond the end
    let err = state.get("t", 99).unwrap_err();
    assert!(matches!(err, StoreError::RecordNotFound { pos: 99, .. }));
}

#[test]
fn test_state_empty_record_is_found() {
    let mut state = StoreState::new();
    state.put("t", 0, Bytes::new());

    assert_eq!(state.get("t", 0).unwrap(), Bytes::new());
}

#[test]
fn test_state_delete_missing_table_is_noop() {
    let mut state = StoreState::new();

    assert!(!state.delete("ghost", 3));
    assert_eq!(state.table_count(), 0);
    assert!(!state.is_modified());
}

#[test]
fn test_state_delete_marks_modified() {
    let mut state = StoreState::new();
    state.put("t", 0, Bytes::from_static(b"x"));
    state.mark_clean();

    assert!(state.delete("t", 0));
    assert!(state.is_modified());
    assert!(state.table("t").unwrap().modified().contains(&0));
}

#[test]
fn test_state_mark_clean_clears_all_tables() {
    let mut state = StoreState::new();
    state.put("a", 0, Bytes::from_static(b"1"));
    state.put("b", 3, Bytes::from_static(b"2"));

    state.mark_clean();

    assert!(!state.is_modified());
    assert!(!state.table("a").unwrap().is_modified());
    assert!(!state.table("b").unwrap().is_modified());
    assert_eq!(state.record_count(), 1 + 4);
}

#[test]
fn test_state_tables_iterate_in_name_order() {
    let mut state = StoreState::new();
    for name in ["zeta", "alpha", "mid"] {
        state.put(name, 0, Bytes::from_static(b"x"));
    }

    let names: Vec<&str> = state.tables().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    assert_eq!(state.table_names(), vec!["alpha", "mid", "zeta"]);
}

#[test]
fn test_state_names_are_exact_match() {
    let mut state = StoreState::new();
    state.put("Users", 0, Bytes::from_static(b"x"));

    assert!(state.get("users", 0).is_err());
    assert!(state.get("Users ", 0).is_err());
    assert!(state.get("Users", 0).is_ok());
}
