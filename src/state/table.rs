//! Table implementation
//!
//! A growable vector of optional records plus the set of positions written
//! since the last save.

use std::collections::BTreeSet;

use bytes::Bytes;

use super::Record;

/// A named table's contents. The name lives in the owning map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Dense from index 0; never shrinks
    records: Vec<Record>,

    /// Positions changed since the last successful save
    modified: BTreeSet<u16>,
}

impl Table {
    /// Create a new empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a clean table from records read off disk
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            records,
            modified: BTreeSet::new(),
        }
    }

    /// Store `data` at `pos`, padding with absent slots up to `pos`
    pub fn put(&mut self, pos: u16, data: Bytes) {
        let idx = usize::from(pos);
        if idx >= self.records.len() {
            self.records.resize(idx + 1, None);
        }
        self.records[idx] = Some(data);
        self.modified.insert(pos);
    }

    /// Record at `pos`, or `None` if out of range or absent
    pub fn get(&self, pos: u16) -> Option<&Bytes> {
        self.records.get(usize::from(pos))?.as_ref()
    }

    /// Clear the slot at `pos`.
    ///
    /// Returns false (and changes nothing) when `pos` is beyond the end of
    /// the table: that slot is already absent and the table is not grown.
    pub fn delete(&mut self, pos: u16) -> bool {
        match self.records.get_mut(usize::from(pos)) {
            Some(slot) => {
                *slot = None;
                self.modified.insert(pos);
                true
            }
            None => false,
        }
    }

    /// Number of slots, absent ones included
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All slots in position order
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Positions written since the last save
    pub fn modified(&self) -> &BTreeSet<u16> {
        &self.modified
    }

    pub fn is_modified(&self) -> bool {
        !self.modified.is_empty()
    }

    /// Forget pending modifications (after a successful save)
    pub fn mark_clean(&mut self) {
        self.modified.clear();
    }
}
