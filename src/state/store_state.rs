//! Store state
//!
//! Table name → table, plus the store-wide modified flag.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::error::{Result, StoreError};

use super::Table;

/// Every table in the store.
///
/// Tables are kept in a `BTreeMap` so that iteration, and therefore the
/// table order in a saved file, is lexicographic by name.
#[derive(Debug, Default)]
pub struct StoreState {
    tables: BTreeMap<String, Table>,

    /// At least one write since the last successful save or load
    modified: bool,
}

impl StoreState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap tables parsed from disk; the result is clean
    pub fn from_tables(tables: BTreeMap<String, Table>) -> Self {
        Self {
            tables,
            modified: false,
        }
    }

    /// Store raw bytes at `table[pos]`, creating the table if needed
    pub fn put(&mut self, table: &str, pos: u16, data: Bytes) {
        match self.tables.get_mut(table) {
            Some(t) => t.put(pos, data),
            None => {
                let mut t = Table::new();
                t.put(pos, data);
                self.tables.insert(table.to_string(), t);
            }
        }
        self.modified = true;
    }

    /// Read `table[pos]`
    ///
    /// Returns:
    /// - `Err(TableNotFound)` if no such table exists
    /// - `Err(RecordNotFound)` if `pos` is out of range or the slot is absent
    pub fn get(&self, table: &str, pos: u16) -> Result<Bytes> {
        let t = self
            .tables
            .get(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;

        t.get(pos).cloned().ok_or_else(|| StoreError::RecordNotFound {
            table: table.to_string(),
            pos,
        })
    }

    /// Clear `table[pos]`. A missing table or out-of-range position is a
    /// no-op; returns whether anything changed.
    pub fn delete(&mut self, table: &str, pos: u16) -> bool {
        let changed = self
            .tables
            .get_mut(table)
            .map(|t| t.delete(pos))
            .unwrap_or(false);
        if changed {
            self.modified = true;
        }
        changed
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Tables in name order
    pub fn tables(&self) -> impl Iterator<Item = (&str, &Table)> {
        self.tables.iter().map(|(name, t)| (name.as_str(), t))
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Total slots across all tables
    pub fn record_count(&self) -> usize {
        self.tables.values().map(Table::len).sum()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Clear the store-wide flag and every table's modified set
    pub fn mark_clean(&mut self) {
        for t in self.tables.values_mut() {
            t.mark_clean();
        }
        self.modified = false;
    }
}
