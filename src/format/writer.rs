//! Snapshot writer
//!
//! Streams tables and records into the chunk format, then swaps the result
//! into place.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};
use crate::state::StoreState;

use super::{MAX_NAME_LEN, MAX_RECORD_LEN, RECORD_TAG, TABLE_TAG, TOMBSTONE_TAG};

/// Writes chunks to any `Write`, enforcing the format's size limits
pub struct SnapshotWriter<W: Write> {
    writer: W,
    /// Bytes emitted so far
    bytes_written: u64,
    /// Whether a table header has been written yet
    in_table: bool,
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bytes_written: 0,
            in_table: false,
        }
    }

    /// Write a table header; following records belong to this table
    pub fn begin_table(&mut self, name: &str) -> Result<()> {
        if name.len() > MAX_NAME_LEN {
            return Err(StoreError::LimitExceeded(format!(
                "table name is {} bytes (max {})",
                name.len(),
                MAX_NAME_LEN
            )));
        }

        self.writer.write_all(&TABLE_TAG)?;
        self.writer.write_all(&[name.len() as u8])?;
        self.writer.write_all(name.as_bytes())?;

        self.bytes_written += 3 + name.len() as u64;
        self.in_table = true;
        Ok(())
    }

    /// Append the next slot of the current table (`None` = absent)
    pub fn add_record(&mut self, record: Option<&[u8]>) -> Result<()> {
        if !self.in_table {
            return Err(StoreError::Format(
                "record written before any table header".to_string(),
            ));
        }

        match record {
            Some(data) => {
                if data.len() > MAX_RECORD_LEN {
                    return Err(StoreError::LimitExceeded(format!(
                        "record is {} bytes (max {})",
                        data.len(),
                        MAX_RECORD_LEN
                    )));
                }
                self.writer.write_all(&RECORD_TAG)?;
                self.writer.write_all(&(data.len() as u16).to_be_bytes())?;
                self.writer.write_all(data)?;
                self.bytes_written += 4 + data.len() as u64;
            }
            None => {
                self.writer.write_all(&TOMBSTONE_TAG)?;
                self.bytes_written += 2;
            }
        }
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

/// Write every table of `state`, in name order
fn write_state<W: Write>(out: &mut SnapshotWriter<W>, state: &StoreState) -> Result<()> {
    for (name, table) in state.tables() {
        out.begin_table(name)?;
        for record in table.records() {
            out.add_record(record.as_deref())?;
        }
    }
    Ok(())
}

/// Encode `state` into an in-memory buffer
pub fn encode(state: &StoreState) -> Result<Vec<u8>> {
    let mut out = SnapshotWriter::new(Vec::new());
    write_state(&mut out, state)?;
    out.finish()
}

/// Persist `state` to `path`, returning the file size.
///
/// The snapshot goes to `<path>.tmp` first and is renamed over `path` only
/// after it was fully written and synced. On failure the temporary file is
/// removed and whatever was at `path` is left alone.
pub fn write_snapshot(path: &Path, state: &StoreState) -> Result<u64> {
    let tmp = temp_path(path);

    let result = write_file(&tmp, state).and_then(|bytes| {
        fs::rename(&tmp, path)?;
        Ok(bytes)
    });

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_file(path: &Path, state: &StoreState) -> Result<u64> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;

    let mut out = SnapshotWriter::new(BufWriter::new(file));
    write_state(&mut out, state)?;
    let bytes = out.bytes_written();

    let file: File = out
        .finish()?
        .into_inner()
        .map_err(|e| StoreError::Io(e.into_error()))?;
    file.sync_all()?;

    Ok(bytes)
}

/// `<path>.tmp`, next to the target so the rename stays on one filesystem
fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
