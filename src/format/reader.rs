//! Snapshot reader
//!
//! Parses the chunk stream into a staging map. Nothing is handed back until
//! the whole stream parsed, so a failed load never leaves partial state.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use bytes::Bytes;

use crate::error::{Result, StoreError};
use crate::state::{Record, Table};

use super::{MAX_TABLE_LEN, RECORD_TAG, TABLE_TAG, TOMBSTONE_TAG};

/// Reads chunks from any `Read`
pub struct SnapshotReader<R: Read> {
    reader: R,
    /// Bytes consumed so far, for error messages
    offset: u64,
}

impl<R: Read> SnapshotReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, offset: 0 }
    }

    /// Parse the remaining stream into tables
    pub fn read_tables(mut self) -> Result<BTreeMap<String, Table>> {
        let mut tables = BTreeMap::new();
        let mut current: Option<(String, Vec<Record>)> = None;

        while let Some(tag) = self.read_tag()? {
            let chunk_offset = self.offset - 2;

            match tag {
                TABLE_TAG => {
                    if let Some((name, records)) = current.take() {
                        insert_table(&mut tables, name, records)?;
                    }
                    current = Some((self.read_name()?, Vec::new()));
                }
                RECORD_TAG | TOMBSTONE_TAG => {
                    let (name, records) = current.as_mut().ok_or_else(|| {
                        StoreError::Format(format!(
                            "record encountered before table header at offset {}",
                            chunk_offset
                        ))
                    })?;

                    if records.len() >= MAX_TABLE_LEN {
                        return Err(StoreError::Format(format!(
                            "table {:?} has more than {} records",
                            name, MAX_TABLE_LEN
                        )));
                    }

                    let record = if tag == RECORD_TAG {
                        Some(self.read_payload()?)
                    } else {
                        None
                    };
                    records.push(record);
                }
                other => {
                    return Err(StoreError::Format(format!(
                        "unknown chunk tag {:?} at offset {}",
                        String::from_utf8_lossy(&other),
                        chunk_offset
                    )));
                }
            }
        }

        if let Some((name, records)) = current.take() {
            insert_table(&mut tables, name, records)?;
        }

        Ok(tables)
    }

    /// Next 2-byte tag, or `None` at a clean end of stream
    fn read_tag(&mut self) -> Result<Option<[u8; 2]>> {
        let mut tag = [0u8; 2];
        let mut filled = 0;

        while filled < tag.len() {
            match self.reader.read(&mut tag[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.offset += filled as u64;

        match filled {
            0 => Ok(None),
            2 => Ok(Some(tag)),
            _ => Err(self.truncated()),
        }
    }

    /// Table header body: u8 length + name bytes
    fn read_name(&mut self) -> Result<String> {
        let mut len = [0u8; 1];
        self.fill(&mut len)?;

        let mut name = vec![0u8; len[0] as usize];
        self.fill(&mut name)?;

        String::from_utf8(name)
            .map_err(|_| StoreError::Format("table name is not valid UTF-8".to_string()))
    }

    /// Record chunk body: u16 BE length + payload
    fn read_payload(&mut self) -> Result<Bytes> {
        let mut len = [0u8; 2];
        self.fill(&mut len)?;

        let mut data = vec![0u8; u16::from_be_bytes(len) as usize];
        self.fill(&mut data)?;
        Ok(Bytes::from(data))
    }

    /// `read_exact`, reporting EOF as a truncated chunk
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        match self.reader.read_exact(buf) {
            Ok(()) => {
                self.offset += buf.len() as u64;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(self.truncated()),
            Err(e) => Err(e.into()),
        }
    }

    fn truncated(&self) -> StoreError {
        StoreError::Format(format!("truncated chunk near offset {}", self.offset))
    }
}

fn insert_table(
    tables: &mut BTreeMap<String, Table>,
    name: String,
    records: Vec<Record>,
) -> Result<()> {
    if tables.contains_key(&name) {
        return Err(StoreError::Format(format!(
            "duplicate table header {:?}",
            name
        )));
    }
    tables.insert(name, Table::from_records(records));
    Ok(())
}

/// Parse a complete snapshot from a reader
pub fn decode<R: Read>(reader: R) -> Result<BTreeMap<String, Table>> {
    SnapshotReader::new(reader).read_tables()
}

/// Parse the snapshot file at `path`
pub fn read_snapshot(path: &Path) -> Result<BTreeMap<String, Table>> {
    let file = File::open(path)?;
    decode(BufReader::new(file))
}
