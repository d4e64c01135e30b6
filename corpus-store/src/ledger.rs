//! Append-only link ledger.
//!
//! Line format: `source, category, page, index, address`. Lines that do not split
//! into at least five fields are ignored on load.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

use corpus_common::LinkRecord;

use crate::StoreError;

#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All valid records in file order. A missing ledger is an empty ledger.
    pub fn load_records(&self) -> Result<Vec<LinkRecord>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let mut records = Vec::new();
        let mut skipped = 0usize;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| StoreError::Read {
                path: self.path.clone(),
                source,
            })?;
            match LinkRecord::parse_line(&line) {
                Some(rec) => records.push(rec),
                None if line.trim().is_empty() => {}
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::debug!(path = %self.path.display(), skipped, "ledger.lines_skipped");
        }
        Ok(records)
    }

    /// Addresses in file order, duplicates included.
    pub fn load_addresses(&self) -> Result<Vec<String>, StoreError> {
        Ok(self
            .load_records()?
            .into_iter()
            .map(|r| r.address)
            .collect())
    }

    pub fn known_addresses(&self) -> Result<HashSet<String>, StoreError> {
        Ok(self.load_addresses()?.into_iter().collect())
    }

    /// Append records in one write and flush before returning.
    ///
    /// The file is opened (and created) even when `records` is empty so an
    /// unwritable ledger is reported on the first page rather than silently later.
    pub fn append(&self, records: &[LinkRecord]) -> Result<(), StoreError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| StoreError::Open {
                path: self.path.clone(),
                source,
            })?;

        if records.is_empty() {
            return Ok(());
        }

        let mut buf = String::new();
        for rec in records {
            buf.push_str(&rec.to_string());
            buf.push('\n');
        }
        file.write_all(buf.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })
    }
}
