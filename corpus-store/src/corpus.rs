//! Append-only corpus store.
//!
//! A CSV table with header [`CORPUS_HEADER`]; one row per fetched address.
//! Missing headline/body cells are written as empty strings and read back as `None`.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use corpus_common::CorpusRecord;

use crate::StoreError;

pub const CORPUS_HEADER: [&str; 3] = ["link", "headline", "articleBody"];

/// Read every row of the store. A missing file is an error here; callers that
/// treat absence as "no prior state" should use [`known_addresses`].
///
/// Individual rows that fail to decode are skipped with a warning.
pub fn read_records(path: &Path) -> Result<Vec<CorpusRecord>, StoreError> {
    let file = File::open(path).map_err(|source| StoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = rdr.headers().map_err(|source| StoreError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    // created but never written: nothing recorded yet
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    if !headers.iter().any(|h| h == "link") {
        return Err(StoreError::Malformed {
            path: path.to_path_buf(),
            message: "missing 'link' column".into(),
        });
    }

    let mut records = Vec::new();
    for (row, result) in rdr.deserialize::<CorpusRecord>().enumerate() {
        match result {
            Ok(rec) => records.push(rec),
            Err(e) => {
                tracing::warn!(path = %path.display(), row = row + 1, error = %e, "corpus.row_skipped");
            }
        }
    }
    Ok(records)
}

/// Addresses already present in the store. A missing store yields an empty set.
pub fn known_addresses(path: &Path) -> Result<HashSet<String>, StoreError> {
    match read_records(path) {
        Ok(records) => Ok(records
            .into_iter()
            .map(|r| r.address)
            .filter(|a| !a.is_empty())
            .collect()),
        Err(StoreError::Read { source, .. }) if source.kind() == ErrorKind::NotFound => {
            Ok(HashSet::new())
        }
        Err(e) => Err(e),
    }
}

/// Row-at-a-time appender. Every [`append`](Self::append) is flushed before it returns.
pub struct CorpusWriter {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CorpusWriter {
    /// Open for appending, creating the store and writing the header if it is new or empty.
    pub fn open_append(path: &Path) -> Result<Self, StoreError> {
        let needs_header = std::fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| StoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::with_file(path, file, needs_header)
    }

    /// Create (or truncate) a store and write the header.
    pub fn create(path: &Path) -> Result<Self, StoreError> {
        let file = File::create(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_file(path, file, true)
    }

    fn with_file(path: &Path, file: File, header: bool) -> Result<Self, StoreError> {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        let mut this = Self {
            path: path.to_path_buf(),
            writer,
        };
        if header {
            this.write_row(CORPUS_HEADER)?;
        }
        Ok(this)
    }

    pub fn append(&mut self, record: &CorpusRecord) -> Result<(), StoreError> {
        self.write_row([
            record.address.as_str(),
            record.headline_str(),
            record.body_str(),
        ])
    }

    fn write_row(&mut self, row: [&str; 3]) -> Result<(), StoreError> {
        self.writer
            .write_record(row)
            .map_err(|source| StoreError::Csv {
                path: self.path.clone(),
                source,
            })?;
        self.writer.flush().map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
