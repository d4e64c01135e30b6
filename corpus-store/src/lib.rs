//! Durable state for the acquisition pipeline.
//!
//! - [`layout`]: where things live under the data directory
//! - [`ledger`]: append-only link ledger (one `", "`-delimited record per line)
//! - [`corpus`]: append-only corpus store (CSV with a `link,headline,articleBody` header)
//! - [`stats`]: descriptive statistics over a corpus store
//! - [`clean`]: normalization pass producing a cleaned copy of a corpus store
//!
//! Loaders return [`StoreError`] for unreadable state; the pipeline stages decide
//! whether that is fatal (opening for append) or merely "no prior state" (loading).

use std::path::PathBuf;

use thiserror::Error;

pub mod clean;
pub mod corpus;
pub mod layout;
pub mod ledger;
pub mod stats;

pub use clean::clean_corpus;
pub use corpus::{CorpusWriter, CORPUS_HEADER};
pub use layout::DataLayout;
pub use ledger::Ledger;
pub use stats::{CorpusStats, corpus_stats};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot open {} for writing: {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("write to {} failed: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("csv error in {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[error("malformed store {}: {message}", path.display())]
    Malformed { path: PathBuf, message: String },
}
