//! Acquisition stages for the corpus pipeline.
//!
//! - [`collector`]: walks numbered listing pages and appends new detail addresses
//!   to the link ledger
//! - [`downloader`]: fetches every ledger address missing from the corpus store and
//!   appends `(link, headline, articleBody)` rows
//! - [`extract`]: `scraper`-based listing/detail extraction
//! - [`context`]: the per-run [`RunContext`] handed to each stage
//!
//! Both stages read only durable state at start-up, so either can be re-run after an
//! interruption and picks up where it left off.

use corpus_http::HttpError;
use corpus_store::StoreError;
use thiserror::Error;

pub mod collector;
pub mod context;
pub mod downloader;
pub mod extract;

pub use collector::{CollectReport, collect_links};
pub use context::{RunContext, SourceSite, Tunables};
pub use downloader::{DownloadReport, download_content};
pub use extract::{ArticleFields, ExtractError, Extractor, ListingPage};

/// Failures that stop a stage. Per-page and per-address problems never surface here.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("invalid URL: {0}")]
    Url(String),
}
