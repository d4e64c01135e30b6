//! Content download for ledger addresses missing from the corpus store.
//!
//! The work list is computed from durable state only: ledger addresses, in ledger
//! order, minus addresses already present in the store. Each fetched page is
//! appended and flushed immediately, so an interrupted run loses at most the
//! address in flight and never re-fetches what it already stored.

use std::collections::HashSet;

use corpus_common::CorpusRecord;
use corpus_store::{CorpusWriter, Ledger, corpus};
use tokio::time::sleep;
use tracing::Instrument;

use crate::{RunContext, StageError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Addresses fetched and appended by this run.
    pub processed: usize,
    /// Addresses lost to transport failures or non-success statuses.
    pub errors: usize,
    /// Ledger addresses skipped because the store already had them.
    pub already_stored: usize,
    /// Store contents re-read after the run.
    pub records: Vec<CorpusRecord>,
}

/// Fetch every address in `links_file` that `corpus_file` does not contain yet.
/// Both names resolve under the raw data directory.
///
/// Only a store that cannot be opened or written aborts the stage.
pub async fn download_content(
    ctx: &RunContext,
    links_file: &str,
    corpus_file: &str,
) -> Result<DownloadReport, StageError> {
    let span = tracing::info_span!(parent: &ctx.span, "download", links_file, corpus_file);
    download(ctx, links_file, corpus_file).instrument(span).await
}

async fn download(
    ctx: &RunContext,
    links_file: &str,
    corpus_file: &str,
) -> Result<DownloadReport, StageError> {
    let corpus_path = ctx.layout.raw_file(corpus_file);
    let ledger = Ledger::new(ctx.layout.raw_file(links_file));

    let stored = corpus::known_addresses(&corpus_path).unwrap_or_else(|e| {
        tracing::warn!(path = %corpus_path.display(), error = %e, "downloader.corpus_unreadable");
        HashSet::new()
    });
    let ledger_addrs = ledger.load_addresses().unwrap_or_else(|e| {
        tracing::error!(path = %ledger.path().display(), error = %e, "downloader.ledger_unreadable");
        Vec::new()
    });

    let mut report = DownloadReport::default();
    let mut queued: HashSet<&str> = HashSet::new();
    let mut work: Vec<&str> = Vec::new();
    for addr in &ledger_addrs {
        if stored.contains(addr) {
            report.already_stored += 1;
        } else if queued.insert(addr.as_str()) {
            work.push(addr.as_str());
        }
    }
    tracing::info!(
        to_process = work.len(),
        already_stored = report.already_stored,
        "downloader.start"
    );

    let mut writer = CorpusWriter::open_append(&corpus_path)?;

    for (i, address) in work.iter().enumerate() {
        tracing::info!(%address, "downloader.fetch_start");

        match ctx.fetcher.fetch_page(address).await {
            Err(e) => {
                tracing::error!(%address, error = %e, "downloader.fetch_failed");
                report.errors += 1;
            }
            Ok(page) if !page.is_success() => {
                tracing::warn!(%address, status = page.status, "downloader.non_success");
                report.errors += 1;
            }
            Ok(page) => {
                let fields = ctx.extractor.article(&page.body);
                if fields.headline.is_none() || fields.body.is_none() {
                    tracing::debug!(
                        %address,
                        has_headline = fields.headline.is_some(),
                        has_body = fields.body.is_some(),
                        "downloader.partial_extraction"
                    );
                }
                writer.append(&CorpusRecord {
                    address: address.to_string(),
                    headline: fields.headline,
                    body: fields.body,
                })?;
                report.processed += 1;
                tracing::info!(processed = report.processed, "downloader.stored");
            }
        }

        if i + 1 < work.len() {
            sleep(ctx.tunables.content_delay).await;
        }
    }
    drop(writer);

    tracing::info!(
        processed = report.processed,
        errors = report.errors,
        "downloader.done"
    );

    report.records = corpus::read_records(&corpus_path).unwrap_or_else(|e| {
        tracing::error!(path = %corpus_path.display(), error = %e, "downloader.reread_failed");
        Vec::new()
    });
    Ok(report)
}
