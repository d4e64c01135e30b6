//! Link collection over numbered listing pages.
//!
//! Pagination ends at the first page that does not answer 200, or that answers
//! with no listing items. A transport failure on one page is logged and the next
//! page number is tried. New addresses for a page are appended to the ledger in a
//! single write before moving on.

use std::collections::HashSet;

use corpus_common::{Category, LinkRecord};
use corpus_store::Ledger;
use tokio::time::sleep;
use tracing::Instrument;

use crate::{RunContext, StageError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectReport {
    /// Every known address: prior ledger contents first, then this run's discoveries.
    pub links: Vec<String>,
    /// Addresses first recorded by this run, in discovery order.
    pub new_links: Vec<String>,
    /// Listing pages fetched successfully and parsed.
    pub pages_visited: u32,
    /// Pages lost to transport failures.
    pub errors: usize,
}

/// Walk pages `1..=max_pages` of `category`, recording new addresses in `links_file`
/// (resolved under the raw data directory).
///
/// Only a ledger that cannot be opened or written aborts the stage.
pub async fn collect_links(
    ctx: &RunContext,
    category: Category,
    max_pages: u32,
    links_file: &str,
) -> Result<CollectReport, StageError> {
    let span = tracing::info_span!(parent: &ctx.span, "collect", %category, max_pages);
    collect(ctx, category, max_pages, links_file)
        .instrument(span)
        .await
}

async fn collect(
    ctx: &RunContext,
    category: Category,
    max_pages: u32,
    links_file: &str,
) -> Result<CollectReport, StageError> {
    let ledger = Ledger::new(ctx.layout.raw_file(links_file));
    let prior = ledger.load_addresses().unwrap_or_else(|e| {
        tracing::warn!(path = %ledger.path().display(), error = %e, "collector.ledger_unreadable");
        Vec::new()
    });

    let mut known: HashSet<String> = HashSet::with_capacity(prior.len());
    let mut report = CollectReport::default();
    for addr in prior {
        if known.insert(addr.clone()) {
            report.links.push(addr);
        }
    }
    tracing::info!(existing = known.len(), "collector.start");

    for page in 1..=max_pages {
        let url = ctx.listing_url(category, page)?;
        tracing::info!(page, "collector.page_start");

        let fetched = match ctx.fetcher.fetch_page(&url).await {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(page, %url, error = %e, "collector.fetch_failed");
                report.errors += 1;
                if page < max_pages {
                    sleep(ctx.tunables.link_delay).await;
                }
                continue;
            }
        };

        if !fetched.is_success() {
            tracing::info!(page, status = fetched.status, "collector.finished_on_status");
            break;
        }

        let listing = ctx.extractor.listing(&fetched.body, &ctx.source.base_url);
        if listing.items == 0 {
            tracing::info!(page, "collector.finished_on_empty_page");
            break;
        }

        let mut records = Vec::new();
        for addr in listing.links {
            if known.insert(addr.clone()) {
                records.push(LinkRecord::new(
                    ctx.source.name.clone(),
                    category,
                    page,
                    records.len(),
                    addr,
                ));
            }
        }

        ledger.append(&records)?;
        report.pages_visited += 1;
        for rec in records {
            report.links.push(rec.address.clone());
            report.new_links.push(rec.address);
        }
        tracing::info!(
            page,
            items = listing.items,
            new = report.new_links.len(),
            "collector.page_done"
        );

        if page < max_pages {
            sleep(ctx.tunables.link_delay).await;
        }
    }

    tracing::info!(
        total = report.links.len(),
        new = report.new_links.len(),
        pages = report.pages_visited,
        errors = report.errors,
        "collector.done"
    );
    Ok(report)
}
