use std::path::Path;

use corpus_common::CorpusRecord;
use serde::Serialize;

use crate::corpus::read_records;

/// Descriptive statistics over a corpus store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusStats {
    pub total_articles: usize,
    pub articles_with_headline: usize,
    pub articles_with_content: usize,
    /// Whitespace-delimited tokens across all bodies.
    pub total_words: usize,
    /// Mean body length in characters, over records that have a body.
    pub average_article_length: f64,
}

impl CorpusStats {
    pub fn from_records(records: &[CorpusRecord]) -> Self {
        let mut with_headline = 0usize;
        let mut with_content = 0usize;
        let mut total_words = 0usize;
        let mut total_chars = 0usize;

        for rec in records {
            if !rec.headline_str().is_empty() {
                with_headline += 1;
            }
            let body = rec.body_str();
            if !body.is_empty() {
                with_content += 1;
                total_chars += body.chars().count();
                total_words += body.split_whitespace().count();
            }
        }

        let average_article_length = if with_content == 0 {
            0.0
        } else {
            total_chars as f64 / with_content as f64
        };

        Self {
            total_articles: records.len(),
            articles_with_headline: with_headline,
            articles_with_content: with_content,
            total_words,
            average_article_length,
        }
    }
}

/// Compute stats for the store at `path`.
///
/// Read failures are logged and yield `None` rather than an error.
pub fn corpus_stats(path: &Path) -> Option<CorpusStats> {
    match read_records(path) {
        Ok(records) => {
            let stats = CorpusStats::from_records(&records);
            tracing::info!(
                path = %path.display(),
                total = stats.total_articles,
                words = stats.total_words,
                "stats.computed"
            );
            Some(stats)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "stats.read_failed");
            None
        }
    }
}
