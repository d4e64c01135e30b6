use std::sync::Arc;
use std::time::Duration;

use corpus_common::Category;
use corpus_config::CorpusConfig;
use corpus_http::{HttpClient, PageFetcher};
use corpus_store::DataLayout;
use url::Url;

use crate::StageError;
use crate::extract::Extractor;

/// Fixed knobs for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tunables {
    pub request_timeout: Duration,
    pub max_retries: usize,
    /// Pause between listing pages.
    pub link_delay: Duration,
    /// Pause between detail pages.
    pub content_delay: Duration,
}

impl Tunables {
    pub fn from_config(cfg: &CorpusConfig) -> Self {
        Self {
            request_timeout: cfg.request_timeout(),
            max_retries: cfg.max_retries,
            link_delay: cfg.link_delay(),
            content_delay: cfg.content_delay(),
        }
    }
}

/// The one site the pipeline is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSite {
    /// Written into the `source` field of ledger lines.
    pub name: String,
    pub base_url: Url,
}

impl SourceSite {
    pub fn new(name: impl Into<String>, base_url: &str) -> Result<Self, StageError> {
        let base_url = Url::parse(base_url).map_err(|e| StageError::Url(e.to_string()))?;
        Ok(Self {
            name: name.into(),
            base_url,
        })
    }
}

/// Everything a stage needs, built once per process run and passed by reference.
pub struct RunContext {
    pub fetcher: Arc<dyn PageFetcher>,
    pub layout: DataLayout,
    pub source: SourceSite,
    pub tunables: Tunables,
    pub extractor: Extractor,
    /// Parent span for every stage in this run.
    pub span: tracing::Span,
}

impl RunContext {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        layout: DataLayout,
        source: SourceSite,
        tunables: Tunables,
    ) -> Result<Self, StageError> {
        let span = tracing::info_span!(
            "corpus.run",
            source = %source.name,
            data_dir = %layout.root().display()
        );
        Ok(Self {
            fetcher,
            layout,
            source,
            tunables,
            extractor: Extractor::new()?,
            span,
        })
    }

    /// Wire the reqwest-backed fetcher and data layout from configuration.
    pub fn from_config(cfg: &CorpusConfig) -> Result<Self, StageError> {
        let source = SourceSite::new(cfg.source.name.clone(), &cfg.source.base_url)?;
        let tunables = Tunables::from_config(cfg);
        let client = HttpClient::new(source.base_url.as_str())?
            .with_timeout(tunables.request_timeout)
            .with_retries(tunables.max_retries)
            .with_user_agent(cfg.user_agent.clone());

        Self::new(
            Arc::new(client),
            DataLayout::new(cfg.data_dir.clone()),
            source,
            tunables,
        )
    }

    /// Absolute address of listing page `page` for `category`.
    pub fn listing_url(&self, category: Category, page: u32) -> Result<String, StageError> {
        let mut url = self
            .source
            .base_url
            .join(category.listing_path())
            .map_err(|e| StageError::Url(e.to_string()))?;
        url.set_query(Some(&format!("page={page}")));
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_url_appends_page_query() {
        let cfg = CorpusConfig::default();
        let ctx = RunContext::from_config(&cfg).unwrap();
        assert_eq!(
            ctx.listing_url(Category::Articles, 7).unwrap(),
            "https://altibbi.com/%D9%85%D9%82%D8%A7%D9%84%D8%A7%D8%AA-%D8%B7%D8%A8%D9%8A%D8%A9?page=7"
        );
    }

    #[test]
    fn tunables_follow_config() {
        let cfg = CorpusConfig {
            max_retries: 0,
            link_delay_ms: 5,
            ..CorpusConfig::default()
        };
        let t = Tunables::from_config(&cfg);
        assert_eq!(t.max_retries, 0);
        assert_eq!(t.link_delay, Duration::from_millis(5));
        assert_eq!(t.content_delay, Duration::from_secs(2));
    }

    #[test]
    fn bad_base_url_is_rejected() {
        assert!(SourceSite::new("x", "not a url").is_err());
    }
}
