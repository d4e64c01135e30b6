//! Structured-document extraction for listing and detail pages.
//!
//! Listing pages carry repeated `article.news-article-item-container` items whose
//! first `<a>` points at a detail page. Detail pages tag their content with
//! schema.org microdata: `itemprop="headline"` and `itemprop="articleBody"`.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

const LISTING_ITEM: &str = "article.news-article-item-container";
const ITEM_LINK: &str = "a";
const HEADLINE: &str = r#"[itemprop="headline"]"#;
const ARTICLE_BODY: &str = r#"[itemprop="articleBody"]"#;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },
}

/// What a listing page yielded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingPage {
    /// Listing items found, with or without a usable link.
    pub items: usize,
    /// Absolute detail-page addresses in page order.
    pub links: Vec<String>,
}

/// The two content fields of a detail page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFields {
    pub headline: Option<String>,
    pub body: Option<String>,
}

/// Pre-parsed selectors; build once per run.
#[derive(Debug)]
pub struct Extractor {
    item: Selector,
    link: Selector,
    headline: Selector,
    body: Selector,
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|e| ExtractError::Selector {
        selector: css.to_string(),
        message: e.to_string(),
    })
}

impl Extractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            item: selector(LISTING_ITEM)?,
            link: selector(ITEM_LINK)?,
            headline: selector(HEADLINE)?,
            body: selector(ARTICLE_BODY)?,
        })
    }

    /// Listing items and their detail addresses, resolved against `base`.
    ///
    /// An item whose first anchor lacks an `href` contributes nothing.
    pub fn listing(&self, html: &str, base: &Url) -> ListingPage {
        let doc = Html::parse_document(html);
        let mut page = ListingPage::default();

        for item in doc.select(&self.item) {
            page.items += 1;
            let Some(href) = item
                .select(&self.link)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::trim)
                .filter(|h| !h.is_empty())
            else {
                continue;
            };
            match base.join(href) {
                Ok(url) => page.links.push(url.to_string()),
                Err(e) => tracing::debug!(href, error = %e, "extract.bad_href"),
            }
        }
        page
    }

    /// Headline and body of a detail page; each is `None` when absent or empty.
    pub fn article(&self, html: &str) -> ArticleFields {
        let doc = Html::parse_document(html);
        ArticleFields {
            headline: doc
                .select(&self.headline)
                .next()
                .map(|el| joined_text(el, ""))
                .filter(|s| !s.is_empty()),
            body: doc
                .select(&self.body)
                .next()
                .map(|el| joined_text(el, " "))
                .filter(|s| !s.is_empty()),
        }
    }
}

/// Trimmed, non-empty text nodes joined with `sep`.
fn joined_text(el: ElementRef<'_>, sep: &str) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(sep)
}
