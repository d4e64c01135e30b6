//! Common types and utilities shared across the corpus crates.
//!
//! This crate defines the record model, shared error types, and observability helpers
//! used throughout the workspace. It is intentionally lightweight so that every crate can
//! depend on it without pulling in the HTTP or storage stacks.
//!
//! # Overview
//!
//! - [`Category`]: the fixed set of listing categories the collector can walk
//! - [`LinkRecord`]: one line of the link ledger
//! - [`CorpusRecord`]: one row of the corpus store
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`CorpusError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use corpus_common::{Category, LinkRecord};
//!
//! let rec = LinkRecord::new("altibbi.com", Category::News, 3, 0, "https://altibbi.com/a/1");
//! assert_eq!(rec.to_string(), "altibbi.com, news, 3, 0, https://altibbi.com/a/1");
//! ```
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod observability;

/// Field separator used by the link ledger.
pub const LEDGER_DELIMITER: &str = ", ";

/// Listing category on the source site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    News,
    Articles,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::News => "news",
            Category::Articles => "articles",
        }
    }

    /// Path of the paginated listing for this category, relative to the site root.
    pub fn listing_path(&self) -> &'static str {
        match self {
            // اخبار-طبية
            Category::News => "/%D8%A7%D8%AE%D8%A8%D8%A7%D8%B1-%D8%B7%D8%A8%D9%8A%D8%A9",
            // مقالات-طبية
            Category::Articles => "/%D9%85%D9%82%D8%A7%D9%84%D8%A7%D8%AA-%D8%B7%D8%A8%D9%8A%D8%A9",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CorpusError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "news" => Ok(Category::News),
            "articles" => Ok(Category::Articles),
            other => Err(CorpusError::UnknownCategory(other.to_string())),
        }
    }
}

/// One discovered detail-page address, as recorded in the link ledger.
///
/// Identity is the `address`; the other fields are kept for audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub source: String,
    pub category: String,
    pub page: u32,
    pub index: usize,
    pub address: String,
}

impl LinkRecord {
    pub fn new(
        source: impl Into<String>,
        category: Category,
        page: u32,
        index: usize,
        address: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            category: category.as_str().to_string(),
            page,
            index,
            address: address.into(),
        }
    }

    /// Parse one ledger line.
    ///
    /// A line is valid when it splits into at least five fields on [`LEDGER_DELIMITER`].
    /// The address is always the last field, so earlier fields may contain the delimiter.
    /// Page and index are informational and fall back to zero when unparseable.
    ///
    /// ```
    /// use corpus_common::LinkRecord;
    ///
    /// let rec = LinkRecord::parse_line("altibbi.com, news, 2, 7, https://x.test/a\n").unwrap();
    /// assert_eq!(rec.address, "https://x.test/a");
    /// assert_eq!(rec.page, 2);
    /// assert!(LinkRecord::parse_line("too, short").is_none());
    /// ```
    pub fn parse_line(line: &str) -> Option<Self> {
        let parts: Vec<&str> = line.trim().split(LEDGER_DELIMITER).collect();
        if parts.len() < 5 {
            return None;
        }
        let n = parts.len();
        let address = parts[n - 1].to_string();
        if address.is_empty() {
            return None;
        }
        Some(Self {
            source: parts[..n - 4].join(LEDGER_DELIMITER),
            category: parts[n - 4].to_string(),
            page: parts[n - 3].parse().unwrap_or_default(),
            index: parts[n - 2].parse().unwrap_or_default(),
            address,
        })
    }
}

impl fmt::Display for LinkRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}, {}, {}",
            self.source, self.category, self.page, self.index, self.address
        )
    }
}

/// Content extracted from one detail page.
///
/// `headline` and `body` are `None` when the page did not carry the field; the
/// corpus store serializes `None` as an empty cell.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CorpusRecord {
    #[serde(rename = "link")]
    pub address: String,
    #[serde(default)]
    pub headline: Option<String>,
    #[serde(rename = "articleBody", default)]
    pub body: Option<String>,
}

impl CorpusRecord {
    pub fn headline_str(&self) -> &str {
        self.headline.as_deref().unwrap_or("")
    }

    pub fn body_str(&self) -> &str {
        self.body.as_deref().unwrap_or("")
    }
}

/// Error types shared across the corpus crates.
#[derive(thiserror::Error, Debug)]
pub enum CorpusError {
    /// A category name outside the supported set.
    #[error("unknown category '{0}' (expected 'news' or 'articles')")]
    UnknownCategory(String),
}

/// Convenient alias for results that use [`CorpusError`].
pub type Result<T> = std::result::Result<T, CorpusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!("NEWS".parse::<Category>().unwrap(), Category::News);
        assert_eq!(" articles ".parse::<Category>().unwrap(), Category::Articles);
        assert!("videos".parse::<Category>().is_err());
    }

    #[test]
    fn unknown_category_names_the_rejected_value() {
        let err = "Videos".parse::<Category>().unwrap_err();
        assert!(matches!(err, CorpusError::UnknownCategory(ref s) if s == "videos"));
        assert_eq!(
            err.to_string(),
            "unknown category 'videos' (expected 'news' or 'articles')"
        );
    }

    #[test]
    fn ledger_line_takes_address_from_last_field() {
        let rec = LinkRecord::parse_line("site, with, comma, news, 4, 1, https://x.test/p?a=1")
            .expect("valid line");
        assert_eq!(rec.source, "site, with, comma");
        assert_eq!(rec.category, "news");
        assert_eq!(rec.page, 4);
        assert_eq!(rec.index, 1);
        assert_eq!(rec.address, "https://x.test/p?a=1");
    }

    #[test]
    fn ledger_line_round_trips_through_display() {
        let rec = LinkRecord::new("altibbi.com", Category::Articles, 12, 3, "https://x.test/q");
        assert_eq!(LinkRecord::parse_line(&rec.to_string()), Some(rec));
    }

    #[test]
    fn short_or_blank_lines_are_rejected() {
        assert!(LinkRecord::parse_line("").is_none());
        assert!(LinkRecord::parse_line("a, b, c, d").is_none());
        assert!(LinkRecord::parse_line("a, b, c, d, ").is_none());
    }

    #[test]
    fn empty_optional_fields_read_as_empty_strings() {
        let rec = CorpusRecord {
            address: "https://x.test".into(),
            headline: None,
            body: Some("text".into()),
        };
        assert_eq!(rec.headline_str(), "");
        assert_eq!(rec.body_str(), "text");
    }
}
