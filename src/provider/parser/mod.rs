//! Result extraction from raw response bodies
//!
//! Each upstream site answers searches in its own format. A [`ResultParser`]
//! turns one response body into a list of [`RawResult`]s in source order,
//! skipping entries it cannot make sense of instead of failing the batch.

mod quick_download;
mod structured_feed;

use thiserror::Error;

/// Errors that make a whole response body unusable
#[derive(Debug, Error)]
pub enum ParseError {
    /// The structured feed is not well-formed XML
    #[error("XML error: {0}")]
    Xml(String),
}

/// A search result as a (title, locator) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResult {
    /// Release title
    pub title: String,
    /// Direct download URL or constructed magnet URI
    pub locator: String,
}

impl RawResult {
    /// Creates a result, or `None` if either part is empty
    pub fn new(title: impl Into<String>, locator: impl Into<String>) -> Option<Self> {
        let title = title.into();
        let locator = locator.into();

        if title.trim().is_empty() || locator.trim().is_empty() {
            return None;
        }

        Some(Self { title, locator })
    }
}

/// Parsing strategy for a site's search responses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultParser {
    /// HTML result table with a quick-download cell per torrent
    QuickDownload,
    /// Paged XML feed whose download locator has to be reconstructed
    StructuredFeed {
        /// Site base URL, stripped from each item's guid
        base_url: String,
    },
}

impl ResultParser {
    /// Extracts results from a response body
    pub fn parse(&self, body: &str) -> Result<Vec<RawResult>, ParseError> {
        match self {
            ResultParser::QuickDownload => Ok(quick_download::parse_results(body)),
            ResultParser::StructuredFeed { base_url } => {
                structured_feed::parse_results(body, base_url)
            }
        }
    }
}
