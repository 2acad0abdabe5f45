//! Indexing site providers
//!
//! A [`Provider`] is one parameterized search engine for one site. What
//! differs between sites (login wall, URL layout, paging, response format)
//! lives in its [`SiteProfile`]; the pipeline itself is shared:
//! query → URL(s) → fetch → parse → results → feed document.
mod fetcher;
mod parser;
mod session;
mod sites;
mod throttled;

pub use fetcher::{FetchError, ResultFetcher};
pub use parser::{ParseError, RawResult, ResultParser};
pub use session::{LoginError, LoginSettings, SiteSession};
pub use sites::Site;
pub use throttled::ThrottledFeed;

use crate::feed::synthesize_feed;
use crate::search_strings::SearchStringBuilder;
use crate::show::{EpisodeRef, EpisodeStore, ShowRef};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::Url;
use std::thread;
use std::time::Duration;

/// Characters escaped when a query is embedded as a URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// How a site expects search requests to be laid out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchLayout {
    /// A single browse page filtered by category ids
    CategoryBrowse {
        /// Comma separated category ids
        categories: String,
    },
    /// A structured feed fetched page by page
    PagedFeed {
        /// Number of pages to fetch per search
        pages: u32,
        /// Pause between two page requests
        page_delay: Duration,
    },
}

/// Everything that distinguishes one indexing site from another
#[derive(Debug, Clone)]
pub struct SiteProfile {
    /// Display name, also used in logs and as the feed title
    pub name: String,
    /// Base URL including the trailing slash
    pub base_url: String,
    /// Whether the provider is switched on in the configuration
    pub enabled: bool,
    /// Login settings for sites behind a login wall
    pub login: Option<LoginSettings>,
    /// URL layout and paging of search requests
    pub layout: SearchLayout,
    /// How response bodies are turned into results
    pub parser: ResultParser,
    /// Whether a 404 means "no results" rather than an error
    pub not_found_is_empty: bool,
    /// Query used when producing the periodic feed
    pub feed_query: String,
    /// Minimum interval between two feed refreshes
    pub poll_interval: Duration,
    /// Budget for a single search request
    pub request_timeout: Duration,
    /// Budget for the login request
    pub login_timeout: Duration,
}

/// Trait for anything that can produce a current feed document.
///
/// Implemented by [`Provider`] and by [`ThrottledFeed`], which wraps another
/// provider to limit how often it runs.
pub trait FeedProvider {
    /// The provider's display name
    fn name(&self) -> &str;

    /// Produces the current feed document.
    ///
    /// Failures never surface here: they degrade to an empty or partial
    /// feed and are reported through the log.
    fn produce_feed(&mut self) -> String;
}

/// Search and feed engine for one indexing site
#[derive(Debug)]
pub struct Provider {
    profile: SiteProfile,
    search_strings: SearchStringBuilder,
    session: SiteSession,
    fetcher: ResultFetcher,
}

impl Provider {
    /// Creates a provider for the given site
    ///
    /// No network traffic happens until the first search.
    pub fn new(profile: SiteProfile, search_strings: SearchStringBuilder) -> Self {
        tracing::debug!(provider = %profile.name, "Initializing provider");

        let session = SiteSession::new(&profile);
        let fetcher = ResultFetcher::new(profile.not_found_is_empty);

        Self {
            profile,
            search_strings,
            session,
            fetcher,
        }
    }

    pub fn profile(&self) -> &SiteProfile {
        &self.profile
    }

    pub fn base_url(&self) -> &str {
        &self.profile.base_url
    }

    pub fn is_enabled(&self) -> bool {
        self.profile.enabled
    }

    /// File name of the provider's icon
    pub fn image_name(&self) -> String {
        format!("{}.png", self.profile.name.to_lowercase())
    }

    /// Both supported sites can search for past episodes
    pub fn supports_backlog(&self) -> bool {
        true
    }

    /// Returns true if a session with the site currently exists
    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Search strings for all searchable episodes of a season
    pub fn season_search_strings(
        &self,
        show: Option<&ShowRef>,
        season: &str,
        store: &dyn EpisodeStore,
    ) -> Vec<String> {
        self.search_strings
            .season_search_strings(show, season, store)
    }

    /// Search strings for a single episode
    pub fn episode_search_strings(&self, episode: Option<&EpisodeRef>) -> Vec<String> {
        self.search_strings.episode_search_strings(episode)
    }

    /// Builds the request URLs for a query, in fetch order
    pub fn search_urls(&self, query: &str) -> Vec<String> {
        let base_url = &self.profile.base_url;

        match &self.profile.layout {
            SearchLayout::CategoryBrowse { categories } => {
                let query = query.replace(':', "");
                vec![format!(
                    "{}torrents/browse/index/query/{}/categories/{}/newfilter/3",
                    base_url,
                    utf8_percent_encode(&query, PATH_SEGMENT),
                    categories
                )]
            }
            SearchLayout::PagedFeed { pages, .. } => (0..*pages)
                .filter_map(|page| {
                    let page = page.to_string();
                    match Url::parse_with_params(
                        &format!("{}feed", base_url),
                        &[("f", query), ("p", page.as_str())],
                    ) {
                        Ok(url) => Some(url.to_string()),
                        Err(e) => {
                            tracing::error!(base_url = %base_url, "Invalid feed URL: {}", e);
                            None
                        }
                    }
                })
                .collect(),
        }
    }

    /// Runs a search and returns the results in site order
    ///
    /// Pages are fetched sequentially with the site's page delay in between.
    /// A page that fails to load or parse is logged and skipped; a failed
    /// login aborts the search.
    #[tracing::instrument(skip(self), fields(provider = %self.profile.name))]
    pub fn search(&mut self, query: &str) -> Vec<RawResult> {
        tracing::info!("Performing search: {}", query);

        let page_delay = match &self.profile.layout {
            SearchLayout::PagedFeed { page_delay, .. } => *page_delay,
            SearchLayout::CategoryBrowse { .. } => Duration::ZERO,
        };

        let mut results = Vec::new();

        for (index, url) in self.search_urls(query).iter().enumerate() {
            if index > 0 && !page_delay.is_zero() {
                thread::sleep(page_delay);
            }

            let body = match self.fetcher.fetch(&mut self.session, url) {
                Ok(Some(body)) => body,
                Ok(None) => {
                    tracing::info!(url = %url, "No results found");
                    continue;
                }
                Err(e @ FetchError::NotAuthenticated { .. }) => {
                    tracing::error!("{}", e);
                    break;
                }
                Err(e) => {
                    tracing::error!("{}", e);
                    continue;
                }
            };

            if body.trim().is_empty() {
                tracing::warn!(url = %url, "Error no data returned");
                continue;
            }

            match self.profile.parser.parse(&body) {
                Ok(page_results) if page_results.is_empty() => {
                    tracing::info!(url = %url, "No results found");
                }
                Ok(page_results) => {
                    tracing::info!(url = %url, count = page_results.len(), "Some results found");
                    results.extend(page_results);
                }
                Err(e) => {
                    tracing::error!(url = %url, "Discarding page: {}", e);
                }
            }
        }

        results
    }
}

impl FeedProvider for Provider {
    fn name(&self) -> &str {
        &self.profile.name
    }

    #[tracing::instrument(skip(self), fields(provider = %self.profile.name))]
    fn produce_feed(&mut self) -> String {
        tracing::info!("Retrieving feed");

        let query = self.profile.feed_query.clone();
        let results = self.search(&query);

        synthesize_feed(&self.profile.name, &self.profile.base_url, &results)
    }
}
