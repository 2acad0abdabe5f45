//! feed_scout - Search indexing sites for TV episodes and synthesize a feed
//!
//! This library turns show and episode metadata into site-specific search
//! queries, retrieves candidate releases from an indexing site (either by
//! scraping an authenticated HTML result page or by walking a paged XML
//! feed), normalizes them into (title, locator) pairs and assembles a single
//! RSS document for a polling cache to consume.

mod config;
mod feed;
mod provider;
mod search_strings;
mod show;

// Re-export error types
pub use config::ConfigError;
pub use provider::{FetchError, LoginError, ParseError};
pub use search_strings::SeasonParseError;

pub use config::{
    Config, ENV_TORRENTLEECH_PASSWORD, ENV_TORRENTLEECH_USERNAME, HttpConfig, SearchConfig,
    TorrentLeechConfig, TorrentzConfig,
};
pub use feed::synthesize_feed;
pub use provider::{
    FeedProvider, LoginSettings, Provider, RawResult, ResultFetcher, ResultParser, SearchLayout,
    Site, SiteProfile, SiteSession, ThrottledFeed,
};
pub use search_strings::{
    DEFAULT_NAMING_PATTERN, SearchStringBuilder, air_by_date_season_range, sanitize_scene_name,
};
pub use show::{
    EpisodeOverview, EpisodeRecord, EpisodeRef, EpisodeStore, InMemoryEpisodeStore, ShowRef,
};

use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Top-level error type for feed_scout operations
#[derive(Debug, Error)]
pub enum FeedScoutError {
    /// Error while loading the configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The requested provider is switched off
    #[error("Provider {0} is disabled in the configuration")]
    ProviderDisabled(String),

    /// The episode metadata file could not be parsed
    #[error("Invalid episode metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Creates the provider for `site`, refusing providers that are disabled
///
/// # Examples
///
/// ```no_run
/// use feed_scout::{Config, FeedProvider, Site, ThrottledFeed, open_provider};
///
/// let config = Config::load().unwrap();
/// let provider = open_provider(Site::Torrentz, &config).unwrap();
/// let interval = provider.profile().poll_interval;
///
/// let mut feed = ThrottledFeed::new(provider, interval);
/// println!("{}", feed.produce_feed());
/// ```
pub fn open_provider(site: Site, config: &Config) -> Result<Provider, FeedScoutError> {
    let profile = SiteProfile::for_site(site, config);

    if !profile.enabled {
        return Err(FeedScoutError::ProviderDisabled(profile.name));
    }

    Ok(Provider::new(
        profile,
        SearchStringBuilder::new(config.search.naming_pattern.clone()),
    ))
}

/// Loads show and episode metadata from a JSON file
///
/// The file holds `{"show": {...}, "episodes": [...]}`, see
/// [`InMemoryEpisodeStore`].
pub fn load_episode_store(path: &Path) -> Result<InMemoryEpisodeStore, FeedScoutError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
