//! Profiles of the supported indexing sites.

use super::{LoginSettings, ResultParser, SearchLayout, SiteProfile};
use crate::config::Config;
use std::time::Duration;

/// Categories searched on TorrentLeech (TV episodes, TV boxsets, HD episodes)
const TORRENTLEECH_CATEGORIES: &str = "26,27,32";

/// Phrases TorrentLeech shows when a login did not go through
const TORRENTLEECH_LOGIN_FAILURE_MARKERS: &[&str] = &[
    "Invalid Username/password",
    "<title>Login :: TorrentLeech.org</title>",
];

/// Feed query for Torrentz: TV releases added within the last two days
const TORRENTZ_FEED_QUERY: &str = "tv added:2d";

/// The supported indexing sites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    /// Login-wall site answering searches with an HTML result table
    TorrentLeech,
    /// Open site answering searches with a paged XML feed
    Torrentz,
}

impl SiteProfile {
    /// Builds the profile of `site` from the configuration
    pub fn for_site(site: Site, config: &Config) -> Self {
        match site {
            Site::TorrentLeech => Self::torrentleech(config),
            Site::Torrentz => Self::torrentz(config),
        }
    }

    /// Profile for TorrentLeech: authenticated scraping of the browse page
    pub fn torrentleech(config: &Config) -> Self {
        let site = &config.torrentleech;

        Self {
            name: "TorrentLeech".to_string(),
            base_url: site.base_url.clone(),
            enabled: site.enabled,
            login: Some(LoginSettings {
                username: site.username.clone(),
                password: site.password.clone(),
                failure_markers: TORRENTLEECH_LOGIN_FAILURE_MARKERS
                    .iter()
                    .map(|marker| marker.to_string())
                    .collect(),
            }),
            layout: SearchLayout::CategoryBrowse {
                categories: TORRENTLEECH_CATEGORIES.to_string(),
            },
            parser: ResultParser::QuickDownload,
            not_found_is_empty: false,
            // The browse page without a query lists the latest TV releases
            feed_query: String::new(),
            poll_interval: Duration::from_secs(site.poll_interval_minutes * 60),
            request_timeout: Duration::from_secs(config.http.request_timeout_secs),
            login_timeout: Duration::from_secs(config.http.login_timeout_secs),
        }
    }

    /// Profile for Torrentz: paged XML feed with magnet reconstruction
    pub fn torrentz(config: &Config) -> Self {
        let site = &config.torrentz;

        Self {
            name: "Torrentz".to_string(),
            base_url: site.base_url.clone(),
            enabled: site.enabled,
            login: None,
            layout: SearchLayout::PagedFeed {
                pages: site.pages,
                page_delay: Duration::from_millis(site.page_delay_ms),
            },
            parser: ResultParser::StructuredFeed {
                base_url: site.base_url.clone(),
            },
            not_found_is_empty: true,
            feed_query: TORRENTZ_FEED_QUERY.to_string(),
            poll_interval: Duration::from_secs(site.poll_interval_minutes * 60),
            request_timeout: Duration::from_secs(config.http.request_timeout_secs),
            login_timeout: Duration::from_secs(config.http.login_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profiles() {
        let config = Config::default();

        let torrentleech = SiteProfile::for_site(Site::TorrentLeech, &config);
        assert_eq!(torrentleech.base_url, "https://classic.torrentleech.org/");
        assert!(torrentleech.login.is_some());
        assert!(!torrentleech.not_found_is_empty);
        assert_eq!(torrentleech.poll_interval, Duration::from_secs(15 * 60));
        assert_eq!(torrentleech.login_timeout, Duration::from_secs(30));

        let torrentz = SiteProfile::for_site(Site::Torrentz, &config);
        assert!(torrentz.login.is_none());
        assert!(torrentz.not_found_is_empty);
        assert_eq!(torrentz.feed_query, "tv added:2d");
        assert_eq!(
            torrentz.layout,
            SearchLayout::PagedFeed {
                pages: 2,
                page_delay: Duration::from_secs(1),
            }
        );
        assert_eq!(
            torrentz.parser,
            ResultParser::StructuredFeed {
                base_url: "https://torrentz2.eu/".to_string(),
            }
        );
    }
}
