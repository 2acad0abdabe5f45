//! Throttled feed provider implementation
//!
//! This module provides a wrapper for feed providers that refuses to hit the
//! upstream site more often than a fixed minimum interval, handing out the
//! last produced document in between.

use super::FeedProvider;
use std::time::{Duration, Instant};

/// A throttling wrapper for feed providers
///
/// The first call always reaches the wrapped provider. Later calls only do
/// so once `min_interval` has passed since the previous refresh; otherwise
/// the previously produced document is returned unchanged.
pub struct ThrottledFeed<P>
where
    P: FeedProvider,
{
    /// The underlying feed provider
    provider: P,
    /// Minimum time between two refreshes
    min_interval: Duration,
    /// When the provider was last invoked, with the document it produced
    last_refresh: Option<(Instant, String)>,
}

impl<P> ThrottledFeed<P>
where
    P: FeedProvider,
{
    /// Creates a new throttled provider wrapping the given provider
    ///
    /// # Arguments
    ///
    /// * `provider` - The feed provider to wrap
    /// * `min_interval` - Minimum time between two calls into `provider`
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let provider = Provider::new(profile, SearchStringBuilder::default());
    /// let mut feed = ThrottledFeed::new(provider, Duration::from_secs(15 * 60));
    /// let xml = feed.produce_feed();
    /// ```
    pub fn new(provider: P, min_interval: Duration) -> Self {
        Self {
            provider,
            min_interval,
            last_refresh: None,
        }
    }

    /// Returns the wrapped provider
    pub fn inner(&self) -> &P {
        &self.provider
    }

    /// Returns true if the next call would reach the wrapped provider
    pub fn is_due(&self) -> bool {
        match &self.last_refresh {
            None => true,
            Some((refreshed_at, _)) => refreshed_at.elapsed() >= self.min_interval,
        }
    }
}

impl<P> FeedProvider for ThrottledFeed<P>
where
    P: FeedProvider,
{
    fn name(&self) -> &str {
        self.provider.name()
    }

    fn produce_feed(&mut self) -> String {
        if !self.is_due() {
            if let Some((refreshed_at, document)) = &self.last_refresh {
                tracing::debug!(
                    provider = self.provider.name(),
                    elapsed_secs = refreshed_at.elapsed().as_secs(),
                    "Skipping refresh, minimum poll interval not reached"
                );
                return document.clone();
            }
        }

        let document = self.provider.produce_feed();
        self.last_refresh = Some((Instant::now(), document.clone()));
        document
    }
}
