//! Show and episode metadata consumed by the search engine
//!
//! These structures mirror what the external metadata store knows about a
//! show. The engine only ever reads them; the store itself is reached through
//! the [`EpisodeStore`] trait.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A show as known to the metadata store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowRef {
    /// Identifier of the show in the metadata store
    pub id: u64,
    /// Whether episodes are identified by air date instead of season/episode
    #[serde(default)]
    pub air_by_date: bool,
    /// Alternate display names, already expanded by the name helper
    pub names: Vec<String>,
}

/// A single episode of a show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    /// The show this episode belongs to
    pub show: ShowRef,
    /// Season number
    pub season: u32,
    /// Episode number within the season
    pub episode: u32,
    /// Original air date, if known
    pub airdate: Option<NaiveDate>,
}

/// Overview classification of an episode's download status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpisodeOverview {
    /// Not aired yet
    Unaired,
    /// Already snatched, waiting for the download
    Snatched,
    /// Missing and wanted
    Wanted,
    /// Present, but a better quality is desired
    Qual,
    /// Present in an acceptable quality
    Good,
    /// Deliberately skipped
    Skipped,
}

impl EpisodeOverview {
    /// Returns true if episodes with this overview should be searched for.
    pub fn is_searchable(self) -> bool {
        matches!(self, EpisodeOverview::Wanted | EpisodeOverview::Qual)
    }
}

/// One episode row as returned by the metadata store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub season: u32,
    pub episode: u32,
    #[serde(default)]
    pub airdate: Option<NaiveDate>,
    pub overview: EpisodeOverview,
}

/// Read access to the episode metadata store.
///
/// Implementors answer the two queries a season-level search needs: all
/// episodes of a numbered season, and all episodes aired within a date range
/// (inclusive on both ends) for air-by-date shows.
pub trait EpisodeStore {
    /// Episodes of the given show in the given season.
    fn episodes_in_season(&self, show_id: u64, season: u32) -> Vec<EpisodeRecord>;

    /// Episodes of the given show aired between `first` and `last` inclusive.
    fn episodes_aired_between(
        &self,
        show_id: u64,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Vec<EpisodeRecord>;
}

/// An episode store backed by a plain list of records for a single show.
///
/// Used by the CLI (loaded from a JSON file) and in tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryEpisodeStore {
    /// The show all records belong to
    pub show: Option<ShowRef>,
    /// Episode records in store order
    #[serde(default)]
    pub episodes: Vec<EpisodeRecord>,
}

impl InMemoryEpisodeStore {
    /// Creates a store holding the given records for `show`.
    pub fn new(show: ShowRef, episodes: Vec<EpisodeRecord>) -> Self {
        Self {
            show: Some(show),
            episodes,
        }
    }

    fn owns(&self, show_id: u64) -> bool {
        self.show.as_ref().is_some_and(|show| show.id == show_id)
    }
}

impl EpisodeStore for InMemoryEpisodeStore {
    fn episodes_in_season(&self, show_id: u64, season: u32) -> Vec<EpisodeRecord> {
        if !self.owns(show_id) {
            return Vec::new();
        }

        self.episodes
            .iter()
            .filter(|record| record.season == season)
            .cloned()
            .collect()
    }

    fn episodes_aired_between(
        &self,
        show_id: u64,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Vec<EpisodeRecord> {
        if !self.owns(show_id) {
            return Vec::new();
        }

        self.episodes
            .iter()
            .filter(|record| {
                record
                    .airdate
                    .is_some_and(|airdate| airdate >= first && airdate <= last)
            })
            .cloned()
            .collect()
    }
}
