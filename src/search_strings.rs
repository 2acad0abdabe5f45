//! Search string generation
//!
//! Turns show and episode metadata into the query strings sent to an
//! indexing site: one string per alternate show name, suffixed with either
//! the air date (air-by-date shows) or a season/episode token formatted from
//! the configured naming pattern.

use crate::show::{EpisodeRecord, EpisodeRef, EpisodeStore, ShowRef};
use chrono::NaiveDate;
use std::collections::HashSet;
use thiserror::Error;

/// Default naming pattern for the season/episode token (`S03E07`)
pub const DEFAULT_NAMING_PATTERN: &str = "S{seasonnumber:02}E{episodenumber:02}";

/// Errors that can occur while interpreting a season string
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeasonParseError {
    /// The season string is not of the form `YYYY-MM`
    #[error("Invalid air-by-date season '{0}', expected YYYY-MM")]
    InvalidFormat(String),

    /// The season string names a month that does not exist
    #[error("Air-by-date season '{0}' is out of range")]
    OutOfRange(String),

    /// The season string is not a season number
    #[error("Invalid season number '{0}'")]
    InvalidNumber(String),
}

/// Builds search strings for shows and episodes
#[derive(Debug, Clone)]
pub struct SearchStringBuilder {
    /// Pattern with `{seasonnumber}` and `{episodenumber}` placeholders
    naming_pattern: String,
}

impl Default for SearchStringBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_NAMING_PATTERN)
    }
}

impl SearchStringBuilder {
    /// Creates a builder using the given season/episode naming pattern
    pub fn new(naming_pattern: impl Into<String>) -> Self {
        Self {
            naming_pattern: naming_pattern.into(),
        }
    }

    /// Generates search strings for a single episode
    ///
    /// Returns an empty list if no episode is given, or if the show is
    /// air-by-date and the episode has no known air date.
    pub fn episode_search_strings(&self, episode: Option<&EpisodeRef>) -> Vec<String> {
        let Some(episode) = episode else {
            return Vec::new();
        };

        let suffix = if episode.show.air_by_date {
            match episode.airdate {
                Some(airdate) => format_air_date(airdate),
                None => {
                    tracing::debug!(
                        show_id = episode.show.id,
                        "Air-by-date episode has no air date, nothing to search for"
                    );
                    return Vec::new();
                }
            }
        } else {
            self.episode_token(episode.season, episode.episode)
        };

        with_show_names(&episode.show, &suffix)
    }

    /// Generates search strings for every searchable episode of a season
    ///
    /// For regular shows `season` is the season number; for air-by-date shows
    /// it is a `YYYY-MM` month. Only episodes the store reports as wanted or
    /// in need of a quality upgrade produce strings.
    pub fn season_search_strings(
        &self,
        show: Option<&ShowRef>,
        season: &str,
        store: &dyn EpisodeStore,
    ) -> Vec<String> {
        let Some(show) = show else {
            return Vec::new();
        };

        let records = match self.season_episodes(show, season, store) {
            Ok(records) => records,
            Err(e) => {
                tracing::debug!(show_id = show.id, "Skipping season search: {}", e);
                return Vec::new();
            }
        };

        let mut search_strings = Vec::new();

        for record in records.iter().filter(|r| r.overview.is_searchable()) {
            let suffix = if show.air_by_date {
                match record.airdate {
                    Some(airdate) => format_air_date(airdate),
                    None => continue,
                }
            } else {
                // The requested season is used, matching the store query
                let season_number = season.trim().parse().unwrap_or(record.season);
                self.episode_token(season_number, record.episode)
            };

            search_strings.extend(with_show_names(show, &suffix));
        }

        search_strings
    }

    /// Queries the store for the episodes making up a season
    fn season_episodes(
        &self,
        show: &ShowRef,
        season: &str,
        store: &dyn EpisodeStore,
    ) -> Result<Vec<EpisodeRecord>, SeasonParseError> {
        if show.air_by_date {
            let (first, last) = air_by_date_season_range(season)?;
            Ok(store.episodes_aired_between(show.id, first, last))
        } else {
            let season_number = season
                .trim()
                .parse::<u32>()
                .map_err(|_| SeasonParseError::InvalidNumber(season.to_string()))?;
            Ok(store.episodes_in_season(show.id, season_number))
        }
    }

    /// Formats the season/episode token using the naming pattern
    pub fn episode_token(&self, season: u32, episode: u32) -> String {
        let token = replace_with_padding(&self.naming_pattern, "seasonnumber", season);
        replace_with_padding(&token, "episodenumber", episode)
    }
}

/// Computes the inclusive date range covered by an air-by-date season
///
/// The season string has the form `YYYY-MM`. December always ends on the
/// 31st; every other month ends on the day before the first of the next one.
pub fn air_by_date_season_range(season: &str) -> Result<(NaiveDate, NaiveDate), SeasonParseError> {
    let (year, month) = season
        .trim()
        .split_once('-')
        .ok_or_else(|| SeasonParseError::InvalidFormat(season.to_string()))?;

    let year: i32 = year
        .parse()
        .map_err(|_| SeasonParseError::InvalidFormat(season.to_string()))?;
    let month: u32 = month
        .parse()
        .map_err(|_| SeasonParseError::InvalidFormat(season.to_string()))?;

    let out_of_range = || SeasonParseError::OutOfRange(season.to_string());

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range)?;
    let last = if month == 12 {
        NaiveDate::from_ymd_opt(year, month, 31)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).and_then(|d| d.pred_opt())
    }
    .ok_or_else(out_of_range)?;

    Ok((first, last))
}

/// Sanitizes a show name into its scene form
///
/// Removes punctuation that scene releases drop, turns separators into dots
/// and collapses runs of dots (`"Show: A & B"` becomes `"Show.A.and.B"`).
pub fn sanitize_scene_name(name: &str) -> String {
    let stripped: String = name
        .chars()
        .filter(|c| !matches!(c, ',' | ':' | '(' | ')' | '\'' | '!' | '?' | '\u{2019}'))
        .collect();

    let dotted = stripped
        .replace("- ", ".")
        .replace(' ', ".")
        .replace('&', "and")
        .replace('/', ".");

    let mut sanitized = String::with_capacity(dotted.len());
    for c in dotted.chars() {
        if c == '.' && sanitized.ends_with('.') {
            continue;
        }
        sanitized.push(c);
    }

    if sanitized.ends_with('.') {
        sanitized.pop();
    }

    sanitized
}

/// Formats an air date the way releases name it (`2021.12.03`)
fn format_air_date(airdate: NaiveDate) -> String {
    airdate.format("%Y.%m.%d").to_string()
}

/// Builds `<sanitized name> <suffix>` for every distinct alternate name
///
/// Names are deduplicated before sanitizing, keeping first-seen order.
fn with_show_names(show: &ShowRef, suffix: &str) -> Vec<String> {
    let mut seen = HashSet::new();

    show.names
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .map(|name| format!("{} {}", sanitize_scene_name(name), suffix))
        .collect()
}

/// Helper function to replace placeholders with optional zero-padding
///
/// Handles both `{name}` and `{name:NN}` where NN is the padding width
fn replace_with_padding(text: &str, name: &str, value: u32) -> String {
    let mut result = text.to_string();

    // First, handle padded versions like {seasonnumber:02}
    let pattern_start = format!("{{{name}:");
    while let Some(start) = result.find(&pattern_start) {
        let Some(end) = result[start..].find('}') else {
            break;
        };

        let full_pattern = result[start..start + end + 1].to_string();
        let padding_str = &full_pattern[pattern_start.len()..full_pattern.len() - 1];

        match padding_str.parse::<usize>() {
            Ok(width) => {
                let formatted = format!("{:0width$}", value, width = width);
                result = result.replace(&full_pattern, &formatted);
            }
            // Leave malformed placeholders alone instead of looping forever
            Err(_) => break,
        }
    }

    // Then handle unpadded version like {seasonnumber}
    let simple_pattern = format!("{{{name}}}");
    result.replace(&simple_pattern, &value.to_string())
}
