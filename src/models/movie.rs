use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Genre;

/// A movie proposed by the suggestion source, not yet checked against a catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawSuggestion {
    pub title: String,
    pub genres: Vec<Genre>,
    pub poster_url: Option<String>,
    pub platforms: Vec<String>,
}

impl RawSuggestion {
    /// Creates a suggestion carrying only a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            genres: Vec::new(),
            poster_url: None,
            platforms: Vec::new(),
        }
    }
}

/// Canonical metadata for a title, as returned by the enrichment catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnrichmentRecord {
    pub title: String,
    pub plot: Option<String>,
    pub genres: Vec<Genre>,
    pub director: Option<String>,
    pub actors: Vec<String>,
    pub runtime_minutes: Option<u32>,
    pub rating: Option<f32>,
    pub release_date: Option<NaiveDate>,
    pub release_year: Option<i32>,
    pub content_rating: Option<String>,
    pub awards: Option<String>,
    pub poster_url: Option<String>,
    pub imdb_id: Option<String>,
}

/// A recommendation handed back to the caller
///
/// Only `title` is guaranteed. Catalog fields are filled in when enrichment
/// succeeded, which `enriched` records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub title: String,
    pub overview: Option<String>,
    pub poster_url: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub release_year: Option<i32>,
    pub genres: Vec<Genre>,
    pub platforms: Vec<String>,
    pub director: Option<String>,
    pub actors: Vec<String>,
    pub runtime_minutes: Option<u32>,
    pub rating: Option<f32>,
    pub imdb_id: Option<String>,
    pub content_rating: Option<String>,
    pub awards: Option<String>,
    pub enriched: bool,
}

impl Movie {
    /// Builds a movie from the suggestion alone, with every catalog field absent
    pub fn from_suggestion(raw: RawSuggestion) -> Self {
        Self {
            title: raw.title,
            overview: None,
            poster_url: raw.poster_url.filter(|url| is_usable_poster(url)),
            release_date: None,
            release_year: None,
            genres: raw.genres,
            platforms: raw.platforms,
            director: None,
            actors: Vec::new(),
            runtime_minutes: None,
            rating: None,
            imdb_id: None,
            content_rating: None,
            awards: None,
            enriched: false,
        }
    }

    /// Case-insensitive title comparison used for duplicate detection
    pub fn same_title(&self, other: &Movie) -> bool {
        self.title.trim().to_lowercase() == other.title.trim().to_lowercase()
    }
}

/// A poster URL is usable when it is an absolute http(s) URL
pub fn is_usable_poster(url: &str) -> bool {
    let url = url.trim();
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.contains(char::is_whitespace))
}
