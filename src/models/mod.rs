use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub mod exclusion;
pub mod genre;
pub mod movie;
pub mod taste_profile;

pub use exclusion::ExclusionSet;
pub use genre::{map_genre_labels, parse_genre_list, Genre};
pub use movie::{is_usable_poster, EnrichmentRecord, Movie, RawSuggestion};
pub use taste_profile::{Mood, TasteProfile};

/// Result of one `generate_batch` run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationBatch {
    /// Accepted movies in the order they were produced
    pub movies: Vec<Movie>,
    /// Attempts spent, never more than the requested budget
    pub attempts_used: u32,
    /// Set when the run was stopped before reaching its target or budget
    #[serde(default)]
    pub cancelled: bool,
}

impl RecommendationBatch {
    /// True when fewer movies came back than were asked for
    pub fn is_partial(&self, target_count: usize) -> bool {
        self.movies.len() < target_count
    }
}

// ============================================================================
// Chat Completion API Types
// ============================================================================

/// Request body for POST /v1/chat/completions
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.into()),
        }
    }
}

/// Response body for POST /v1/chat/completions
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// JSON object the suggestion model is instructed to reply with
#[derive(Debug, Clone, Deserialize)]
pub struct SuggestionPayload {
    pub title: String,
    pub genres: Vec<String>,
    pub poster_url: String,
    pub platforms: Vec<String>,
}

impl From<SuggestionPayload> for RawSuggestion {
    fn from(payload: SuggestionPayload) -> Self {
        let poster_url = Some(payload.poster_url.trim().to_string())
            .filter(|url| is_usable_poster(url));

        RawSuggestion {
            title: payload.title.trim().to_string(),
            genres: map_genre_labels(payload.genres.iter().map(String::as_str)),
            poster_url,
            platforms: payload
                .platforms
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }
}

// ============================================================================
// OMDb API Types
// ============================================================================

/// Raw OMDb title lookup response
///
/// Every field is a string and missing values come back as `"N/A"`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbTitle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub rated: Option<String>,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub runtime: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub director: Option<String>,
    #[serde(default)]
    pub actors: Option<String>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub awards: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default, rename = "imdbRating")]
    pub imdb_rating: Option<String>,
    #[serde(default, rename = "imdbID")]
    pub imdb_id: Option<String>,
    pub response: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl OmdbTitle {
    pub fn is_found(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }
}

const OMDB_MISSING: &str = "N/A";
const OMDB_RELEASE_FORMAT: &str = "%d %b %Y";

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != OMDB_MISSING)
}

/// Parses OMDb's `Released` field, e.g. `"16 Jul 2010"`
pub fn parse_release_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), OMDB_RELEASE_FORMAT).ok()
}

/// Parses `"148 min"` into minutes
pub fn parse_runtime_minutes(value: &str) -> Option<u32> {
    value.split_whitespace().next()?.parse().ok()
}

/// Takes the leading year from values like `"2010"` or `"2008–2013"`
fn parse_year(value: &str) -> Option<i32> {
    value.get(..4)?.parse().ok()
}

impl From<OmdbTitle> for EnrichmentRecord {
    fn from(omdb: OmdbTitle) -> Self {
        let release_date = present(omdb.released).and_then(|r| parse_release_date(&r));
        let release_year = release_date
            .map(|d| d.year())
            .or_else(|| present(omdb.year).and_then(|y| parse_year(&y)));

        EnrichmentRecord {
            title: present(omdb.title).unwrap_or_default(),
            plot: present(omdb.plot),
            genres: present(omdb.genre)
                .map(|g| parse_genre_list(&g))
                .unwrap_or_default(),
            director: present(omdb.director),
            actors: present(omdb.actors)
                .map(|a| {
                    a.split(',')
                        .map(|name| name.trim().to_string())
                        .filter(|name| !name.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            runtime_minutes: present(omdb.runtime).and_then(|r| parse_runtime_minutes(&r)),
            rating: present(omdb.imdb_rating).and_then(|r| r.parse().ok()),
            release_date,
            release_year,
            content_rating: present(omdb.rated),
            awards: present(omdb.awards),
            poster_url: present(omdb.poster),
            imdb_id: present(omdb.imdb_id),
        }
    }
}
