use std::sync::Arc;

use crate::{
    error::SourceResult,
    models::{is_usable_poster, EnrichmentRecord, Movie, RawSuggestion},
    services::providers::EnrichmentSource,
};

/// Resolved outcome of a catalog lookup
pub type LookupOutcome = SourceResult<Option<EnrichmentRecord>>;

/// Merges a suggestion with a catalog lookup outcome
///
/// Never fails. When the lookup missed or errored, the movie carries only the
/// suggestion's own fields. Otherwise the suggestion's genres (when it has
/// any) and platforms win, since they say why the movie was picked, and the
/// record fills in everything else.
pub fn merge(raw: RawSuggestion, outcome: LookupOutcome) -> Movie {
    let record = match outcome {
        Ok(Some(record)) => record,
        Ok(None) | Err(_) => return Movie::from_suggestion(raw),
    };

    let poster_url = raw
        .poster_url
        .filter(|url| is_usable_poster(url))
        .or_else(|| record.poster_url.filter(|url| is_usable_poster(url)));

    let genres = if raw.genres.is_empty() {
        record.genres
    } else {
        raw.genres
    };

    Movie {
        title: raw.title,
        overview: record.plot,
        poster_url,
        release_date: record.release_date,
        release_year: record.release_year,
        genres,
        platforms: raw.platforms,
        director: record.director,
        actors: record.actors,
        runtime_minutes: record.runtime_minutes,
        rating: record.rating,
        imdb_id: record.imdb_id,
        content_rating: record.content_rating,
        awards: record.awards,
        enriched: true,
    }
}

/// Attaches catalog metadata to suggestions
#[derive(Clone)]
pub struct Enricher {
    source: Arc<dyn EnrichmentSource>,
}

impl Enricher {
    pub fn new(source: Arc<dyn EnrichmentSource>) -> Self {
        Self { source }
    }

    /// Looks the suggestion up and merges whatever came back
    pub async fn enrich(&self, raw: RawSuggestion) -> Movie {
        let outcome = self.source.lookup(&raw.title).await;
        if let Err(e) = &outcome {
            tracing::warn!(
                title = %raw.title,
                provider = self.source.name(),
                error = %e,
                "Enrichment failed, keeping suggestion as-is"
            );
        }
        merge(raw, outcome)
    }
}
