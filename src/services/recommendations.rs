use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::{
    error::{AppError, AppResult, SourceError},
    models::{ExclusionSet, Movie, RecommendationBatch, TasteProfile},
    services::{enricher::Enricher, providers::SuggestionSource},
};

/// Attempt budget when the caller does not pick one
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Assembles batches of fresh, distinct recommendations
///
/// Each attempt is one suggestion call plus, when it succeeds, one
/// enrichment. Attempts run one after another because every suggestion
/// request carries everything accepted so far in its exclusion list.
/// Separate calls share nothing mutable and may run concurrently.
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    suggestions: Arc<dyn SuggestionSource>,
    enricher: Enricher,
    default_max_attempts: u32,
}

impl RecommendationOrchestrator {
    pub fn new(suggestions: Arc<dyn SuggestionSource>, enricher: Enricher) -> Self {
        Self {
            suggestions,
            enricher,
            default_max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Sets the attempt budget used by `generate_one`
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.default_max_attempts = max_attempts;
        self
    }

    /// Produces up to `target_count` movies not in `exclude`
    ///
    /// Returns a partial batch when the budget runs out after at least one
    /// movie was accepted, and `GenerationFailed` when none was.
    pub async fn generate_batch(
        &self,
        profile: &TasteProfile,
        exclude: &ExclusionSet,
        target_count: usize,
        max_attempts: u32,
    ) -> AppResult<RecommendationBatch> {
        self.generate_batch_cancellable(
            profile,
            exclude,
            target_count,
            max_attempts,
            &CancellationToken::new(),
        )
        .await
    }

    /// Same as `generate_batch`, but stops before the next attempt once
    /// `cancel` fires and returns what was accepted so far
    #[instrument(
        skip_all,
        fields(target_count = target_count, max_attempts = max_attempts, excluded = exclude.len())
    )]
    pub async fn generate_batch_cancellable(
        &self,
        profile: &TasteProfile,
        exclude: &ExclusionSet,
        target_count: usize,
        max_attempts: u32,
        cancel: &CancellationToken,
    ) -> AppResult<RecommendationBatch> {
        profile.validate()?;

        if target_count == 0 {
            return Err(AppError::InvalidInput(
                "Target count must be at least 1".to_string(),
            ));
        }
        if max_attempts == 0 {
            return Err(AppError::InvalidInput(
                "Attempt budget must be at least 1".to_string(),
            ));
        }

        let mut working_exclude = exclude.clone();
        let mut movies: Vec<Movie> = Vec::with_capacity(target_count);
        let mut attempts: u32 = 0;
        let mut last_error: Option<SourceError> = None;

        while movies.len() < target_count && attempts < max_attempts {
            if cancel.is_cancelled() {
                tracing::info!(
                    accepted = movies.len(),
                    attempts = attempts,
                    "Batch generation cancelled"
                );
                return Ok(RecommendationBatch {
                    movies,
                    attempts_used: attempts,
                    cancelled: true,
                });
            }

            attempts += 1;

            let raw = match self.suggestions.suggest(profile, &working_exclude).await {
                Ok(raw) if raw.title.trim().is_empty() => {
                    tracing::warn!(attempt = attempts, "Suggestion came back without a title");
                    last_error = Some(SourceError::Malformed(
                        "suggestion has an empty title".to_string(),
                    ));
                    continue;
                }
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(attempt = attempts, error = %e, "Suggestion attempt failed");
                    last_error = Some(e);
                    continue;
                }
            };

            let candidate = self.enricher.enrich(raw).await;

            if working_exclude.contains_movie(&candidate)
                || movies.iter().any(|m| m.same_title(&candidate))
            {
                tracing::debug!(
                    attempt = attempts,
                    title = %candidate.title,
                    "Discarding duplicate suggestion"
                );
                continue;
            }

            tracing::info!(
                attempt = attempts,
                title = %candidate.title,
                enriched = candidate.enriched,
                "Accepted recommendation"
            );
            working_exclude.insert_movie(&candidate);
            movies.push(candidate);
        }

        if movies.is_empty() {
            tracing::error!(
                attempts = attempts,
                last_error = ?last_error,
                "No recommendation produced within the attempt budget"
            );
            return Err(AppError::GenerationFailed {
                attempts,
                last_error,
            });
        }

        let batch = RecommendationBatch {
            movies,
            attempts_used: attempts,
            cancelled: false,
        };

        if batch.is_partial(target_count) {
            tracing::warn!(
                accepted = batch.movies.len(),
                target_count = target_count,
                attempts = attempts,
                "Returning partial batch"
            );
        }

        Ok(batch)
    }

    /// Produces a single fresh movie, e.g. for "tonight's pick"
    pub async fn generate_one(
        &self,
        profile: &TasteProfile,
        exclude: &ExclusionSet,
    ) -> AppResult<Movie> {
        let batch = self
            .generate_batch(profile, exclude, 1, self.default_max_attempts)
            .await?;

        batch.movies.into_iter().next().ok_or_else(|| {
            AppError::Internal("Successful batch contained no movie".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EnrichmentRecord, Genre, RawSuggestion};
    use crate::services::providers::{MockEnrichmentSource, MockSuggestionSource};
    use crate::routes::RequestLimits;

    fn profile() -> TasteProfile {
        TasteProfile::new([Genre::Thriller], ["Netflix"])
    }

    fn raw(title: &str) -> RawSuggestion {
        RawSuggestion {
            title: title.to_string(),
            genres: vec![Genre::Thriller],
            poster_url: None,
            platforms: vec!["Netflix".to_string()],
        }
    }

    fn enrichment_always_found() -> MockEnrichmentSource {
        let mut source = MockEnrichmentSource::new();
        source.expect_lookup().returning(|title| {
            Ok(Some(EnrichmentRecord {
                title: title.to_string(),
                director: Some("Someone".to_string()),
                ..Default::default()
            }))
        });
        source
    }

    fn orchestrator(
        suggestions: MockSuggestionSource,
        enrichment: MockEnrichmentSource,
    ) -> RecommendationOrchestrator {
        RecommendationOrchestrator::new(
            Arc::new(suggestions),
            Enricher::new(Arc::new(enrichment)),
        )
    }

    fn titles(batch: &RecommendationBatch) -> Vec<&str> {
        batch.movies.iter().map(|m| m.title.as_str()).collect()
    }

    #[tokio::test]
    async fn test_repeated_titles_are_discarded() {
        let sequence = ["A", "B", "A", "C", "D", "B", "E"];
        let mut call = 0usize;
        let mut suggestions = MockSuggestionSource::new();
        suggestions
            .expect_suggest()
            .times(7)
            .returning(move |_, _| {
                let title = sequence[call];
                call += 1;
                Ok(raw(title))
            });

        let batch = orchestrator(suggestions, enrichment_always_found())
            .generate_batch(&profile(), &ExclusionSet::new(), 5, 10)
            .await
            .unwrap();

        assert_eq!(titles(&batch), vec!["A", "B", "C", "D", "E"]);
        assert_eq!(batch.attempts_used, 7);
        assert!(!batch.cancelled);
    }

    #[tokio::test]
    async fn test_working_exclusion_grows_with_accepted_titles() {
        let mut call = 0usize;
        let mut suggestions = MockSuggestionSource::new();
        suggestions
            .expect_suggest()
            .times(3)
            .returning(move |_, exclude| {
                // One caller-supplied entry plus one per accepted movie
                assert_eq!(exclude.len(), 1 + call);
                call += 1;
                Ok(raw(&format!("Movie {}", call)))
            });

        let exclude: ExclusionSet = ["Seen Before"].into_iter().collect();
        let mut enrichment = MockEnrichmentSource::new();
        enrichment.expect_lookup().returning(|_| Ok(None));

        let batch = orchestrator(suggestions, enrichment)
            .generate_batch(&profile(), &exclude, 3, 3)
            .await
            .unwrap();

        assert_eq!(batch.movies.len(), 3);
        assert_eq!(exclude.len(), 1);
    }

    #[tokio::test]
    async fn test_caller_exclusions_are_never_returned() {
        let sequence = ["Se7en", "ZODIAC", "Prisoners"];
        let mut call = 0usize;
        let mut suggestions = MockSuggestionSource::new();
        suggestions.expect_suggest().returning(move |_, _| {
            let title = sequence[call % sequence.len()];
            call += 1;
            Ok(raw(title))
        });

        let exclude: ExclusionSet = ["se7en", "Zodiac"].into_iter().collect();
        let batch = orchestrator(suggestions, enrichment_always_found())
            .generate_batch(&profile(), &exclude, 3, 6)
            .await
            .unwrap();

        assert_eq!(titles(&batch), vec!["Prisoners"]);
        assert_eq!(batch.attempts_used, 6);
        assert!(batch.is_partial(3));
    }

    #[tokio::test]
    async fn test_identifier_in_exclusion_rejects_renamed_title() {
        let mut suggestions = MockSuggestionSource::new();
        suggestions
            .expect_suggest()
            .times(2)
            .returning(|_, _| Ok(raw("Heat (1995)")));

        let mut enrichment = MockEnrichmentSource::new();
        enrichment.expect_lookup().returning(|_| {
            Ok(Some(EnrichmentRecord {
                title: "Heat".to_string(),
                imdb_id: Some("tt0113277".to_string()),
                ..Default::default()
            }))
        });

        let exclude: ExclusionSet = ["tt0113277"].into_iter().collect();
        let result = orchestrator(suggestions, enrichment)
            .generate_batch(&profile(), &exclude, 1, 2)
            .await;

        assert!(matches!(
            result,
            Err(AppError::GenerationFailed {
                attempts: 2,
                last_error: None
            })
        ));
    }

    #[tokio::test]
    async fn test_failed_suggestions_consume_attempts() {
        let mut call = 0usize;
        let mut suggestions = MockSuggestionSource::new();
        suggestions
            .expect_suggest()
            .times(4)
            .returning(move |_, _| {
                call += 1;
                match call {
                    1 => Err(SourceError::Transient("timeout".to_string())),
                    2 => Err(SourceError::Malformed("no JSON object in reply".to_string())),
                    _ => Ok(raw(&format!("Movie {}", call))),
                }
            });

        let batch = orchestrator(suggestions, enrichment_always_found())
            .generate_batch(&profile(), &ExclusionSet::new(), 2, 10)
            .await
            .unwrap();

        assert_eq!(titles(&batch), vec!["Movie 3", "Movie 4"]);
        assert_eq!(batch.attempts_used, 4);
    }

    #[tokio::test]
    async fn test_always_transient_fails_after_exact_budget() {
        let mut suggestions = MockSuggestionSource::new();
        suggestions
            .expect_suggest()
            .times(4)
            .returning(|_, _| Err(SourceError::Transient("502 Bad Gateway".to_string())));

        let mut enrichment = MockEnrichmentSource::new();
        enrichment.expect_lookup().never();

        let result = orchestrator(suggestions, enrichment)
            .generate_batch(&profile(), &ExclusionSet::new(), 3, 4)
            .await;

        match result {
            Err(AppError::GenerationFailed {
                attempts,
                last_error,
            }) => {
                assert_eq!(attempts, 4);
                assert_eq!(
                    last_error,
                    Some(SourceError::Transient("502 Bad Gateway".to_string()))
                );
            }
            other => panic!("expected GenerationFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_genres_short_circuits() {
        let mut suggestions = MockSuggestionSource::new();
        suggestions.expect_suggest().never();

        let profile = TasteProfile::new(Vec::<Genre>::new(), ["Netflix"]);
        let result = orchestrator(suggestions, MockEnrichmentSource::new())
            .generate_batch(&profile, &ExclusionSet::new(), 5, 10)
            .await;

        assert!(matches!(result, Err(AppError::MissingPreferences(_))));
    }

    #[tokio::test]
    async fn test_missing_platforms_short_circuits() {
        let mut suggestions = MockSuggestionSource::new();
        suggestions.expect_suggest().never();

        let profile = TasteProfile::new([Genre::Drama], Vec::<String>::new());
        let result = orchestrator(suggestions, MockEnrichmentSource::new())
            .generate_one(&profile, &ExclusionSet::new())
            .await;

        assert!(matches!(result, Err(AppError::MissingPreferences(_))));
    }

    #[tokio::test]
    async fn test_zero_target_or_budget_is_invalid() {
        let mut suggestions = MockSuggestionSource::new();
        suggestions.expect_suggest().never();
        let orchestrator = orchestrator(suggestions, MockEnrichmentSource::new());

        let zero_target = orchestrator
            .generate_batch(&profile(), &ExclusionSet::new(), 0, 10)
            .await;
        let zero_budget = orchestrator
            .generate_batch(&profile(), &ExclusionSet::new(), 3, 0)
            .await;

        assert!(matches!(zero_target, Err(AppError::InvalidInput(_))));
        assert!(matches!(zero_budget, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_enrichment_failure_still_yields_movie() {
        let mut suggestions = MockSuggestionSource::new();
        suggestions
            .expect_suggest()
            .times(1)
            .returning(|_, _| Ok(raw("Nightcrawler")));

        let mut enrichment = MockEnrichmentSource::new();
        enrichment
            .expect_lookup()
            .times(1)
            .returning(|_| Err(SourceError::Transient("connection refused".to_string())));
        enrichment.expect_name().return_const("omdb");

        let movie = orchestrator(suggestions, enrichment)
            .generate_one(&profile(), &ExclusionSet::new())
            .await
            .unwrap();

        assert_eq!(movie.title, "Nightcrawler");
        assert!(!movie.enriched);
    }

    #[tokio::test]
    async fn test_generate_one_uses_configured_budget() {
        let mut suggestions = MockSuggestionSource::new();
        suggestions
            .expect_suggest()
            .times(2)
            .returning(|_, _| Err(SourceError::Malformed("empty".to_string())));

        let result = orchestrator(suggestions, MockEnrichmentSource::new())
            .with_max_attempts(2)
            .generate_one(&profile(), &ExclusionSet::new())
            .await;

        assert!(matches!(
            result,
            Err(AppError::GenerationFailed { attempts: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_generate_one_default_budget_matches_config() {
        let mut suggestions = MockSuggestionSource::new();
        suggestions
            .expect_suggest()
            .times(DEFAULT_MAX_ATTEMPTS as usize)
            .returning(|_, _| Err(SourceError::Transient("timeout".to_string())));

        let result = orchestrator(suggestions, MockEnrichmentSource::new())
            .generate_one(&profile(), &ExclusionSet::new())
            .await;

        assert!(matches!(
            result,
            Err(AppError::GenerationFailed { attempts: 10, .. })
        ));
        assert_eq!(
            RequestLimits::default().default_max_attempts,
            DEFAULT_MAX_ATTEMPTS
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_start_returns_empty_batch() {
        let mut suggestions = MockSuggestionSource::new();
        suggestions.expect_suggest().never();

        let token = CancellationToken::new();
        token.cancel();

        let batch = orchestrator(suggestions, MockEnrichmentSource::new())
            .generate_batch_cancellable(&profile(), &ExclusionSet::new(), 3, 10, &token)
            .await
            .unwrap();

        assert!(batch.cancelled);
        assert!(batch.movies.is_empty());
        assert_eq!(batch.attempts_used, 0);
    }
}
