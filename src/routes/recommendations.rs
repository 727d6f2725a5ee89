use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{ExclusionSet, Movie, RecommendationBatch, TasteProfile},
    routes::{AppState, RequestLimits},
};

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub profile: TasteProfile,
    /// Titles or IMDb ids the user has already been shown
    #[serde(default)]
    pub exclude: ExclusionSet,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct NextRequest {
    pub profile: TasteProfile,
    #[serde(default)]
    pub exclude: ExclusionSet,
}

impl RequestLimits {
    fn batch_size(&self, requested: Option<usize>) -> AppResult<usize> {
        match requested {
            None => Ok(self.default_batch_size),
            Some(count) if (1..=self.max_batch_size).contains(&count) => Ok(count),
            Some(count) => Err(AppError::InvalidInput(format!(
                "count must be between 1 and {}, got {}",
                self.max_batch_size, count
            ))),
        }
    }

    fn attempt_budget(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_max_attempts)
            .min(self.max_attempts_limit)
    }
}

/// Handler for batch recommendations
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<BatchRequest>,
) -> AppResult<Json<RecommendationBatch>> {
    let target_count = state.limits.batch_size(request.count)?;
    let max_attempts = state.limits.attempt_budget(request.max_attempts);

    tracing::info!(
        request_id = %request_id,
        target_count = target_count,
        max_attempts = max_attempts,
        excluded = request.exclude.len(),
        "Processing recommendation request"
    );

    let batch = state
        .orchestrator
        .generate_batch(&request.profile, &request.exclude, target_count, max_attempts)
        .await?;

    tracing::info!(
        request_id = %request_id,
        returned = batch.movies.len(),
        attempts_used = batch.attempts_used,
        "Recommendations generated"
    );

    Ok(Json(batch))
}

/// Handler for a single fresh recommendation
pub async fn next(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<NextRequest>,
) -> AppResult<Json<Movie>> {
    tracing::info!(
        request_id = %request_id,
        excluded = request.exclude.len(),
        "Processing next-movie request"
    );

    let movie = state
        .orchestrator
        .generate_one(&request.profile, &request.exclude)
        .await?;

    Ok(Json(movie))
}
