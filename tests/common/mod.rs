#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use reelpick_api::{
    error::{SourceError, SourceResult},
    models::{EnrichmentRecord, ExclusionSet, Genre, RawSuggestion, TasteProfile},
    services::{
        providers::{EnrichmentSource, SuggestionSource},
        Enricher, RecommendationOrchestrator,
    },
};
use tokio_util::sync::CancellationToken;

pub fn profile() -> TasteProfile {
    TasteProfile::new([Genre::Horror, Genre::Thriller], ["Netflix", "Shudder"])
}

pub fn raw(title: &str) -> RawSuggestion {
    RawSuggestion {
        title: title.to_string(),
        genres: vec![Genre::Horror],
        poster_url: None,
        platforms: vec!["Shudder".to_string()],
    }
}

/// Replays a fixed list of replies, then keeps failing
#[derive(Default)]
pub struct ScriptedSuggestions {
    replies: Mutex<VecDeque<SourceResult<RawSuggestion>>>,
    calls: AtomicUsize,
    seen_exclusions: Mutex<Vec<Vec<String>>>,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl ScriptedSuggestions {
    pub fn titles(titles: &[&str]) -> Self {
        Self::replies(titles.iter().map(|t| Ok(raw(t))).collect())
    }

    pub fn replies(replies: Vec<SourceResult<RawSuggestion>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    /// Fires `token` once `calls` suggestions have been served
    pub fn cancelling_after(mut self, calls: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((calls, token));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_exclusions(&self) -> Vec<Vec<String>> {
        self.seen_exclusions.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SuggestionSource for ScriptedSuggestions {
    async fn suggest(
        &self,
        _profile: &TasteProfile,
        exclude: &ExclusionSet,
    ) -> SourceResult<RawSuggestion> {
        let served = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.seen_exclusions
            .lock()
            .unwrap()
            .push(exclude.iter().map(str::to_string).collect());

        if let Some((after, token)) = &self.cancel_after {
            if served >= *after {
                token.cancel();
            }
        }

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SourceError::Transient("script exhausted".to_string())))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Catalog that knows a fixed set of titles
#[derive(Default)]
pub struct FakeCatalog {
    records: Vec<EnrichmentRecord>,
    unavailable: bool,
    calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn knowing(records: Vec<EnrichmentRecord>) -> Self {
        Self {
            records,
            ..Default::default()
        }
    }

    /// Catalog whose every lookup fails with a transient error
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EnrichmentSource for FakeCatalog {
    async fn lookup(&self, title: &str) -> SourceResult<Option<EnrichmentRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(SourceError::Transient("catalog down".to_string()));
        }
        Ok(self
            .records
            .iter()
            .find(|r| r.title.eq_ignore_ascii_case(title))
            .cloned())
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

pub fn record(title: &str, imdb_id: &str, director: &str) -> EnrichmentRecord {
    EnrichmentRecord {
        title: title.to_string(),
        director: Some(director.to_string()),
        imdb_id: Some(imdb_id.to_string()),
        runtime_minutes: Some(100),
        rating: Some(7.5),
        ..Default::default()
    }
}

pub fn orchestrator(
    suggestions: Arc<ScriptedSuggestions>,
    catalog: Arc<FakeCatalog>,
) -> RecommendationOrchestrator {
    RecommendationOrchestrator::new(suggestions, Enricher::new(catalog))
}
