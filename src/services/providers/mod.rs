/// External data sources behind the recommendation pipeline
///
/// Two independent, unreliable remotes: a generative model that proposes a
/// movie, and a catalog that knows canonical metadata for a title. Each is a
/// trait so the orchestrator can be driven by test doubles.
use crate::{
    error::SourceResult,
    models::{EnrichmentRecord, ExclusionSet, RawSuggestion, TasteProfile},
};

#[cfg(test)]
use mockall::automock;

pub mod omdb;
pub mod openai;

pub use omdb::OmdbEnrichmentSource;
pub use openai::OpenAiSuggestionSource;

/// Proposes a single movie for a taste profile
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Asks the remote for one movie matching `profile` and not in `exclude`
    ///
    /// The remote is only steered by the exclusion list, not bound by it;
    /// callers still have to check the result.
    async fn suggest(
        &self,
        profile: &TasteProfile,
        exclude: &ExclusionSet,
    ) -> SourceResult<RawSuggestion>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Looks up canonical metadata by title
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait EnrichmentSource: Send + Sync {
    /// `Ok(None)` means the catalog has no such title
    async fn lookup(&self, title: &str) -> SourceResult<Option<EnrichmentRecord>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}
