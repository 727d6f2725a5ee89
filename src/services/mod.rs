pub mod enricher;
pub mod providers;
pub mod recommendations;

pub use enricher::Enricher;
pub use recommendations::RecommendationOrchestrator;
