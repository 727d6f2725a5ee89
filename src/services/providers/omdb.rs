/// OMDb catalog lookup
///
/// API Flow:
/// 1. `GET /?t=<title>&apikey=<key>&type=movie` → title details or `Response: "False"`
/// 2. A "not found" error becomes `Ok(None)`; any other `"False"` reply is an
///    upstream failure.
///
/// Results, misses included, are cached by lowercased title.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{SourceError, SourceResult},
    models::{EnrichmentRecord, OmdbTitle},
    services::providers::EnrichmentSource,
};
use reqwest::Client as HttpClient;

const ENRICHMENT_CACHE_TTL: u64 = 86400; // 1 day

#[derive(Clone)]
pub struct OmdbEnrichmentSource {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl OmdbEnrichmentSource {
    pub fn new(http_client: HttpClient, cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    async fn fetch(&self, title: &str) -> SourceResult<Option<EnrichmentRecord>> {
        let url = format!("{}/", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("t", title),
                ("type", "movie"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Transient(format!(
                "OMDb returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        let omdb: OmdbTitle = serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                response = %response_text,
                "Failed to deserialize OMDb response"
            );
            SourceError::Malformed(format!("Failed to parse OMDb response: {}", e))
        })?;

        interpret_response(title, omdb)
    }
}

/// Classifies a decoded OMDb reply
fn interpret_response(title: &str, omdb: OmdbTitle) -> SourceResult<Option<EnrichmentRecord>> {
    if omdb.is_found() {
        let record = EnrichmentRecord::from(omdb);
        tracing::info!(
            title = %title,
            imdb_id = ?record.imdb_id,
            provider = "omdb",
            "Metadata fetched"
        );
        return Ok(Some(record));
    }

    let error = omdb.error.unwrap_or_default();
    if is_not_found_error(&error) {
        tracing::info!(title = %title, provider = "omdb", "Title not in catalog");
        Ok(None)
    } else {
        Err(SourceError::Transient(format!("OMDb error: {}", error)))
    }
}

fn is_not_found_error(error: &str) -> bool {
    error.to_lowercase().contains("not found")
}

#[async_trait::async_trait]
impl EnrichmentSource for OmdbEnrichmentSource {
    async fn lookup(&self, title: &str) -> SourceResult<Option<EnrichmentRecord>> {
        if title.trim().is_empty() {
            return Ok(None);
        }

        cached!(
            self.cache,
            CacheKey::Enrichment(title.to_string()),
            ENRICHMENT_CACHE_TTL,
            async move { self.fetch(title.trim()).await }
        )
    }

    fn name(&self) -> &'static str {
        "omdb"
    }
}
