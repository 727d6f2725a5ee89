use serde::Deserialize;

use crate::services::recommendations::DEFAULT_MAX_ATTEMPTS;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// API key for the chat-completion endpoint that generates suggestions
    pub openai_api_key: String,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_openai_api_url")]
    pub openai_api_url: String,

    /// Model used for suggestions
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// OMDb API key
    pub omdb_api_key: String,

    /// OMDb API base URL
    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    /// Redis connection URL; enrichment caching is disabled when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Timeout applied to every outbound HTTP request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Batch size used when a request does not specify one
    #[serde(default = "default_batch_size")]
    pub default_batch_size: usize,

    /// Largest batch a single request may ask for
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Attempt budget used when a request does not specify one
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Upper bound on a client-supplied attempt budget
    #[serde(default = "default_max_attempts_limit")]
    pub max_attempts_limit: u32,
}

fn default_openai_api_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_omdb_api_url() -> String {
    "https://www.omdbapi.com".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_batch_size() -> usize {
    5
}

fn default_max_batch_size() -> usize {
    20
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_max_attempts_limit() -> u32 {
    30
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}
