/// Generative suggestion source backed by an OpenAI-compatible chat API
///
/// One call per suggestion. The model is asked for a bare JSON object but is
/// not trusted to return one: the reply is scanned for the outermost braces
/// and everything around them is ignored.
use crate::{
    error::{SourceError, SourceResult},
    models::{
        ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ExclusionSet, RawSuggestion,
        SuggestionPayload, TasteProfile,
    },
    services::providers::SuggestionSource,
};
use reqwest::Client as HttpClient;

const COMPLETIONS_PATH: &str = "/v1/chat/completions";
const SUGGESTION_TEMPERATURE: f32 = 0.9;

const SYSTEM_PROMPT: &str = "You are a movie recommendation engine. You always answer with \
exactly one JSON object and nothing else, using the keys \"title\" (string), \"genres\" \
(array of strings), \"poster_url\" (string) and \"platforms\" (array of strings).";

#[derive(Clone)]
pub struct OpenAiSuggestionSource {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl OpenAiSuggestionSource {
    pub fn new(http_client: HttpClient, api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    fn build_request(&self, profile: &TasteProfile, exclude: &ExclusionSet) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(build_prompt(profile, exclude)),
            ],
            temperature: SUGGESTION_TEMPERATURE,
        }
    }
}

/// Renders the user message for one suggestion request
pub fn build_prompt(profile: &TasteProfile, exclude: &ExclusionSet) -> String {
    let mut lines = Vec::new();

    match profile.mood {
        Some(mood) => lines.push(format!(
            "Suggest one movie for someone who is {}.",
            mood.prompt_phrase()
        )),
        None => lines.push("Suggest one movie.".to_string()),
    }

    let genres: Vec<&str> = profile.genres.iter().map(|g| g.label()).collect();
    lines.push(format!("They enjoy these genres: {}.", genres.join(", ")));

    let platforms: Vec<&str> = profile.platforms.iter().map(String::as_str).collect();
    lines.push(format!(
        "It must be available to stream on at least one of: {}.",
        platforms.join(", ")
    ));

    if !profile.favorite_actors.is_empty() {
        lines.push(format!(
            "Movies featuring any of these actors are a plus: {}.",
            profile.favorite_actors.join(", ")
        ));
    }

    if !exclude.is_empty() {
        let excluded: Vec<&str> = exclude.iter().collect();
        // Vec<&str> always serializes
        let excluded = serde_json::to_string(&excluded).unwrap_or_default();
        lines.push(format!(
            "Do not suggest any movie whose title or IMDb id appears in this list: {}.",
            excluded
        ));
    }

    lines.push(
        "Only list platforms from the allowed set. Reply with the JSON object only.".to_string(),
    );

    lines.join("\n")
}

/// Slice from the first `{` to the last `}`, if there is one
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Turns the model's reply text into a suggestion
pub fn parse_suggestion_reply(content: &str) -> SourceResult<RawSuggestion> {
    let json = extract_json_object(content)
        .ok_or_else(|| SourceError::Malformed("no JSON object in reply".to_string()))?;

    let payload: SuggestionPayload = serde_json::from_str(json)
        .map_err(|e| SourceError::Malformed(format!("unexpected suggestion shape: {}", e)))?;

    let suggestion = RawSuggestion::from(payload);
    if suggestion.title.is_empty() {
        return Err(SourceError::Malformed("suggestion has an empty title".to_string()));
    }

    Ok(suggestion)
}

#[async_trait::async_trait]
impl SuggestionSource for OpenAiSuggestionSource {
    async fn suggest(
        &self,
        profile: &TasteProfile,
        exclude: &ExclusionSet,
    ) -> SourceResult<RawSuggestion> {
        let url = format!("{}{}", self.api_url, COMPLETIONS_PATH);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_request(profile, exclude))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = %status,
                provider = self.name(),
                "Suggestion request rejected"
            );
            return Err(SourceError::Transient(format!(
                "Completion API returned status {}: {}",
                status, body
            )));
        }

        let response_text = response.text().await?;
        let completion: ChatCompletionResponse =
            serde_json::from_str(&response_text).map_err(|e| {
                tracing::error!(
                    error = %e,
                    response = %response_text,
                    "Failed to deserialize completion response"
                );
                SourceError::Malformed(format!("Failed to parse completion response: {}", e))
            })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| SourceError::Malformed("completion has no content".to_string()))?;

        tracing::debug!(content = %content, "Raw suggestion reply");

        let suggestion = parse_suggestion_reply(&content)?;

        tracing::info!(
            title = %suggestion.title,
            excluded = exclude.len(),
            provider = self.name(),
            "Suggestion received"
        );

        Ok(suggestion)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
