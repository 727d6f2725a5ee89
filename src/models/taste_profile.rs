use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::Genre;
use crate::error::{AppError, AppResult};

/// How the user feels right now
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Relaxed,
    Excited,
    Romantic,
    Thoughtful,
    Scared,
    Nostalgic,
}

impl Mood {
    /// Phrase used to steer the suggestion model
    pub fn prompt_phrase(&self) -> &'static str {
        match self {
            Mood::Happy => "upbeat and looking for something feel-good",
            Mood::Relaxed => "relaxed and wants something easy to watch",
            Mood::Excited => "excited and wants something high-energy",
            Mood::Romantic => "in a romantic mood",
            Mood::Thoughtful => "thoughtful and open to something that lingers",
            Mood::Scared => "in the mood to be scared",
            Mood::Nostalgic => "nostalgic and wants a classic",
        }
    }
}

/// User's taste profile, the input to every recommendation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TasteProfile {
    /// Genres the user likes; must not be empty
    pub genres: BTreeSet<Genre>,
    /// Streaming platforms the user has access to; must not be empty
    pub platforms: BTreeSet<String>,
    #[serde(default)]
    pub favorite_actors: Vec<String>,
    #[serde(default)]
    pub mood: Option<Mood>,
}

impl TasteProfile {
    /// Creates a profile with no favorite actors and no mood
    pub fn new<G, P, S>(genres: G, platforms: P) -> Self
    where
        G: IntoIterator<Item = Genre>,
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            genres: genres.into_iter().collect(),
            platforms: platforms.into_iter().map(Into::into).collect(),
            favorite_actors: Vec::new(),
            mood: None,
        }
    }

    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }

    pub fn with_favorite_actors<S: Into<String>>(
        mut self,
        actors: impl IntoIterator<Item = S>,
    ) -> Self {
        self.favorite_actors = actors.into_iter().map(Into::into).collect();
        self
    }

    /// Checks that there is enough to build a prompt from
    pub fn validate(&self) -> AppResult<()> {
        if self.genres.is_empty() {
            return Err(AppError::MissingPreferences(
                "At least one genre is required".to_string(),
            ));
        }
        if self.platforms.iter().all(|p| p.trim().is_empty()) {
            return Err(AppError::MissingPreferences(
                "At least one streaming platform is required".to_string(),
            ));
        }
        Ok(())
    }
}
