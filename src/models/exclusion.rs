use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::Movie;

/// Titles and identifiers a recommendation run must not return
///
/// Matching is case-insensitive on the trimmed value. Entries keep their
/// original spelling and insertion order so they can be shown to the
/// suggestion model as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ExclusionSet {
    entries: Vec<String>,
    keys: HashSet<String>,
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a title or identifier. Returns `false` if it was already present
    /// or is blank.
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        let key = normalize(&value);
        if key.is_empty() || !self.keys.insert(key) {
            return false;
        }
        self.entries.push(value.trim().to_string());
        true
    }

    pub fn contains(&self, value: &str) -> bool {
        self.keys.contains(&normalize(value))
    }

    /// True if the movie's title or its identifier is excluded
    pub fn contains_movie(&self, movie: &Movie) -> bool {
        self.contains(&movie.title)
            || movie
                .imdb_id
                .as_deref()
                .is_some_and(|id| self.contains(id))
    }

    /// Excludes a movie by title and, when known, by identifier
    pub fn insert_movie(&mut self, movie: &Movie) {
        self.insert(movie.title.as_str());
        if let Some(id) = &movie.imdb_id {
            self.insert(id.as_str());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl From<Vec<String>> for ExclusionSet {
    fn from(values: Vec<String>) -> Self {
        values.into_iter().collect()
    }
}

impl From<ExclusionSet> for Vec<String> {
    fn from(set: ExclusionSet) -> Self {
        set.entries
    }
}
