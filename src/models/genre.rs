use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Internal genre tag
///
/// Both external sources speak in free-form, title-case labels ("Sci-Fi",
/// "Science Fiction", "Comedy"). Everything past the provider boundary works
/// with this closed set instead.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Biography,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Family,
    Fantasy,
    History,
    Horror,
    Music,
    Musical,
    Mystery,
    Romance,
    SciFi,
    Sport,
    Thriller,
    War,
    Western,
}

impl Genre {
    /// Maps a display label to its tag. Case-insensitive; unknown labels yield `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        let genre = match label.trim().to_lowercase().as_str() {
            "action" => Genre::Action,
            "adventure" => Genre::Adventure,
            "animation" | "animated" => Genre::Animation,
            "biography" | "biopic" => Genre::Biography,
            "comedy" => Genre::Comedy,
            "crime" => Genre::Crime,
            "documentary" => Genre::Documentary,
            "drama" => Genre::Drama,
            "family" => Genre::Family,
            "fantasy" => Genre::Fantasy,
            "history" | "historical" => Genre::History,
            "horror" => Genre::Horror,
            "music" => Genre::Music,
            "musical" => Genre::Musical,
            "mystery" => Genre::Mystery,
            "romance" => Genre::Romance,
            "sci-fi" | "science fiction" | "scifi" | "sci_fi" => Genre::SciFi,
            "sport" | "sports" => Genre::Sport,
            "thriller" => Genre::Thriller,
            "war" => Genre::War,
            "western" => Genre::Western,
            _ => return None,
        };
        Some(genre)
    }

    /// Title-case label used when talking to the suggestion model
    pub fn label(&self) -> &'static str {
        match self {
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Animation => "Animation",
            Genre::Biography => "Biography",
            Genre::Comedy => "Comedy",
            Genre::Crime => "Crime",
            Genre::Documentary => "Documentary",
            Genre::Drama => "Drama",
            Genre::Family => "Family",
            Genre::Fantasy => "Fantasy",
            Genre::History => "History",
            Genre::Horror => "Horror",
            Genre::Music => "Music",
            Genre::Musical => "Musical",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::SciFi => "Sci-Fi",
            Genre::Sport => "Sport",
            Genre::Thriller => "Thriller",
            Genre::War => "War",
            Genre::Western => "Western",
        }
    }
}

impl Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Tags for one label: the whole label when it is in the table, otherwise
/// every word of a compound label ("Folk Horror", "Crime/Thriller") that is
fn resolve_label(label: &str) -> Vec<Genre> {
    match Genre::from_label(label) {
        Some(genre) => vec![genre],
        None => label
            .split(|c: char| c.is_whitespace() || c == '/')
            .filter_map(Genre::from_label)
            .collect(),
    }
}

/// Maps a list of labels to tags, dropping unknown labels and repeats
pub fn map_genre_labels<'a, I>(labels: I) -> Vec<Genre>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut genres = Vec::new();
    for genre in labels.into_iter().flat_map(resolve_label) {
        if !genres.contains(&genre) {
            genres.push(genre);
        }
    }
    genres
}

/// Parses a comma-separated genre string such as `"Comedy, Drama"`
pub fn parse_genre_list(raw: &str) -> Vec<Genre> {
    map_genre_labels(raw.split(','))
}
