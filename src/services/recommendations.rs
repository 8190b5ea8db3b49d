use std::sync::Arc;

use crate::{
    config::Config,
    models::{Movie, Recommendation, RecommendationSet, RecommendationSource},
    services::providers::{gemini::GeminiBackend, GenerativeBackend},
};

/// Maximum number of suggestions returned per request
const MAX_RECOMMENDATIONS: usize = 3;

/// Startup configuration problems for the recommendation service
///
/// Surfaced as a value instead of a panic so the catalog keeps working when
/// recommendations cannot be wired up.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Gemini API key not configured")]
    MissingApiKey,
}

/// AI-powered "similar movies" service
///
/// Asks the generative backend for suggestions and absorbs every failure
/// mode (transport, auth, quota, unparseable reply) into the curated
/// fallback table. The returned set always has entries; its `source` field
/// is the only signal distinguishing a live result from a degraded one.
pub struct RecommendationService {
    backend: Arc<dyn GenerativeBackend>,
}

impl RecommendationService {
    /// Build the service from application config.
    pub fn create(config: &Config) -> Result<Self, ConfigurationError> {
        let api_key = config
            .gemini_api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigurationError::MissingApiKey)?;

        let backend = GeminiBackend::new(
            api_key,
            config.gemini_api_url.clone(),
            config.gemini_model.clone(),
        );

        Ok(Self::with_backend(Arc::new(backend)))
    }

    /// Build the service around an arbitrary backend (used by tests).
    pub fn with_backend(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    /// Fetch up to three movies similar to the given one.
    ///
    /// Never fails: any backend or parse problem degrades to the curated
    /// table for the movie's genre. The result is tagged with the movie's id
    /// so callers can discard a reply for a movie they no longer have open.
    pub async fn get_movie_recommendations(&self, movie: &Movie) -> RecommendationSet {
        let prompt = build_prompt(&movie.title, &movie.director, &movie.genre);

        let entries = match self.backend.generate(&prompt).await {
            Ok(raw) => parse_recommendations(&raw),
            Err(e) => {
                tracing::warn!(
                    movie_id = movie.id,
                    backend = self.backend.name(),
                    error = %e,
                    "Generative backend call failed, using fallback"
                );
                None
            }
        };

        match entries {
            Some(entries) => {
                tracing::info!(
                    movie_id = movie.id,
                    backend = self.backend.name(),
                    count = entries.len(),
                    "Recommendations generated"
                );
                RecommendationSet {
                    movie_id: movie.id,
                    source: RecommendationSource::Generated,
                    entries,
                }
            }
            None => RecommendationSet {
                movie_id: movie.id,
                source: RecommendationSource::Fallback,
                entries: fallback_recommendations(&movie.genre),
            },
        }
    }
}

/// Build the instruction sent to the generative backend.
///
/// Demands a bare JSON array so the reply can be parsed under the
/// constrained contract; models still wrap it in code fences often enough
/// that parsing strips them first.
fn build_prompt(title: &str, director: &str, genre: &str) -> String {
    format!(
        r#"Suggest 3 movies similar to "{title}" directed by {director} in the {genre} genre.
Return ONLY a valid JSON array with each movie having "title" and "director" fields.
Do not include any other text or formatting.

Example format:
[
  {{"title": "Movie Title 1", "director": "Director Name 1"}},
  {{"title": "Movie Title 2", "director": "Director Name 2"}},
  {{"title": "Movie Title 3", "director": "Director Name 3"}}
]"#
    )
}

/// Remove surrounding code-fence markers and whitespace from a model reply.
fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest.strip_prefix("json").unwrap_or(rest);
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Decode a model reply into at most three recommendations.
///
/// Returns `None` when the cleaned text is not a JSON array of
/// `{title, director}` objects or when the array is empty; both cases
/// degrade to the fallback table, matching the original policy of not
/// distinguishing "no suggestions" from a malformed reply.
fn parse_recommendations(raw: &str) -> Option<Vec<Recommendation>> {
    let cleaned = strip_code_fences(raw);

    match serde_json::from_str::<Vec<Recommendation>>(cleaned) {
        Ok(entries) if !entries.is_empty() => {
            let mut entries = entries;
            entries.truncate(MAX_RECOMMENDATIONS);
            Some(entries)
        }
        Ok(_) => {
            tracing::warn!("Generative backend returned an empty recommendation array");
            None
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse generative backend reply");
            None
        }
    }
}

/// Curated fallback table, keyed by genre category.
///
/// Pure function of the genre string: matching is case-insensitive substring
/// lookup in fixed priority order (comedy, action, sci-fi, horror/thriller),
/// with drama as the default for anything unmatched.
pub fn fallback_recommendations(genre: &str) -> Vec<Recommendation> {
    let lower = genre.to_lowercase();

    let picks: [(&str, &str); 3] = if lower.contains("comedy") {
        [
            ("The Hangover", "Todd Phillips"),
            ("Superbad", "Greg Mottola"),
            ("Bridesmaids", "Paul Feig"),
        ]
    } else if lower.contains("action") {
        [
            ("The Dark Knight", "Christopher Nolan"),
            ("Mad Max: Fury Road", "George Miller"),
            ("John Wick", "Chad Stahelski"),
        ]
    } else if lower.contains("sci") || lower.contains("science") {
        [
            ("Blade Runner 2049", "Denis Villeneuve"),
            ("Interstellar", "Christopher Nolan"),
            ("The Matrix", "The Wachowskis"),
        ]
    } else if lower.contains("horror") || lower.contains("thriller") {
        [
            ("Hereditary", "Ari Aster"),
            ("The Conjuring", "James Wan"),
            ("Get Out", "Jordan Peele"),
        ]
    } else {
        [
            ("The Shawshank Redemption", "Frank Darabont"),
            ("The Godfather", "Francis Ford Coppola"),
            ("Schindler's List", "Steven Spielberg"),
        ]
    };

    picks
        .iter()
        .map(|(title, director)| Recommendation {
            title: title.to_string(),
            director: director.to_string(),
        })
        .collect()
}
