use serde::{Deserialize, Deserializer, Serialize};

/// Unique identifier for a movie in the catalog.
///
/// Time-derived (epoch milliseconds) with a monotonic bump, so ids stay
/// unique even when two movies are added within the same millisecond.
pub type MovieId = i64;

/// A movie record in the catalog
///
/// Records are immutable once created: there is no update operation,
/// only add and delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub director: String,
    pub genre: String,
    pub year: i32,
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
}

/// Candidate for a new catalog entry, before an id has been minted.
///
/// `year` and `rating` accept either JSON numbers or form-style strings
/// ("2021", "8.0") and are coerced on deserialization. Business validation
/// (non-empty fields, plausible ranges) is the HTTP layer's job.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub director: String,
    pub genre: String,
    #[serde(deserialize_with = "int_or_string")]
    pub year: i32,
    #[serde(deserialize_with = "float_or_string")]
    pub rating: f64,
    #[serde(default)]
    pub synopsis: Option<String>,
}

fn int_or_string<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i32),
        Str(String),
    }

    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(v) => Ok(v),
        IntOrString::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn float_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FloatOrString {
        Float(f64),
        Str(String),
    }

    match FloatOrString::deserialize(deserializer)? {
        FloatOrString::Float(v) => Ok(v),
        FloatOrString::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// A single "similar movie" suggestion
///
/// Transient: produced fresh per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub title: String,
    pub director: String,
}

/// Where a recommendation result came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationSource {
    /// Parsed out of a live generative-model response
    Generated,
    /// Served from the static curated table
    Fallback,
}

/// Result of a recommendation request, tagged with the movie id it was
/// built for so callers can discard responses for movies they no longer
/// have open.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationSet {
    pub movie_id: MovieId,
    pub source: RecommendationSource,
    pub entries: Vec<Recommendation>,
}

/// Sort key for catalog views
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Ascending, case-insensitive lexicographic
    #[default]
    Title,
    /// Descending numeric
    Rating,
    /// Descending numeric
    Year,
}

/// Genre filter sentinel that matches every record
pub const ALL_GENRES: &str = "All";

/// The fixed seed set used to bootstrap an empty catalog
pub fn seed_catalog() -> Vec<Movie> {
    vec![
        Movie {
            id: 1,
            title: "Inception".to_string(),
            director: "Christopher Nolan".to_string(),
            genre: "Sci-Fi".to_string(),
            year: 2010,
            rating: 8.8,
            synopsis: Some(
                "A skilled thief who steals corporate secrets through dream-sharing \
                 technology is given the inverse task of planting an idea into the mind \
                 of a C.E.O."
                    .to_string(),
            ),
        },
        Movie {
            id: 2,
            title: "The Dark Knight".to_string(),
            director: "Christopher Nolan".to_string(),
            genre: "Action".to_string(),
            year: 2008,
            rating: 9.0,
            synopsis: Some(
                "When the menace known as the Joker wreaks havoc and chaos on the people \
                 of Gotham, Batman must accept one of the greatest psychological and \
                 physical tests of his ability to fight injustice."
                    .to_string(),
            ),
        },
        Movie {
            id: 3,
            title: "Pulp Fiction".to_string(),
            director: "Quentin Tarantino".to_string(),
            genre: "Drama".to_string(),
            year: 1994,
            rating: 8.9,
            synopsis: Some(
                "The lives of two mob hitmen, a boxer, a gangster and his wife, and a \
                 pair of diner bandits intertwine in four tales of violence and \
                 redemption."
                    .to_string(),
            ),
        },
        Movie {
            id: 4,
            title: "Interstellar".to_string(),
            director: "Christopher Nolan".to_string(),
            genre: "Sci-Fi".to_string(),
            year: 2014,
            rating: 8.6,
            synopsis: Some(
                "A team of explorers travel through a wormhole in space in an attempt to \
                 ensure humanity's survival."
                    .to_string(),
            ),
        },
        Movie {
            id: 5,
            title: "The Matrix".to_string(),
            director: "Lana Wachowski".to_string(),
            genre: "Sci-Fi".to_string(),
            year: 1999,
            rating: 8.7,
            synopsis: Some(
                "A computer programmer is led to fight an underground war against \
                 powerful computers who have constructed his entire reality with a \
                 system called the Matrix."
                    .to_string(),
            ),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_movie_coerces_string_fields() {
        let json = r#"{
            "title": "Dune",
            "director": "Denis Villeneuve",
            "genre": "Sci-Fi",
            "year": "2021",
            "rating": "8.0"
        }"#;

        let candidate: NewMovie = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.year, 2021);
        assert_eq!(candidate.rating, 8.0);
        assert_eq!(candidate.synopsis, None);
    }

    #[test]
    fn test_new_movie_accepts_numeric_fields() {
        let json = r#"{
            "title": "Dune",
            "director": "Denis Villeneuve",
            "genre": "Sci-Fi",
            "year": 2021,
            "rating": 8.0
        }"#;

        let candidate: NewMovie = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.year, 2021);
        assert_eq!(candidate.rating, 8.0);
    }

    #[test]
    fn test_new_movie_rejects_garbage_year() {
        let json = r#"{
            "title": "Dune",
            "director": "Denis Villeneuve",
            "genre": "Sci-Fi",
            "year": "next year",
            "rating": "8.0"
        }"#;

        assert!(serde_json::from_str::<NewMovie>(json).is_err());
    }

    #[test]
    fn test_sort_key_deserialization() {
        assert_eq!(
            serde_json::from_str::<SortKey>("\"title\"").unwrap(),
            SortKey::Title
        );
        assert_eq!(
            serde_json::from_str::<SortKey>("\"rating\"").unwrap(),
            SortKey::Rating
        );
        assert_eq!(
            serde_json::from_str::<SortKey>("\"year\"").unwrap(),
            SortKey::Year
        );
    }

    #[test]
    fn test_movie_snapshot_round_trip() {
        let seed = seed_catalog();
        let json = serde_json::to_string(&seed).unwrap();
        let restored: Vec<Movie> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, seed);
    }

    #[test]
    fn test_seed_catalog_ids_unique() {
        let seed = seed_catalog();
        let mut ids: Vec<MovieId> = seed.iter().map(|m| m.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), seed.len());
    }
}
