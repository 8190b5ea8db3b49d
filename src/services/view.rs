use crate::models::{Movie, SortKey, ALL_GENRES};

/// Derive a display view of the catalog: filter by genre, then sort.
///
/// Pure function over a borrowed catalog; the input order is the tiebreak
/// for equal sort keys (`sort_by` is stable), and the caller's data is never
/// mutated.
pub fn view(catalog: &[Movie], genre_filter: &str, sort_key: SortKey) -> Vec<Movie> {
    let mut movies: Vec<Movie> = catalog
        .iter()
        .filter(|m| genre_filter.is_empty() || genre_filter == ALL_GENRES || m.genre == genre_filter)
        .cloned()
        .collect();

    match sort_key {
        SortKey::Title => {
            movies.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
        }
        SortKey::Rating => movies.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        SortKey::Year => movies.sort_by(|a, b| b.year.cmp(&a.year)),
    }

    movies
}
