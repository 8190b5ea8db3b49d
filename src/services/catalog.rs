use chrono::Utc;
use tokio::sync::watch;

use crate::{
    db::SnapshotStore,
    error::{AppError, AppResult},
    models::{seed_catalog, Movie, MovieId, NewMovie, ALL_GENRES},
};

/// Owner of the authoritative in-memory catalog.
///
/// Insertion order is the canonical order. Every mutation rewrites the full
/// snapshot through the store; a failed write logs a warning and the session
/// continues in-memory-only rather than failing the mutation. Observers
/// subscribe to a revision channel and re-query on change.
///
/// Methods are synchronous; callers with concurrent access serialize
/// mutations through a single lock around the repository (see `AppState`).
pub struct CatalogRepository {
    store: SnapshotStore,
    movies: Vec<Movie>,
    last_id: MovieId,
    changes: watch::Sender<u64>,
}

impl CatalogRepository {
    /// Load the catalog from the snapshot store, bootstrapping the seed set
    /// when no usable snapshot exists.
    pub fn open(store: SnapshotStore) -> Self {
        let movies = match store.load() {
            Some(movies) => {
                tracing::info!(movies = movies.len(), "Catalog loaded from snapshot");
                movies
            }
            None => {
                let seed = seed_catalog();
                tracing::info!(movies = seed.len(), "No snapshot found, seeding catalog");
                if let Err(e) = store.save(&seed) {
                    tracing::warn!(error = %e, "Failed to persist seed catalog");
                }
                seed
            }
        };

        let last_id = movies.iter().map(|m| m.id).max().unwrap_or(0);
        let (changes, _) = watch::channel(0);

        Self {
            store,
            movies,
            last_id,
            changes,
        }
    }

    /// Mint a fresh unique id: epoch milliseconds, bumped past the highest
    /// id ever handed out so consecutive adds in one millisecond stay
    /// distinct.
    fn mint_id(&mut self) -> MovieId {
        let id = Utc::now().timestamp_millis().max(self.last_id + 1);
        self.last_id = id;
        id
    }

    /// Append a new movie to the catalog and persist.
    ///
    /// The candidate arrives already validated (the HTTP layer owns the
    /// validation contract); only id minting happens here.
    pub fn add(&mut self, candidate: NewMovie) -> Movie {
        let movie = Movie {
            id: self.mint_id(),
            title: candidate.title,
            director: candidate.director,
            genre: candidate.genre,
            year: candidate.year,
            rating: candidate.rating,
            synopsis: candidate.synopsis,
        };

        self.movies.push(movie.clone());
        self.persist();
        self.notify();

        tracing::info!(movie_id = movie.id, title = %movie.title, "Movie added");
        movie
    }

    /// Remove a movie by id and persist.
    ///
    /// An unknown id is a `NotFound` signal; the catalog and snapshot are
    /// left untouched.
    pub fn delete(&mut self, id: MovieId) -> AppResult<()> {
        let position = self
            .movies
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("No movie with id {}", id)))?;

        let removed = self.movies.remove(position);
        self.persist();
        self.notify();

        tracing::info!(movie_id = id, title = %removed.title, "Movie deleted");
        Ok(())
    }

    pub fn get_by_id(&self, id: MovieId) -> Option<&Movie> {
        self.movies.iter().find(|m| m.id == id)
    }

    /// Owned snapshot of the catalog in insertion order.
    pub fn list(&self) -> Vec<Movie> {
        self.movies.clone()
    }

    /// Distinct genre values, lexicographically sorted, with the "All"
    /// sentinel prepended for filter UIs.
    pub fn genres(&self) -> Vec<String> {
        let mut genres: Vec<String> = self.movies.iter().map(|m| m.genre.clone()).collect();
        genres.sort();
        genres.dedup();

        let mut result = Vec::with_capacity(genres.len() + 1);
        result.push(ALL_GENRES.to_string());
        result.extend(genres);
        result
    }

    /// Subscribe to catalog change notifications.
    ///
    /// The channel carries a revision counter; observers re-query the
    /// catalog when it ticks rather than receiving the data itself.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.movies) {
            tracing::warn!(
                error = %e,
                "Failed to persist catalog snapshot, continuing in-memory only"
            );
        }
    }

    fn notify(&self) {
        self.changes.send_modify(|rev| *rev += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn repo_in(dir: &std::path::Path) -> CatalogRepository {
        CatalogRepository::open(SnapshotStore::new(dir.join("movies.json")))
    }

    fn dune_candidate() -> NewMovie {
        // Form-style strings exercise the coercion path end to end
        serde_json::from_value(json!({
            "title": "Dune",
            "director": "Denis Villeneuve",
            "genre": "Sci-Fi",
            "year": "2021",
            "rating": "8.0"
        }))
        .unwrap()
    }

    #[test]
    fn test_open_without_snapshot_seeds_and_persists() {
        let dir = tempdir().unwrap();
        let repo = repo_in(dir.path());

        assert_eq!(repo.list().len(), 5);
        assert_eq!(repo.list()[0].title, "Inception");

        // The seed was written through the store immediately
        let store = SnapshotStore::new(dir.path().join("movies.json"));
        assert_eq!(store.load().unwrap().len(), 5);
    }

    #[test]
    fn test_open_with_corrupt_snapshot_reseeds() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("movies.json"), b"not json at all").unwrap();

        let repo = repo_in(dir.path());
        assert_eq!(repo.list().len(), 5);
    }

    #[test]
    fn test_add_coerces_and_persists_round_trip() {
        let dir = tempdir().unwrap();
        let mut repo = repo_in(dir.path());

        let movie = repo.add(dune_candidate());
        assert_eq!(movie.year, 2021);
        assert_eq!(movie.rating, 8.0);
        assert_eq!(repo.get_by_id(movie.id).unwrap().title, "Dune");

        // Reload from disk: identical 6-record catalog
        let reloaded = repo_in(dir.path());
        assert_eq!(reloaded.list().len(), 6);
        assert_eq!(reloaded.list(), repo.list());
    }

    #[test]
    fn test_added_ids_are_unique_and_appended() {
        let dir = tempdir().unwrap();
        let mut repo = repo_in(dir.path());

        for _ in 0..10 {
            repo.add(dune_candidate());
        }

        let movies = repo.list();
        assert_eq!(movies.len(), 15);

        let mut ids: Vec<MovieId> = movies.iter().map(|m| m.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 15);

        // Insertion order preserved: the ten additions sit at the end
        assert!(movies[5..].iter().all(|m| m.title == "Dune"));
    }

    #[test]
    fn test_delete_removes_and_persists() {
        let dir = tempdir().unwrap();
        let mut repo = repo_in(dir.path());

        repo.delete(3).unwrap();
        assert_eq!(repo.list().len(), 4);
        assert!(repo.get_by_id(3).is_none());

        let reloaded = repo_in(dir.path());
        assert_eq!(reloaded.list().len(), 4);
    }

    #[test]
    fn test_delete_unknown_id_is_not_found_and_a_no_op() {
        let dir = tempdir().unwrap();
        let mut repo = repo_in(dir.path());
        let before = repo.list();

        let result = repo.delete(99999);
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(repo.list(), before);

        let reloaded = repo_in(dir.path());
        assert_eq!(reloaded.list(), before);
    }

    #[test]
    fn test_get_by_id() {
        let dir = tempdir().unwrap();
        let repo = repo_in(dir.path());

        assert_eq!(repo.get_by_id(1).unwrap().title, "Inception");
        assert!(repo.get_by_id(404).is_none());
    }

    #[test]
    fn test_genres_distinct_sorted_with_all_sentinel() {
        let dir = tempdir().unwrap();
        let repo = repo_in(dir.path());

        // Seed genres: Sci-Fi x3, Action, Drama
        assert_eq!(repo.genres(), vec!["All", "Action", "Drama", "Sci-Fi"]);
    }

    #[test]
    fn test_mutations_tick_the_change_channel() {
        let dir = tempdir().unwrap();
        let mut repo = repo_in(dir.path());
        let rx = repo.subscribe();

        assert_eq!(*rx.borrow(), 0);
        repo.add(dune_candidate());
        assert_eq!(*rx.borrow(), 1);
        repo.delete(1).unwrap();
        assert_eq!(*rx.borrow(), 2);
    }

    #[test]
    fn test_ids_survive_reload_monotonically() {
        let dir = tempdir().unwrap();
        let first_id = {
            let mut repo = repo_in(dir.path());
            repo.add(dune_candidate()).id
        };

        let mut repo = repo_in(dir.path());
        let second_id = repo.add(dune_candidate()).id;
        assert!(second_id > first_id);
    }
}
