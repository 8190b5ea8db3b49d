use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::{MovieId, RecommendationSet, RecommendationSource},
    services::recommendations::fallback_recommendations,
    state::AppState,
};

/// Fetch AI-generated "similar movie" suggestions for a catalog entry.
///
/// The result is tagged with the movie id the request was made for, so a
/// client that has navigated elsewhere can recognize and drop a stale
/// response. With no backend configured the curated table answers directly;
/// the endpoint never fails once the movie exists.
pub async fn for_movie(
    State(state): State<AppState>,
    Path(id): Path<MovieId>,
) -> AppResult<Json<RecommendationSet>> {
    // Clone the record out so no lock is held across the backend call
    let movie = {
        let catalog = state.catalog.read().await;
        catalog
            .get_by_id(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("No movie with id {}", id)))?
    };

    let result = match &state.recommender {
        Some(recommender) => recommender.get_movie_recommendations(&movie).await,
        None => {
            tracing::debug!(movie_id = movie.id, "No backend configured, serving fallback");
            RecommendationSet {
                movie_id: movie.id,
                source: RecommendationSource::Fallback,
                entries: fallback_recommendations(&movie.genre),
            }
        }
    };

    Ok(Json(result))
}
