use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Datelike, Utc};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{Movie, MovieId, NewMovie, SortKey, ALL_GENRES},
    services::view,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Genre filter; "All" or absent means no filtering
    pub genre: Option<String>,
    /// Sort key; defaults to title
    pub sort: Option<SortKey>,
}

/// List the catalog as a filtered, sorted view
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Json<Vec<Movie>> {
    let catalog = state.catalog.read().await.list();

    let genre = params.genre.as_deref().unwrap_or(ALL_GENRES);
    let sort = params.sort.unwrap_or_default();

    Json(view::view(&catalog, genre, sort))
}

/// Add a movie to the catalog
pub async fn create(
    State(state): State<AppState>,
    Json(candidate): Json<NewMovie>,
) -> AppResult<(StatusCode, Json<Movie>)> {
    validate_candidate(&candidate)?;

    let movie = state.catalog.write().await.add(candidate);
    Ok((StatusCode::CREATED, Json(movie)))
}

/// Fetch a single movie by id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<MovieId>,
) -> AppResult<Json<Movie>> {
    let catalog = state.catalog.read().await;
    catalog
        .get_by_id(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No movie with id {}", id)))
}

/// Delete a movie by id
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<MovieId>,
) -> AppResult<StatusCode> {
    state.catalog.write().await.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// List distinct genres, "All" first
pub async fn genres(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.read().await.genres())
}

/// Validation contract for new catalog entries.
///
/// The repository trusts this and performs no re-validation of its own.
fn validate_candidate(candidate: &NewMovie) -> AppResult<()> {
    if candidate.title.trim().is_empty() {
        return Err(AppError::InvalidInput("Title must not be empty".to_string()));
    }
    if candidate.director.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Director must not be empty".to_string(),
        ));
    }
    if candidate.genre.trim().is_empty() {
        return Err(AppError::InvalidInput("Genre must not be empty".to_string()));
    }

    let current_year = Utc::now().year();
    if candidate.year < 1900 || candidate.year > current_year {
        return Err(AppError::InvalidInput(format!(
            "Year must be between 1900 and {}",
            current_year
        )));
    }

    if !(1.0..=10.0).contains(&candidate.rating) {
        return Err(AppError::InvalidInput(
            "Rating must be between 1 and 10".to_string(),
        ));
    }

    Ok(())
}
