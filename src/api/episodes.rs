use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::validate_episode;
use super::{ApiError, ApiResponse, AppState, EpisodeListQuery, MessageResponse};
use crate::models::{EpisodeInput, StoredEpisode};

/// GET /episodes
pub async fn list_episodes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EpisodeListQuery>,
) -> Result<Json<ApiResponse<Vec<StoredEpisode>>>, ApiError> {
    let show_id = params
        .show_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let episodes = state.episodes().list(show_id).await?;
    Ok(Json(ApiResponse::success(episodes)))
}

/// POST /episodes
pub async fn create_episode(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EpisodeInput>,
) -> Result<(StatusCode, Json<ApiResponse<StoredEpisode>>), ApiError> {
    let input = validate_episode(payload)?;
    let stored = state.episodes().create(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(stored))))
}

/// GET /episodes/{id}
pub async fn get_episode(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<StoredEpisode>>, ApiError> {
    let episode = state.episodes().get(&id).await?;
    Ok(Json(ApiResponse::success(episode)))
}

/// PUT /episodes/{id}
pub async fn update_episode(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<EpisodeInput>,
) -> Result<Json<ApiResponse<StoredEpisode>>, ApiError> {
    let input = validate_episode(payload)?;
    let stored = state.episodes().update(&id, input).await?;
    Ok(Json(ApiResponse::success(stored)))
}

/// DELETE /episodes/{id}
pub async fn delete_episode(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.episodes().delete(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Episode {id} deleted"),
    })))
}
