use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::{ShowRequest, validate_show};
use super::{ApiError, ApiResponse, AppState, MessageResponse, PageQuery};
use crate::models::StoredShow;

const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 500;

/// GET /shows
pub async fn list_shows(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<StoredShow>>>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = params.offset.unwrap_or_default();
    let shows = state.shows().list(limit, offset).await?;
    Ok(Json(ApiResponse::success(shows)))
}

/// POST /shows
pub async fn create_show(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ShowRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StoredShow>>), ApiError> {
    let show = validate_show(payload, false)?;
    let stored = state.shows().create(show).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(stored))))
}

/// GET /shows/{id}
pub async fn get_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<StoredShow>>, ApiError> {
    let show = state.shows().get(&id).await?;
    Ok(Json(ApiResponse::success(show)))
}

/// PUT /shows/{id}
pub async fn update_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<ShowRequest>,
) -> Result<Json<ApiResponse<StoredShow>>, ApiError> {
    let show = validate_show(payload, false)?;
    let stored = state.shows().update(&id, show).await?;
    Ok(Json(ApiResponse::success(stored)))
}

/// DELETE /shows/{id}
pub async fn delete_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.shows().delete(&id).await?;
    Ok(Json(ApiResponse::success(MessageResponse {
        message: format!("Show {id} deleted"),
    })))
}
