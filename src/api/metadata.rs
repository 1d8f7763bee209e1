use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::{ShowRequest, parse_provider, validate_search_query, validate_show};
use super::{ApiError, ApiResponse, AppState, ProviderQuery};
use crate::metadata::{DiscoverOpts, DiscoverResult, ListEpisodesOpts, SearchOpts};
use crate::models::{EnqueuedJob, Episode, Show};

const DEFAULT_EPISODE_LIMIT: i64 = 25;

/// GET /metadata/search
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProviderQuery>,
) -> Result<Json<ApiResponse<Vec<Show>>>, ApiError> {
    let provider = parse_provider(params.provider.as_deref())?;
    let query = validate_search_query(params.query.as_deref().unwrap_or_default())?;

    let opts = SearchOpts {
        page: params.page.unwrap_or(1),
        limit: params.limit.unwrap_or_default(),
    };
    let shows = state.metadata().search(provider, query, opts).await?;
    Ok(Json(ApiResponse::success(shows)))
}

/// GET /metadata/discover
pub async fn discover(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProviderQuery>,
) -> Result<Json<ApiResponse<DiscoverResult>>, ApiError> {
    let provider = parse_provider(params.provider.as_deref())?;
    let opts = DiscoverOpts {
        page: params.page.unwrap_or(1),
        limit: params.limit.unwrap_or_default(),
    };
    let result = state.metadata().discover(provider, opts).await?;
    Ok(Json(ApiResponse::success(result)))
}

/// GET /metadata/shows/{externalId}
pub async fn get_show(
    State(state): State<Arc<AppState>>,
    Path(external_id): Path<String>,
    Query(params): Query<ProviderQuery>,
) -> Result<Json<ApiResponse<Show>>, ApiError> {
    let provider = parse_provider(params.provider.as_deref())?;
    let show = state.metadata().get_show(provider, &external_id).await?;
    Ok(Json(ApiResponse::success(show)))
}

/// GET /metadata/shows/{externalId}/episodes
pub async fn list_episodes(
    State(state): State<Arc<AppState>>,
    Path(external_id): Path<String>,
    Query(params): Query<ProviderQuery>,
) -> Result<Json<ApiResponse<Vec<Episode>>>, ApiError> {
    let provider = parse_provider(params.provider.as_deref())?;
    let opts = ListEpisodesOpts {
        page: params.page.unwrap_or(1),
        limit: params.limit.unwrap_or(DEFAULT_EPISODE_LIMIT),
        season_number: params.season,
    };
    let episodes = state
        .metadata()
        .list_episodes(provider, &external_id, opts)
        .await?;
    Ok(Json(ApiResponse::success(episodes)))
}

/// POST /metadata/show
pub async fn add_show(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ShowRequest>,
) -> Result<(StatusCode, Json<ApiResponse<EnqueuedJob>>), ApiError> {
    let show = validate_show(payload, true)?;
    let job = state.metadata().add_show(show).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(job))))
}
