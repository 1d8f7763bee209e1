use axum::{Json, extract::State};
use std::sync::Arc;

use super::{ApiError, ApiResponse, AppState, HookUpdateRequest};
use crate::hooks::HookEvent;
use crate::models::HookSetting;

/// GET /hooks
pub async fn list_hooks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<HookSetting>>>, ApiError> {
    let settings = state.store().list_hook_settings().await?;
    Ok(Json(ApiResponse::success(settings)))
}

/// GET /hooks/keys
pub async fn list_hook_keys() -> Json<ApiResponse<Vec<&'static str>>> {
    Json(ApiResponse::success(HookEvent::names()))
}

/// PUT /hooks
///
/// Every event is validated before anything is written.
pub async fn update_hooks(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<HookUpdateRequest>,
) -> Result<Json<ApiResponse<Vec<HookSetting>>>, ApiError> {
    if payload.hooks.is_empty() {
        return Err(ApiError::validation("hooks must not be empty"));
    }

    let mut updates = Vec::with_capacity(payload.hooks.len());
    for hook in &payload.hooks {
        let event: HookEvent = hook
            .event
            .parse()
            .map_err(|e: crate::hooks::HookError| ApiError::validation(e.to_string()))?;
        let url = hook.url.trim();
        if !url.is_empty() {
            url::Url::parse(url).map_err(|e| {
                ApiError::validation(format!("invalid url for {event}: {e}"))
            })?;
        }
        updates.push((event, url));
    }

    for (event, url) in updates {
        state.store().upsert_hook_setting(event.as_str(), url).await?;
    }

    let settings = state.store().list_hook_settings().await?;
    Ok(Json(ApiResponse::success(settings)))
}
