use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{ApiError, AppState};

/// Rejects requests that carry no configured API key.
///
/// Accepts either:
/// 1. `X-Api-Key` header
/// 2. `Authorization: Bearer <api_key>` header
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let Some(key) = extract_api_key(&headers) else {
        return ApiError::Unauthorized("Missing API key".to_string()).into_response();
    };

    let accepted = state
        .config()
        .read()
        .await
        .server
        .api_keys
        .iter()
        .any(|k| !k.is_empty() && k == &key);

    if !accepted {
        return ApiError::Unauthorized("Invalid API key".to_string()).into_response();
    }

    next.run(request).await
}

fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(api_key) = headers.get("X-Api-Key")
        && let Ok(key_str) = api_key.to_str()
    {
        return Some(key_str.trim().to_string());
    }

    if let Some(auth_header) = headers.get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}
