use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::db::Store;
use crate::metadata::MetadataService;
use crate::services::{EpisodeService, ShowService};
use crate::state::SharedState;
use metrics_exporter_prometheus::PrometheusHandle;

pub mod auth;
mod episodes;
mod error;
mod hooks;
mod metadata;
mod observability;
mod shows;
mod types;
pub mod validation;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.shared.store
    }

    #[must_use]
    pub fn metadata(&self) -> &MetadataService {
        &self.shared.metadata
    }

    #[must_use]
    pub fn shows(&self) -> &Arc<dyn ShowService> {
        &self.shared.show_service
    }

    #[must_use]
    pub fn episodes(&self) -> &Arc<dyn EpisodeService> {
        &self.shared.episode_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub async fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().read().await.server.cors_allowed_origins.clone();

    let protected_routes = create_protected_router(state.clone());

    let api_router = Router::new()
        .merge(protected_routes)
        .route("/health", get(observability::health))
        .with_state(state);

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn create_protected_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/metadata/search", get(metadata::search))
        .route("/metadata/discover", get(metadata::discover))
        .route("/metadata/shows/{external_id}", get(metadata::get_show))
        .route(
            "/metadata/shows/{external_id}/episodes",
            get(metadata::list_episodes),
        )
        .route("/metadata/show", post(metadata::add_show))
        .route("/shows", get(shows::list_shows).post(shows::create_show))
        .route(
            "/shows/{id}",
            get(shows::get_show)
                .put(shows::update_show)
                .delete(shows::delete_show),
        )
        .route(
            "/episodes",
            get(episodes::list_episodes).post(episodes::create_episode),
        )
        .route(
            "/episodes/{id}",
            get(episodes::get_episode)
                .put(episodes::update_episode)
                .delete(episodes::delete_episode),
        )
        .route("/hooks", get(hooks::list_hooks).put(hooks::update_hooks))
        .route("/hooks/keys", get(hooks::list_hook_keys))
        .route("/metrics", get(observability::get_metrics))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}
