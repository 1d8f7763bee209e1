mod common;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use common::{sample_episode, sample_show, temp_store};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use showkeeper::config::Config;
use showkeeper::domain::ProviderName;
use showkeeper::hooks::{HookDispatcher, NoopDispatcher};
use showkeeper::metadata::{
    ListEpisodesOpts, MetadataError, MetadataProvider, ProviderRegistry, SearchOpts,
};
use showkeeper::models::{Episode, Show};
use showkeeper::state::SharedState;
use std::sync::Arc;
use tower::ServiceExt;

const API_KEY: &str = "test-key";

/// Provider returning canned shows without any network access.
struct FixtureProvider;

#[async_trait]
impl MetadataProvider for FixtureProvider {
    fn name(&self) -> ProviderName {
        ProviderName::AniList
    }

    async fn search(&self, _query: &str, _opts: SearchOpts) -> Result<Vec<Show>, MetadataError> {
        let mut bleach = sample_show("anilist:269");
        bleach.title_preferred = "Bleach".to_string();
        bleach.title_original = None;
        bleach.alt_titles.clear();
        Ok(vec![sample_show("anilist:20"), bleach])
    }

    async fn get_show(&self, external_id: &str) -> Result<Show, MetadataError> {
        if external_id == "anilist:20" {
            Ok(sample_show(external_id))
        } else {
            Err(MetadataError::NotFound(format!("show {external_id}")))
        }
    }

    async fn list_episodes(
        &self,
        _external_id: &str,
        _opts: ListEpisodesOpts,
    ) -> Result<Vec<Episode>, MetadataError> {
        Ok(vec![sample_episode(1, 1), sample_episode(1, 2)])
    }
}

async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.server.api_keys = vec![API_KEY.to_string()];

    let provider: Arc<dyn MetadataProvider> = Arc::new(FixtureProvider);
    let registry = ProviderRegistry::builder()
        .register(ProviderName::AniDb, provider.clone())
        .register(ProviderName::AniList, provider)
        .build();
    let hooks: Arc<dyn HookDispatcher> = Arc::new(NoopDispatcher);
    let store = Arc::new(temp_store().await);

    let shared = Arc::new(SharedState::from_parts(config, store, registry, hooks));
    let state = showkeeper::api::create_app_state(shared, None);
    showkeeper::api::router(state).await
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Api-Key", API_KEY);
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn show_body(external_id: &str) -> Value {
    json!({
        "externalId": external_id,
        "titlePreferred": "  Naruto ",
        "altTitles": ["NARUTO", "  "],
        "type": "anime",
        "status": "finished",
        "startDate": "2002-10-03",
        "episodeCount": 220
    })
}

#[tokio::test]
async fn test_auth_required() {
    let app = spawn_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/shows").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/shows")
                .header("X-Api-Key", "wrong-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/shows")
                .header("Authorization", format!("Bearer {API_KEY}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_metadata_search() {
    let app = spawn_app().await;

    let (status, body) = call(&app, "GET", "/api/metadata/search?query=naruto", None).await;
    assert_eq!(status, StatusCode::OK);
    let hits = body["data"].as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["externalId"], "anilist:20");

    let (status, body) = call(&app, "GET", "/api/metadata/search?query=%20%20", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = call(&app, "GET", "/api/metadata/search?query=x&type=tmdb", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // No provider is registered for tvdb in this app.
    let (status, _) = call(&app, "GET", "/api/metadata/search?query=x&type=tvdb", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metadata_get_show() {
    let app = spawn_app().await;

    let (status, body) = call(
        &app,
        "GET",
        "/api/metadata/shows/anilist:20?type=anilist",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["titlePreferred"], "Naruto");

    let (status, _) = call(&app, "GET", "/api/metadata/shows/anilist:1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, "GET", "/api/metadata/shows/anilist:20/episodes", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_add_show_enqueues_once() {
    let app = spawn_app().await;

    let (status, body) = call(&app, "POST", "/api/metadata/show", Some(show_body("anilist:20"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let job = body["data"].clone();
    assert_eq!(job["status"], "pending");

    let (status, body) = call(&app, "POST", "/api/metadata/show", Some(show_body("anilist:20"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"], job);

    let show_id = job["internalShowId"].as_str().unwrap();
    let (status, body) = call(&app, "GET", &format!("/api/shows/{show_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["titlePreferred"], "Naruto");
    assert_eq!(body["data"]["altTitles"], json!(["NARUTO"]));

    let (status, body) = call(&app, "GET", &format!("/api/episodes?showId={show_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_add_show_rejects_invalid_payload() {
    let app = spawn_app().await;

    let (status, _) = call(&app, "POST", "/api/metadata/show", Some(show_body("20"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut bad_date = show_body("anilist:20");
    bad_date["startDate"] = json!("2002/10/03");
    let (status, _) = call(&app, "POST", "/api/metadata/show", Some(bad_date)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut bad_status = show_body("anilist:20");
    bad_status["status"] = json!("paused");
    let (status, _) = call(&app, "POST", "/api/metadata/show", Some(bad_status)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, "GET", "/api/shows", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_show_crud() {
    let app = spawn_app().await;

    let mut manual = show_body("");
    manual["titlePreferred"] = json!("Mushishi");
    let (status, body) = call(&app, "POST", "/api/shows", Some(manual.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["internalShowId"].as_str().unwrap().to_string();

    manual["status"] = json!("ongoing");
    let (status, body) = call(&app, "PUT", &format!("/api/shows/{id}"), Some(manual)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ongoing");

    let (status, body) = call(&app, "GET", "/api/shows?limit=10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = call(&app, "DELETE", &format!("/api/shows/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = call(&app, "GET", &format!("/api/shows/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, "DELETE", &format!("/api/shows/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_episode_crud() {
    let app = spawn_app().await;

    let (_, body) = call(&app, "POST", "/api/shows", Some(show_body(""))).await;
    let show_id = body["data"]["internalShowId"].as_str().unwrap().to_string();

    let episode = json!({
        "showId": show_id,
        "seasonNumber": 1,
        "episodeNumber": 3,
        "title": "  ",
        "airDate": "2002-10-17"
    });
    let (status, body) = call(&app, "POST", "/api/episodes", Some(episode.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["title"], "Episode 3");
    let id = body["data"]["internalEpisodeId"].as_str().unwrap().to_string();

    let (status, _) = call(&app, "POST", "/api/episodes", Some(episode.clone())).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let mut orphan = episode.clone();
    orphan["showId"] = json!("missing");
    let (status, _) = call(&app, "POST", "/api/episodes", Some(orphan)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut negative = episode.clone();
    negative["episodeNumber"] = json!(-1);
    let (status, _) = call(&app, "POST", "/api/episodes", Some(negative)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut renamed = episode;
    renamed["title"] = json!("Sasuke and Sakura");
    let (status, body) = call(&app, "PUT", &format!("/api/episodes/{id}"), Some(renamed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Sasuke and Sakura");

    let (status, _) = call(&app, "DELETE", &format!("/api/episodes/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, "GET", &format!("/api/episodes/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_hook_settings() {
    let app = spawn_app().await;

    let (status, body) = call(&app, "GET", "/api/hooks/keys", None).await;
    assert_eq!(status, StatusCode::OK);
    let keys = body["data"].as_array().unwrap();
    assert!(keys.contains(&json!("show.create.pre")));
    assert!(keys.contains(&json!("episode.delete.post")));

    let (status, _) = call(&app, "PUT", "/api/hooks", Some(json!({ "hooks": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &app,
        "PUT",
        "/api/hooks",
        Some(json!({ "hooks": [
            { "event": "show.create.pre", "url": "http://localhost:9/ok" },
            { "event": "show.explode.pre", "url": "http://localhost:9/ok" }
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        "PUT",
        "/api/hooks",
        Some(json!({ "hooks": [
            { "event": "show.create.pre", "url": " http://localhost:9/ok " }
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let settings = body["data"].as_array().unwrap();
    let configured = settings
        .iter()
        .find(|s| s["event"] == "show.create.pre")
        .unwrap();
    assert_eq!(configured["url"], "http://localhost:9/ok");
}
