mod common;

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
};
use common::{RecordingDispatcher, sample_episode, sample_show, temp_store};
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::Value;
use showkeeper::db::Store;
use showkeeper::domain::ProviderName;
use showkeeper::entities::prelude::{JobShows, Shows};
use showkeeper::hooks::{HookDispatcher, HookEvent, HttpDispatcher};
use showkeeper::metadata::{
    ErrorKind, ListEpisodesOpts, MetadataError, MetadataProvider, MetadataService,
    ProviderRegistry, SearchOpts,
};
use showkeeper::models::{EpisodeInput, Episode, Show};
use showkeeper::services::{
    EpisodeError, EpisodeService, SeaOrmEpisodeService, SeaOrmShowService, ShowError, ShowService,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Provider that serves a fixed episode list and counts calls.
#[derive(Default)]
struct CountingProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl MetadataProvider for CountingProvider {
    fn name(&self) -> ProviderName {
        ProviderName::AniList
    }

    async fn search(&self, _query: &str, _opts: SearchOpts) -> Result<Vec<Show>, MetadataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }

    async fn get_show(&self, _external_id: &str) -> Result<Show, MetadataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(MetadataError::NotFound("unused".into()))
    }

    async fn list_episodes(
        &self,
        _external_id: &str,
        opts: ListEpisodesOpts,
    ) -> Result<Vec<Episode>, MetadataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(opts.limit, 100);
        Ok(vec![sample_episode(1, 1), sample_episode(1, 2)])
    }
}

fn metadata_service(
    store: Arc<Store>,
    provider: Arc<CountingProvider>,
    hooks: Arc<dyn HookDispatcher>,
) -> MetadataService {
    let registry = ProviderRegistry::builder()
        .register(ProviderName::AniList, provider.clone())
        .register(ProviderName::AniDb, provider)
        .build();
    MetadataService::new(registry, store, hooks)
}

async fn counts(store: &Store) -> (u64, u64) {
    (
        Shows::find().count(&store.conn).await.unwrap(),
        JobShows::find().count(&store.conn).await.unwrap(),
    )
}

#[tokio::test]
async fn test_add_show_fires_pre_and_post() {
    let store = Arc::new(temp_store().await);
    let provider = Arc::new(CountingProvider::default());
    let hooks = Arc::new(RecordingDispatcher::default());
    let service = metadata_service(store.clone(), provider.clone(), hooks.clone());

    let job = service.add_show(sample_show("anilist:20")).await.unwrap();

    assert_eq!(
        hooks.events(),
        vec![HookEvent::ShowCreatePre, HookEvent::ShowCreatePost]
    );
    let seen = hooks.seen.lock().unwrap();
    assert_eq!(seen[0].1["externalId"], "anilist:20");
    assert_eq!(seen[1].1["internalJobShowId"], job.internal_job_show_id.as_str());
    drop(seen);

    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        store
            .count_episodes_for_show(&job.internal_show_id)
            .await
            .unwrap(),
        2
    );

    // Re-adding while pending hands back the same job.
    let again = service.add_show(sample_show("anilist:20")).await.unwrap();
    assert_eq!(again, job);
    assert_eq!(counts(&store).await, (1, 1));
}

#[tokio::test]
async fn test_add_show_veto_writes_nothing() {
    let store = Arc::new(temp_store().await);
    let provider = Arc::new(CountingProvider::default());
    let hooks = Arc::new(RecordingDispatcher::vetoing(HookEvent::ShowCreatePre));
    let service = metadata_service(store.clone(), provider.clone(), hooks.clone());

    let err = service.add_show(sample_show("anilist:20")).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::HookRejected);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    assert_eq!(hooks.events(), vec![HookEvent::ShowCreatePre]);
    assert_eq!(counts(&store).await, (0, 0));
}

#[tokio::test]
async fn test_add_show_malformed_id_fails_fast() {
    let store = Arc::new(temp_store().await);
    let provider = Arc::new(CountingProvider::default());
    let hooks = Arc::new(RecordingDispatcher::default());
    let service = metadata_service(store.clone(), provider.clone(), hooks.clone());

    for external_id in ["121361", "tmdb:5", ""] {
        let err = service
            .add_show(sample_show(external_id))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput, "{external_id}");
    }

    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    assert!(hooks.events().is_empty());
    assert_eq!(counts(&store).await, (0, 0));
}

#[derive(Clone, Default)]
struct HookReceiver {
    received: Arc<Mutex<Vec<(String, Value)>>>,
}

async fn accept(
    State(rx): State<HookReceiver>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let event = headers
        .get("X-Hook-Event")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    rx.received.lock().unwrap().push((event, body));
    StatusCode::NO_CONTENT
}

async fn reject(State(rx): State<HookReceiver>, Json(body): Json<Value>) -> StatusCode {
    rx.received.lock().unwrap().push(("rejected".to_string(), body));
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn spawn_receiver() -> (String, HookReceiver) {
    let rx = HookReceiver::default();
    let router = Router::new()
        .route("/ok", post(accept))
        .route("/fail", post(reject))
        .with_state(rx.clone());
    (common::spawn_stub(router).await, rx)
}

#[tokio::test]
async fn test_http_dispatcher_delivers_envelope() {
    let store = Arc::new(temp_store().await);
    let (base, rx) = spawn_receiver().await;
    store
        .upsert_hook_setting("show.create.pre", &format!(" {base}/ok "))
        .await
        .unwrap();

    let dispatcher = HttpDispatcher::new(store.clone(), Duration::from_secs(5));
    let payload = serde_json::json!({ "externalId": "anilist:20" });
    dispatcher
        .dispatch_pre(HookEvent::ShowCreatePre, &payload)
        .await
        .unwrap();

    // Unconfigured events are a silent no-op.
    dispatcher
        .dispatch_pre(HookEvent::ShowUpdatePre, &payload)
        .await
        .unwrap();

    let received = rx.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    let (event, body) = &received[0];
    assert_eq!(event, "show.create.pre");
    assert_eq!(body["event"], "show.create.pre");
    assert_eq!(body["payload"], payload);
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn test_http_pre_failure_aborts_but_post_failure_does_not() {
    let store = Arc::new(temp_store().await);
    let (base, rx) = spawn_receiver().await;
    let hooks: Arc<dyn HookDispatcher> =
        Arc::new(HttpDispatcher::new(store.clone(), Duration::from_secs(5)));
    let shows = SeaOrmShowService::new(store.clone(), hooks);

    store
        .upsert_hook_setting("show.create.post", &format!("{base}/fail"))
        .await
        .unwrap();
    let created = shows.create(sample_show("")).await.unwrap();
    assert_eq!(rx.received.lock().unwrap().len(), 1);

    store
        .upsert_hook_setting("show.delete.pre", &format!("{base}/fail"))
        .await
        .unwrap();
    let err = shows.delete(&created.internal_show_id).await.unwrap_err();
    assert!(matches!(err, ShowError::HookRejected(_)));
    assert!(
        store
            .get_show(&created.internal_show_id)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_unreachable_pre_hook_is_transport_error() {
    let store = Arc::new(temp_store().await);
    store
        .upsert_hook_setting("episode.create.pre", "http://127.0.0.1:1/hook")
        .await
        .unwrap();
    let dispatcher = HttpDispatcher::new(store, Duration::from_secs(2));

    let result = dispatcher
        .dispatch_pre(HookEvent::EpisodeCreatePre, &serde_json::json!({}))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_show_service_crud_fires_hooks() {
    let store = Arc::new(temp_store().await);
    let hooks = Arc::new(RecordingDispatcher::default());
    let shows = SeaOrmShowService::new(store.clone(), hooks.clone());

    let created = shows.create(sample_show("tvdb:81189")).await.unwrap();
    let mut changed = created.show.clone();
    changed.title_preferred = "Naruto (2002)".to_string();
    let updated = shows
        .update(&created.internal_show_id, changed)
        .await
        .unwrap();
    assert_eq!(updated.show.title_preferred, "Naruto (2002)");
    assert_eq!(updated.show.external_id, "tvdb:81189");

    assert_eq!(shows.list(10, 0).await.unwrap().len(), 1);
    shows.delete(&created.internal_show_id).await.unwrap();
    assert!(matches!(
        shows.get(&created.internal_show_id).await,
        Err(ShowError::NotFound(_))
    ));

    assert_eq!(
        hooks.events(),
        vec![
            HookEvent::ShowCreatePre,
            HookEvent::ShowCreatePost,
            HookEvent::ShowUpdatePre,
            HookEvent::ShowUpdatePost,
            HookEvent::ShowDeletePre,
            HookEvent::ShowDeletePost,
        ]
    );
}

#[tokio::test]
async fn test_show_create_veto_writes_nothing() {
    let store = Arc::new(temp_store().await);
    let hooks = Arc::new(RecordingDispatcher::vetoing(HookEvent::ShowCreatePre));
    let shows = SeaOrmShowService::new(store.clone(), hooks);

    assert!(matches!(
        shows.create(sample_show("anilist:1")).await,
        Err(ShowError::HookRejected(_))
    ));
    assert_eq!(counts(&store).await, (0, 0));
}

#[tokio::test]
async fn test_episode_service_duplicate_is_conflict() {
    let store = Arc::new(temp_store().await);
    let hooks = Arc::new(RecordingDispatcher::default());
    let shows = SeaOrmShowService::new(store.clone(), hooks.clone());
    let episodes = SeaOrmEpisodeService::new(store.clone(), hooks.clone());

    let show = shows.create(sample_show("anilist:20")).await.unwrap();
    let input = EpisodeInput {
        show_id: show.internal_show_id.clone(),
        season_number: 1,
        episode_number: 1,
        title: "Enter: Naruto Uzumaki!".to_string(),
        air_date: Some("2002-10-03".to_string()),
        runtime_minutes: Some(23),
        external_ids: Default::default(),
    };

    let first = episodes.create(input.clone()).await.unwrap();
    assert_eq!(first.title, "Enter: Naruto Uzumaki!");

    let err = episodes.create(input.clone()).await.unwrap_err();
    assert!(matches!(err, EpisodeError::Conflict(_)), "{err}");
    assert_eq!(
        episodes
            .list(Some(show.internal_show_id.as_str()))
            .await
            .unwrap()
            .len(),
        1
    );

    let orphan = EpisodeInput {
        show_id: "missing".to_string(),
        ..input
    };
    assert!(matches!(
        episodes.create(orphan).await,
        Err(EpisodeError::ShowNotFound(_))
    ));

    // Deleting the show cascades to its episodes.
    shows.delete(&show.internal_show_id).await.unwrap();
    assert!(matches!(
        episodes.get(&first.internal_episode_id).await,
        Err(EpisodeError::NotFound(_))
    ));
}
