#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use serde_json::Value;
use showkeeper::db::Store;
use showkeeper::domain::{ProviderName, ShowStatus, ShowType};
use showkeeper::hooks::{HookDispatcher, HookError, HookEvent};
use showkeeper::models::{Episode, Show};
use std::sync::Mutex;

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// URL of a fresh SQLite file under the system temp dir.
pub fn temp_db_url() -> String {
    let path = std::env::temp_dir().join(format!("showkeeper-test-{}.db", uuid::Uuid::new_v4()));
    format!("sqlite://{}", path.display())
}

pub async fn temp_store() -> Store {
    Store::with_pool_options(&temp_db_url(), 5, 1).await.unwrap()
}

pub fn sample_show(external_id: &str) -> Show {
    Show {
        external_id: external_id.to_string(),
        title_preferred: "Naruto".to_string(),
        title_original: Some("ナルト".to_string()),
        alt_titles: vec!["NARUTO".to_string()],
        show_type: ShowType::Anime,
        status: ShowStatus::Finished,
        start_date: Some("2002-10-03".to_string()),
        episode_count: Some(220),
        ..Show::default()
    }
}

pub fn sample_episode(season: i64, number: i64) -> Episode {
    Episode {
        provider: ProviderName::AniList,
        external_id: format!("anilist:20:{number}"),
        season_number: season,
        episode_number: number,
        title: Episode::fallback_title(number),
        air_date: None,
        runtime_minutes: Some(23),
    }
}

/// Records every dispatched event and optionally vetoes one pre-hook.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub veto: Option<HookEvent>,
    pub seen: Mutex<Vec<(HookEvent, Value)>>,
}

impl RecordingDispatcher {
    pub fn vetoing(event: HookEvent) -> Self {
        Self {
            veto: Some(event),
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<HookEvent> {
        self.seen.lock().unwrap().iter().map(|(e, _)| *e).collect()
    }
}

#[async_trait]
impl HookDispatcher for RecordingDispatcher {
    async fn dispatch_pre(&self, event: HookEvent, payload: &Value) -> Result<(), HookError> {
        self.seen.lock().unwrap().push((event, payload.clone()));
        if self.veto == Some(event) {
            return Err(HookError::Status(500));
        }
        Ok(())
    }

    async fn dispatch_post(&self, event: HookEvent, payload: &Value) {
        self.seen.lock().unwrap().push((event, payload.clone()));
    }
}
