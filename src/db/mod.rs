use crate::models::{EnqueuedJob, Episode, EpisodeInput, HookSetting, Show, StoredEpisode, StoredShow};
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::show_job::Enqueued;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
    /// Serializes job enqueueing within this process.
    write_gate: Arc<Mutex<()>>,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url
                .trim_start_matches("sqlite://")
                .trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self {
            conn,
            write_gate: Arc::new(Mutex::new(())),
        })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn show_repo(&self) -> repositories::show::ShowRepository {
        repositories::show::ShowRepository::new(self.conn.clone())
    }

    fn episode_repo(&self) -> repositories::episode::EpisodeRepository {
        repositories::episode::EpisodeRepository::new(self.conn.clone())
    }

    fn show_job_repo(&self) -> repositories::show_job::ShowJobRepository {
        repositories::show_job::ShowJobRepository::new(
            self.conn.clone(),
            self.write_gate.clone(),
        )
    }

    fn hook_setting_repo(&self) -> repositories::hook_setting::HookSettingRepository {
        repositories::hook_setting::HookSettingRepository::new(self.conn.clone())
    }

    pub async fn enqueue_from_search_result(
        &self,
        show: &Show,
        episodes: &[Episode],
    ) -> Result<Enqueued> {
        self.show_job_repo().enqueue(show, episodes).await
    }

    pub async fn find_pending_job(&self, external_id: &str) -> Result<Option<EnqueuedJob>> {
        self.show_job_repo().find_pending(external_id).await
    }

    pub async fn get_job(&self, id: &str) -> Result<Option<EnqueuedJob>> {
        self.show_job_repo().get(id).await
    }

    pub async fn add_show(&self, show: &Show) -> Result<StoredShow> {
        self.show_repo().add(show).await
    }

    pub async fn get_show(&self, id: &str) -> Result<Option<StoredShow>> {
        self.show_repo().get(id).await
    }

    pub async fn list_shows(&self, limit: u64, offset: u64) -> Result<Vec<StoredShow>> {
        self.show_repo().list(limit, offset).await
    }

    pub async fn update_show(&self, id: &str, show: &Show) -> Result<Option<StoredShow>> {
        self.show_repo().update(id, show).await
    }

    pub async fn remove_show(&self, id: &str) -> Result<bool> {
        self.show_repo().remove(id).await
    }

    pub async fn add_episode(&self, input: &EpisodeInput) -> Result<StoredEpisode> {
        self.episode_repo().add(input).await
    }

    pub async fn get_episode(&self, id: &str) -> Result<Option<StoredEpisode>> {
        self.episode_repo().get(id).await
    }

    pub async fn list_episodes(&self, show_id: Option<&str>) -> Result<Vec<StoredEpisode>> {
        self.episode_repo().list(show_id).await
    }

    pub async fn count_episodes_for_show(&self, show_id: &str) -> Result<u64> {
        self.episode_repo().count_for_show(show_id).await
    }

    pub async fn update_episode(
        &self,
        id: &str,
        input: &EpisodeInput,
    ) -> Result<Option<StoredEpisode>> {
        self.episode_repo().update(id, input).await
    }

    pub async fn remove_episode(&self, id: &str) -> Result<bool> {
        self.episode_repo().remove(id).await
    }

    pub async fn ensure_hook_defaults(&self, events: &[&str]) -> Result<()> {
        self.hook_setting_repo().ensure_defaults(events).await
    }

    pub async fn list_hook_settings(&self) -> Result<Vec<HookSetting>> {
        self.hook_setting_repo().list().await
    }

    pub async fn upsert_hook_setting(&self, event: &str, url: &str) -> Result<HookSetting> {
        self.hook_setting_repo().upsert(event, url).await
    }

    pub async fn hook_url(&self, event: &str) -> Result<String> {
        self.hook_setting_repo().url_for(event).await
    }
}

/// Whether an error chain bottoms out in a unique-constraint violation.
#[must_use]
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sea_orm::DbErr>().is_some_and(|db_err| {
        matches!(
            db_err.sql_err(),
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
        )
    })
}

/// Whether an error chain bottoms out in a foreign-key violation.
#[must_use]
pub fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sea_orm::DbErr>().is_some_and(|db_err| {
        matches!(
            db_err.sql_err(),
            Some(sea_orm::SqlErr::ForeignKeyConstraintViolation(_))
        )
    })
}
