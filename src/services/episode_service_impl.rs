use crate::db::{Store, is_unique_violation};
use crate::hooks::{HookDispatcher, HookEvent};
use crate::models::{EpisodeInput, StoredEpisode};
use crate::services::episode_service::{EpisodeError, EpisodeService};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub struct SeaOrmEpisodeService {
    store: Arc<Store>,
    hooks: Arc<dyn HookDispatcher>,
}

impl SeaOrmEpisodeService {
    #[must_use]
    pub fn new(store: Arc<Store>, hooks: Arc<dyn HookDispatcher>) -> Self {
        Self { store, hooks }
    }

    async fn existing(&self, id: &str) -> Result<StoredEpisode, EpisodeError> {
        self.store
            .get_episode(id)
            .await?
            .ok_or_else(|| EpisodeError::NotFound(id.to_string()))
    }

    async fn ensure_show(&self, show_id: &str) -> Result<(), EpisodeError> {
        if self.store.get_show(show_id).await?.is_none() {
            return Err(EpisodeError::ShowNotFound(show_id.to_string()));
        }
        Ok(())
    }

    fn conflict_or_database(err: anyhow::Error, input: &EpisodeInput) -> EpisodeError {
        if is_unique_violation(&err) {
            EpisodeError::Conflict(format!(
                "show {} already has season {} episode {}",
                input.show_id, input.season_number, input.episode_number
            ))
        } else {
            err.into()
        }
    }
}

#[async_trait::async_trait]
impl EpisodeService for SeaOrmEpisodeService {
    async fn create(&self, input: EpisodeInput) -> Result<StoredEpisode, EpisodeError> {
        self.ensure_show(&input.show_id).await?;

        self.hooks
            .dispatch_pre(HookEvent::EpisodeCreatePre, &serde_json::to_value(&input)?)
            .await?;

        let stored = self
            .store
            .add_episode(&input)
            .await
            .map_err(|e| Self::conflict_or_database(e, &input))?;
        info!(
            episode_id = %stored.internal_episode_id,
            show_id = %stored.show_id,
            season = stored.season_number,
            episode = stored.episode_number,
            "Episode created"
        );

        self.hooks
            .dispatch_post(HookEvent::EpisodeCreatePost, &serde_json::to_value(&stored)?)
            .await;
        Ok(stored)
    }

    async fn list(&self, show_id: Option<&str>) -> Result<Vec<StoredEpisode>, EpisodeError> {
        Ok(self.store.list_episodes(show_id).await?)
    }

    async fn get(&self, id: &str) -> Result<StoredEpisode, EpisodeError> {
        self.existing(id).await
    }

    async fn update(
        &self,
        id: &str,
        input: EpisodeInput,
    ) -> Result<StoredEpisode, EpisodeError> {
        self.existing(id).await?;
        self.ensure_show(&input.show_id).await?;

        let payload = json!({ "internalEpisodeId": id, "episode": &input });
        self.hooks
            .dispatch_pre(HookEvent::EpisodeUpdatePre, &payload)
            .await?;

        let stored = self
            .store
            .update_episode(id, &input)
            .await
            .map_err(|e| Self::conflict_or_database(e, &input))?
            .ok_or_else(|| EpisodeError::NotFound(id.to_string()))?;
        info!(episode_id = %id, "Episode updated");

        self.hooks
            .dispatch_post(HookEvent::EpisodeUpdatePost, &serde_json::to_value(&stored)?)
            .await;
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> Result<(), EpisodeError> {
        let existing = self.existing(id).await?;

        self.hooks
            .dispatch_pre(HookEvent::EpisodeDeletePre, &serde_json::to_value(&existing)?)
            .await?;

        if !self.store.remove_episode(id).await? {
            return Err(EpisodeError::NotFound(id.to_string()));
        }
        info!(episode_id = %id, "Episode deleted");

        self.hooks
            .dispatch_post(
                HookEvent::EpisodeDeletePost,
                &json!({ "internalEpisodeId": id }),
            )
            .await;
        Ok(())
    }
}
