use crate::db::Store;
use crate::hooks::{HookDispatcher, HookEvent};
use crate::models::{Show, StoredShow};
use crate::services::show_service::{ShowError, ShowService};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub struct SeaOrmShowService {
    store: Arc<Store>,
    hooks: Arc<dyn HookDispatcher>,
}

impl SeaOrmShowService {
    #[must_use]
    pub fn new(store: Arc<Store>, hooks: Arc<dyn HookDispatcher>) -> Self {
        Self { store, hooks }
    }

    async fn existing(&self, id: &str) -> Result<StoredShow, ShowError> {
        self.store
            .get_show(id)
            .await?
            .ok_or_else(|| ShowError::NotFound(id.to_string()))
    }
}

#[async_trait::async_trait]
impl ShowService for SeaOrmShowService {
    async fn create(&self, show: Show) -> Result<StoredShow, ShowError> {
        self.hooks
            .dispatch_pre(HookEvent::ShowCreatePre, &serde_json::to_value(&show)?)
            .await?;

        let stored = self.store.add_show(&show).await?;
        info!(show_id = %stored.internal_show_id, title = %stored.show.title_preferred, "Show created");

        self.hooks
            .dispatch_post(HookEvent::ShowCreatePost, &serde_json::to_value(&stored)?)
            .await;
        Ok(stored)
    }

    async fn list(&self, limit: u64, offset: u64) -> Result<Vec<StoredShow>, ShowError> {
        Ok(self.store.list_shows(limit, offset).await?)
    }

    async fn get(&self, id: &str) -> Result<StoredShow, ShowError> {
        self.existing(id).await
    }

    async fn update(&self, id: &str, show: Show) -> Result<StoredShow, ShowError> {
        self.existing(id).await?;

        let payload = json!({ "internalShowId": id, "show": &show });
        self.hooks
            .dispatch_pre(HookEvent::ShowUpdatePre, &payload)
            .await?;

        let stored = self
            .store
            .update_show(id, &show)
            .await?
            .ok_or_else(|| ShowError::NotFound(id.to_string()))?;
        info!(show_id = %id, "Show updated");

        self.hooks
            .dispatch_post(HookEvent::ShowUpdatePost, &serde_json::to_value(&stored)?)
            .await;
        Ok(stored)
    }

    async fn delete(&self, id: &str) -> Result<(), ShowError> {
        let existing = self.existing(id).await?;

        self.hooks
            .dispatch_pre(HookEvent::ShowDeletePre, &serde_json::to_value(&existing)?)
            .await?;

        if !self.store.remove_show(id).await? {
            return Err(ShowError::NotFound(id.to_string()));
        }
        info!(show_id = %id, "Show deleted");

        self.hooks
            .dispatch_post(HookEvent::ShowDeletePost, &json!({ "internalShowId": id }))
            .await;
        Ok(())
    }
}
