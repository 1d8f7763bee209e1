use crate::db::Store;
use crate::domain::ProviderName;
use crate::hooks::{HookDispatcher, HookEvent};
use crate::metadata::{
    DiscoverOpts, DiscoverResult, ListEpisodesOpts, MetadataError, ProviderRegistry, SearchOpts,
};
use crate::models::{EnqueuedJob, Episode, Show};
use std::sync::Arc;
use tracing::{debug, info};

/// Episodes fetched to backfill a newly added show.
pub const ADD_SHOW_EPISODE_LIMIT: i64 = 100;

/// Orchestrates provider lookups and show ingestion.
///
/// Errors from adapters pass through unchanged; their [`crate::metadata::ErrorKind`]
/// is set where they are raised.
#[derive(Clone)]
pub struct MetadataService {
    registry: ProviderRegistry,
    store: Arc<Store>,
    hooks: Arc<dyn HookDispatcher>,
}

impl MetadataService {
    #[must_use]
    pub fn new(
        registry: ProviderRegistry,
        store: Arc<Store>,
        hooks: Arc<dyn HookDispatcher>,
    ) -> Self {
        Self {
            registry,
            store,
            hooks,
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Searches a provider and keeps only hits whose title set contains the
    /// query as a case-insensitive substring.
    pub async fn search(
        &self,
        provider: ProviderName,
        query: &str,
        opts: SearchOpts,
    ) -> Result<Vec<Show>, MetadataError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let adapter = self.registry.provider(provider)?;
        let hits = record(provider, "search", adapter.search(query, opts).await)?;
        let total = hits.len();

        let filtered: Vec<Show> = hits
            .into_iter()
            .filter(|show| show.title_contains(&needle))
            .collect();

        debug!(
            provider = %provider,
            upstream = total,
            kept = filtered.len(),
            "Filtered search results by title"
        );
        Ok(filtered)
    }

    pub async fn discover(
        &self,
        provider: ProviderName,
        opts: DiscoverOpts,
    ) -> Result<DiscoverResult, MetadataError> {
        let adapter = self.registry.provider(provider)?;
        record(provider, "discover", adapter.discover(opts).await)
    }

    pub async fn get_show(
        &self,
        provider: ProviderName,
        external_id: &str,
    ) -> Result<Show, MetadataError> {
        let adapter = self.registry.provider(provider)?;
        record(provider, "get_show", adapter.get_show(external_id).await)
    }

    pub async fn list_episodes(
        &self,
        provider: ProviderName,
        external_id: &str,
        opts: ListEpisodesOpts,
    ) -> Result<Vec<Episode>, MetadataError> {
        let adapter = self.registry.provider(provider)?;
        record(
            provider,
            "list_episodes",
            adapter.list_episodes(external_id, opts).await,
        )
    }

    /// Adds a show picked from search results and enqueues its ingestion job.
    ///
    /// The provider is resolved from the external id prefix before anything
    /// else happens. `show.create.pre` can veto before episodes are fetched;
    /// `show.create.post` fires after commit. Re-adding a show whose job is
    /// still pending returns that job.
    pub async fn add_show(&self, show: Show) -> Result<EnqueuedJob, MetadataError> {
        let provider = ProviderName::from_external_id(&show.external_id).ok_or_else(|| {
            MetadataError::InvalidInput(
                "externalId must be prefixed with anidb:, anilist: or tvdb:".to_string(),
            )
        })?;

        self.hooks
            .dispatch_pre(HookEvent::ShowCreatePre, &serde_json::to_value(&show)?)
            .await?;

        let episodes = self
            .list_episodes(
                provider,
                &show.external_id,
                ListEpisodesOpts {
                    page: 1,
                    limit: ADD_SHOW_EPISODE_LIMIT,
                    season_number: None,
                },
            )
            .await?;

        let enqueued = self
            .store
            .enqueue_from_search_result(&show, &episodes)
            .await?;

        info!(
            external_id = %show.external_id,
            show_id = %enqueued.job.internal_show_id,
            job_id = %enqueued.job.internal_job_show_id,
            created = enqueued.created,
            episodes = episodes.len(),
            "Show enqueued"
        );

        self.hooks
            .dispatch_post(HookEvent::ShowCreatePost, &serde_json::to_value(&enqueued.job)?)
            .await;

        Ok(enqueued.job)
    }
}

fn record<T>(
    provider: ProviderName,
    operation: &'static str,
    result: Result<T, MetadataError>,
) -> Result<T, MetadataError> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(err) if err.kind().is_client_error() => "rejected",
        Err(_) => "error",
    };
    metrics::counter!(
        "provider_requests_total",
        "provider" => provider.as_str(),
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
    result
}
