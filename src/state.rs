use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::clients::anilist::AnilistClient;
use crate::clients::tvdb::TvdbClient;
use crate::config::Config;
use crate::db::Store;
use crate::domain::ProviderName;
use crate::hooks::{HookDispatcher, HookEvent, HttpDispatcher};
use crate::metadata::{MetadataProvider, MetadataService, ProviderRegistry};
use crate::services::{EpisodeService, SeaOrmEpisodeService, SeaOrmShowService, ShowService};

/// Builds the registry from config. `anidb` and `anilist` share one
/// `AniList` adapter.
#[must_use]
pub fn build_registry(config: &Config) -> ProviderRegistry {
    let anilist: Arc<dyn MetadataProvider> =
        Arc::new(AnilistClient::from_config(&config.providers.anilist));
    let tvdb: Arc<dyn MetadataProvider> = Arc::new(TvdbClient::from_config(&config.providers.tvdb));

    ProviderRegistry::builder()
        .register(ProviderName::AniDb, anilist.clone())
        .register(ProviderName::AniList, anilist)
        .register(ProviderName::Tvdb, tvdb)
        .build()
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Arc<Store>,

    pub hooks: Arc<dyn HookDispatcher>,

    pub metadata: MetadataService,

    pub show_service: Arc<dyn ShowService>,

    pub episode_service: Arc<dyn EpisodeService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Arc::new(
            Store::with_pool_options(
                &config.general.database_path,
                config.general.max_db_connections,
                config.general.min_db_connections,
            )
            .await?,
        );
        store.ensure_hook_defaults(&HookEvent::names()).await?;

        let hooks: Arc<dyn HookDispatcher> = Arc::new(HttpDispatcher::new(
            store.clone(),
            Duration::from_secs(config.hooks.request_timeout_seconds),
        ));

        let registry = build_registry(&config);
        Ok(Self::from_parts(config, store, registry, hooks))
    }

    /// Assembles the services around an already-open store.
    #[must_use]
    pub fn from_parts(
        config: Config,
        store: Arc<Store>,
        registry: ProviderRegistry,
        hooks: Arc<dyn HookDispatcher>,
    ) -> Self {
        let metadata = MetadataService::new(registry, store.clone(), hooks.clone());
        let show_service: Arc<dyn ShowService> =
            Arc::new(SeaOrmShowService::new(store.clone(), hooks.clone()));
        let episode_service: Arc<dyn EpisodeService> =
            Arc::new(SeaOrmEpisodeService::new(store.clone(), hooks.clone()));

        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            hooks,
            metadata,
            show_service,
            episode_service,
        }
    }
}
