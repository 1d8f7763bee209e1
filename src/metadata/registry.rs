use crate::domain::ProviderName;
use crate::metadata::{MetadataError, MetadataProvider};
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable provider-name to adapter mapping, built once at startup.
///
/// One adapter may be registered under several names.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderName, Arc<dyn MetadataProvider>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn builder() -> ProviderRegistryBuilder {
        ProviderRegistryBuilder::default()
    }

    pub fn provider(&self, name: ProviderName) -> Result<Arc<dyn MetadataProvider>, MetadataError> {
        self.providers.get(&name).cloned().ok_or_else(|| {
            MetadataError::NotSupported(format!("provider {name} is not supported"))
        })
    }

    #[must_use]
    pub fn names(&self) -> Vec<ProviderName> {
        let mut names: Vec<_> = self.providers.keys().copied().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

#[derive(Default)]
pub struct ProviderRegistryBuilder {
    providers: HashMap<ProviderName, Arc<dyn MetadataProvider>>,
}

impl ProviderRegistryBuilder {
    #[must_use]
    pub fn register(mut self, name: ProviderName, provider: Arc<dyn MetadataProvider>) -> Self {
        self.providers.insert(name, provider);
        self
    }

    #[must_use]
    pub fn build(self) -> ProviderRegistry {
        ProviderRegistry {
            providers: self.providers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ErrorKind, ListEpisodesOpts, SearchOpts};
    use crate::models::{Episode, Show};
    use async_trait::async_trait;

    struct Fixed(ProviderName);

    #[async_trait]
    impl MetadataProvider for Fixed {
        fn name(&self) -> ProviderName {
            self.0
        }

        async fn search(&self, _: &str, _: SearchOpts) -> Result<Vec<Show>, MetadataError> {
            Ok(Vec::new())
        }

        async fn get_show(&self, _: &str) -> Result<Show, MetadataError> {
            Ok(Show::default())
        }

        async fn list_episodes(
            &self,
            _: &str,
            _: ListEpisodesOpts,
        ) -> Result<Vec<Episode>, MetadataError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_shared_instance_under_two_names() {
        let anilist: Arc<dyn MetadataProvider> = Arc::new(Fixed(ProviderName::AniList));
        let registry = ProviderRegistry::builder()
            .register(ProviderName::AniDb, anilist.clone())
            .register(ProviderName::AniList, anilist.clone())
            .build();

        let a = registry.provider(ProviderName::AniDb).unwrap();
        let b = registry.provider(ProviderName::AniList).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.name(), ProviderName::AniList);
    }

    #[test]
    fn test_unregistered_fails_closed() {
        let registry = ProviderRegistry::builder()
            .register(ProviderName::AniList, Arc::new(Fixed(ProviderName::AniList)))
            .build();

        let err = registry.provider(ProviderName::Tvdb).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
        assert_eq!(registry.names(), vec![ProviderName::AniList]);
    }
}
