//! Metadata core: the provider contract, the registry that resolves a
//! provider by name, and the service that orchestrates lookups and show
//! ingestion.

pub mod error;
pub mod external_id;
pub mod normalize;
pub mod provider;
pub mod registry;
pub mod service;

pub use error::{ErrorKind, MetadataError};
pub use provider::{DiscoverOpts, DiscoverResult, ListEpisodesOpts, MetadataProvider, SearchOpts};
pub use registry::ProviderRegistry;
pub use service::MetadataService;
