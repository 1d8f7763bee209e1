pub mod episode;
pub mod hook;
pub mod show;

pub use episode::{Episode, EpisodeExternalIds, EpisodeInput, StoredEpisode};
pub use hook::HookSetting;
pub use show::{EnqueuedJob, Show, ShowExternalIds, StoredShow};
