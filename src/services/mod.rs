pub mod episode_service;
pub mod episode_service_impl;
pub mod show_service;
pub mod show_service_impl;

pub use episode_service::{EpisodeError, EpisodeService};
pub use episode_service_impl::SeaOrmEpisodeService;
pub use show_service::{ShowError, ShowService};
pub use show_service_impl::SeaOrmShowService;
