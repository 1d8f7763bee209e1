pub use super::episodes::Entity as Episodes;
pub use super::hook_settings::Entity as HookSettings;
pub use super::job_shows::Entity as JobShows;
pub use super::shows::Entity as Shows;
