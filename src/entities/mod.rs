pub mod prelude;

pub mod episodes;
pub mod hook_settings;
pub mod job_shows;
pub mod shows;
