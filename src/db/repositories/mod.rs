pub mod episode;
pub mod hook_setting;
pub mod show;
pub mod show_job;
