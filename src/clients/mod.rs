pub mod anilist;
pub mod tvdb;
