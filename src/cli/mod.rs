//! CLI module - Command-line interface for Showkeeper
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// Showkeeper - TV and anime show catalogue backend
#[derive(Parser)]
#[command(name = "showkeeper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    Serve,

    /// Search a metadata provider without adding anything
    #[command(alias = "s")]
    Search {
        /// Provider to query: anidb, anilist or tvdb
        #[arg(long, short, default_value = "anidb")]
        provider: String,
        /// Search query
        #[arg(required = true)]
        query: Vec<String>,
        /// Maximum number of upstream hits
        #[arg(long, default_value = "10")]
        limit: i64,
    },

    /// Create default config file
    #[command(alias = "init")]
    InitConfig,
}

pub use commands::*;
