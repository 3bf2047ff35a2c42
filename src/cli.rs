//! Command-line interface definitions for News Search.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Most options can also be provided via environment variables, and the
//! tunables can additionally come from a YAML config file (see [`crate::config`]).

use clap::Parser;

/// Command-line arguments for the News Search application.
///
/// # Examples
///
/// ```sh
/// # Interactive session, key from the environment
/// NEWSAPI_KEY=... news_search
///
/// # One-shot search
/// news_search --api-key ... --query "world cup"
///
/// # With a config file and a custom preferences location
/// news_search -c ~/.config/news_search.yaml -p ~/.local/state/news_search.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// NewsAPI.org API key
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Search endpoint (defaults to https://newsapi.org/v2/everything)
    #[arg(long, env = "NEWSAPI_BASE_URL")]
    pub base_url: Option<String>,

    /// Path of the JSON file holding saved preferences
    #[arg(short, long, env = "NEWS_SEARCH_PREFS", default_value = "news_search_prefs.json")]
    pub prefs_file: String,

    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Run a single search, print the results and exit
    #[arg(short, long)]
    pub query: Option<String>,

    /// Articles per page
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub page_size: Option<u32>,
}
