//! Runtime settings.
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! CLI flags and environment variables.
//!
//! ```yaml
//! base_url: https://newsapi.org/v2/everything
//! page_size: 6
//! default_query: cricket
//! categories: [ipl, finance, politics]
//! ```

use crate::api::DEFAULT_BASE_URL;
use crate::cli::Cli;
use crate::models::DEFAULT_PAGE_SIZE;
use serde::Deserialize;
use std::error::Error;
use tokio::fs;
use tracing::{info, instrument};

/// Query used on first start, before anything has been saved.
pub const DEFAULT_QUERY: &str = "cricket";

/// Contents of the optional config file. Every key is optional.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub page_size: Option<u32>,
    pub default_query: Option<String>,
    pub categories: Option<Vec<String>>,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub page_size: u32,
    pub default_query: String,
    /// Canned queries offered as one-word navigation.
    pub categories: Vec<String>,
    pub prefs_file: String,
}

pub fn default_categories() -> Vec<String> {
    ["ipl", "finance", "politics"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Read and parse a YAML config file.
#[instrument(level = "info")]
pub async fn load_config(path: &str) -> Result<FileConfig, Box<dyn Error>> {
    let raw = fs::read_to_string(path).await?;
    let config = parse_config(&raw)?;
    info!(path, "Loaded configuration");
    Ok(config)
}

pub fn parse_config(raw: &str) -> Result<FileConfig, serde_yaml::Error> {
    if raw.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    serde_yaml::from_str(raw)
}

impl Settings {
    /// Merge CLI arguments over the file config over defaults.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, Box<dyn Error>> {
        let page_size = cli
            .page_size
            .or(file.page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        if !(1..=100).contains(&page_size) {
            return Err(format!("page_size must be between 1 and 100, got {page_size}").into());
        }

        let categories = file
            .categories
            .map(|c| {
                c.into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(default_categories);

        let default_query = file
            .default_query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .unwrap_or_else(|| DEFAULT_QUERY.to_string());

        Ok(Settings {
            api_key: cli.api_key.clone(),
            base_url: cli
                .base_url
                .clone()
                .or(file.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            page_size,
            default_query,
            categories,
            prefs_file: cli.prefs_file.clone(),
        })
    }
}
