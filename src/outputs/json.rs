//! JSON export of the current view.
//!
//! The file holds the query, the filter selection and the articles exactly as
//! they are currently displayed.

use crate::models::{Article, FilterState};
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

#[derive(Debug, Serialize)]
pub struct ExportedView<'a> {
    pub query: &'a str,
    pub source_filter: Option<&'a str>,
    pub date_filter: Option<String>,
    pub articles: &'a [Article],
}

impl<'a> ExportedView<'a> {
    pub fn new(query: &'a str, filters: &'a FilterState, articles: &'a [Article]) -> Self {
        Self {
            query,
            source_filter: filters.source_name.as_deref(),
            date_filter: filters.date.map(|d| d.to_string()),
            articles,
        }
    }
}

/// Write `view` to `path`, creating parent directories as needed.
///
/// # Arguments
///
/// * `view` - Query, filters and visible articles to serialize
/// * `path` - Destination file; overwritten if it exists
///
/// # Returns
///
/// `Ok(())` on success, or an error if directory creation or file writing fails.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = view.articles.len()))]
pub async fn write_view(view: &ExportedView<'_>, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(view)?;

    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create export dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!("Wrote JSON export");
    Ok(())
}
