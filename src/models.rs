//! Data models for articles, search state and API payloads.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: A single search hit, normalized from the API payload
//! - [`PageResult`]: One page of hits plus the total hit count
//! - [`SearchState`]: Query, page and totals for the current paging session
//! - [`FilterState`]: The client-side source/date selection
//! - [`ApiResponse`] / [`ApiArticle`]: The raw NewsAPI wire format
//!
//! The wire types use camelCase field names to match the NewsAPI JSON schema,
//! hence the `#[serde(rename_all = "camelCase")]` attributes.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// Articles requested per page when neither the CLI nor the config file say otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// A news article as returned by a search.
///
/// Articles are immutable once fetched. Identity is positional: two hits
/// with the same URL are kept as two entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    /// The headline, if the publisher supplied one.
    pub title: Option<String>,
    /// The teaser paragraph, if the publisher supplied one.
    pub description: Option<String>,
    /// Canonical link to the full story.
    pub url: String,
    /// Lead image, if any.
    pub image_url: Option<String>,
    /// Display name of the publishing outlet.
    pub source_name: String,
    /// Publication timestamp with the offset the API reported.
    pub published_at: Option<DateTime<FixedOffset>>,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub articles: Vec<Article>,
    pub total_results: u64,
}

/// Query and paging position of the current search session.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    pub query: String,
    /// Last page successfully merged into the cache, starting at 1.
    pub page: u32,
    pub page_size: u32,
    pub total_results: u64,
}

impl SearchState {
    pub fn new(page_size: u32) -> Self {
        Self {
            query: String::new(),
            page: 1,
            page_size,
            total_results: 0,
        }
    }

    /// `true` while the API reports more hits than the pages fetched so far cover.
    pub fn has_more(&self) -> bool {
        self.total_results > u64::from(self.page) * u64::from(self.page_size)
    }
}

/// Client-side filter selection. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub source_name: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Raw `/v2/everything` response body.
///
/// Error responses carry `status: "error"` plus a `message` and omit
/// `articles`/`totalResults`, so those default. Fields that may come back as
/// `null` are read as their default so one odd article cannot sink a page.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_results: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub articles: Vec<ApiArticle>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiArticle {
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: ApiSource,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiSource {
    pub name: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<ApiArticle> for Article {
    fn from(raw: ApiArticle) -> Self {
        // Unparseable timestamps are dropped; such articles simply never match a date filter.
        let published_at = raw
            .published_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok());

        Article {
            title: raw.title.filter(|t| !t.is_empty()),
            description: raw.description.filter(|d| !d.is_empty()),
            url: raw.url,
            image_url: raw.url_to_image.filter(|u| !u.is_empty()),
            source_name: raw.source.name.unwrap_or_default(),
            published_at,
        }
    }
}
