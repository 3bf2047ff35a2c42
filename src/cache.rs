//! In-memory article cache and the client-side source/date filter.
//!
//! The cache is append-only within a paging session and fully replaced when a
//! new query's first page arrives. Filtering never mutates it; every filter
//! change re-runs over the whole cache.

use crate::models::{Article, FilterState};
use chrono::{Local, NaiveDate, TimeZone};
use itertools::Itertools;

/// Ordered results of the current search, in API arrival order.
#[derive(Debug, Default, Clone)]
pub struct ArticleCache {
    articles: Vec<Article>,
    sources: Vec<String>,
}

impl ArticleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything from the previous query and start over with `articles`.
    pub fn replace(&mut self, articles: Vec<Article>) {
        self.articles = articles;
        self.set_sources();
    }

    /// Append a further page of the same query.
    pub fn extend(&mut self, articles: Vec<Article>) {
        self.articles.extend(articles);
        self.set_sources();
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    /// Distinct source names currently cached, sorted. "All sources" is implied.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    fn set_sources(&mut self) {
        self.sources = distinct_sources(&self.articles);
    }

    /// Filtered view of the cache using local calendar dates.
    pub fn filtered(&self, filters: &FilterState) -> Vec<Article> {
        filter_articles(&self.articles, filters)
    }
}

/// Sorted, de-duplicated source names. Blank names are skipped.
pub fn distinct_sources(articles: &[Article]) -> Vec<String> {
    articles
        .iter()
        .map(|a| a.source_name.as_str())
        .filter(|name| !name.is_empty())
        .unique()
        .sorted()
        .map(str::to_string)
        .collect()
}

/// Keep the articles matching `filters`, comparing dates in the local timezone.
pub fn filter_articles(articles: &[Article], filters: &FilterState) -> Vec<Article> {
    filter_articles_in(articles, filters, &Local)
}

/// Keep the articles matching `filters`, comparing dates in `tz`.
///
/// An article matches when the source is unset or equal, and the date is
/// unset or the article's publication instant falls on that calendar day in
/// `tz`. Articles without a timestamp never match a date.
///
/// # Arguments
///
/// * `articles` - Articles to filter, usually the whole cache
/// * `filters` - Source and date selection; `None` fields match everything
/// * `tz` - Timezone whose calendar day the date filter refers to
///
/// # Returns
///
/// The matching articles, cloned, in their original order.
pub fn filter_articles_in<Tz: TimeZone>(
    articles: &[Article],
    filters: &FilterState,
    tz: &Tz,
) -> Vec<Article> {
    articles
        .iter()
        .filter(|a| match &filters.source_name {
            Some(source) => a.source_name == *source,
            None => true,
        })
        .filter(|a| match filters.date {
            Some(date) => published_on(a, date, tz),
            None => true,
        })
        .cloned()
        .collect()
}

fn published_on<Tz: TimeZone>(article: &Article, date: NaiveDate, tz: &Tz) -> bool {
    article
        .published_at
        .map(|ts| ts.with_timezone(tz).date_naive() == date)
        .unwrap_or(false)
}
