//! Pagination controller.
//!
//! Owns the whole mutable search session: query and paging position, the
//! article cache, the filter selection and the load phase. Every user action
//! that touches the network goes through here.
//!
//! # Request Sequencing
//!
//! A fetch is split into [`PaginationController::begin_search`] /
//! [`PaginationController::begin_load_more`], which hand out a
//! [`FetchTicket`], and [`PaginationController::complete`], which takes the
//! ticket back together with the outcome. Tickets carry a monotonically
//! increasing sequence number; only the most recently issued one may change
//! state. A slow response to an earlier action is reported as
//! [`Completion::Stale`] and dropped.
//!
//! [`PaginationController::start_search`] and
//! [`PaginationController::load_more`] chain the two halves around a
//! [`NewsSource`] for callers that fetch inline.

use crate::api::NewsSource;
use crate::cache::ArticleCache;
use crate::error::{ControllerError, FetchError};
use crate::models::{Article, FilterState, PageResult, SearchState};
use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

/// Load phase of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Loaded,
    Error(FetchError),
}

/// Handle for one outstanding fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    query: String,
    page: u32,
}

impl FetchTicket {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Pages after the first extend the cache instead of replacing it.
    pub fn appends(&self) -> bool {
        self.page > 1
    }
}

/// What happened to the state when a fetch finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The page was merged into the cache.
    Applied,
    /// The fetch failed; the cache is untouched.
    Failed(FetchError),
    /// A newer fetch was issued after this one; the result was dropped.
    Stale,
    /// `load_more` was called with every page already fetched.
    NoMorePages,
}

#[derive(Debug)]
pub struct PaginationController {
    search: SearchState,
    cache: ArticleCache,
    filters: FilterState,
    phase: Phase,
    issued: u64,
}

impl PaginationController {
    pub fn new(page_size: u32) -> Self {
        Self {
            search: SearchState::new(page_size),
            cache: ArticleCache::new(),
            filters: FilterState::default(),
            phase: Phase::Idle,
            issued: 0,
        }
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn cache(&self) -> &ArticleCache {
        &self.cache
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    /// Source names offered by the source filter; `None` in the filter means all of them.
    pub fn sources(&self) -> &[String] {
        self.cache.sources()
    }

    /// Whether the "load more" affordance should be shown.
    pub fn has_more(&self) -> bool {
        self.search.has_more()
    }

    /// The cache as seen through the current filter selection.
    pub fn visible(&self) -> Vec<Article> {
        self.cache.filtered(&self.filters)
    }

    pub fn set_source_filter(&mut self, source_name: Option<String>) {
        self.filters.source_name = source_name;
    }

    pub fn set_date_filter(&mut self, date: Option<NaiveDate>) {
        self.filters.date = date;
    }

    fn issue(&mut self, query: String, page: u32) -> FetchTicket {
        self.issued += 1;
        self.phase = Phase::Loading;
        FetchTicket {
            seq: self.issued,
            query,
            page,
        }
    }

    /// Validate `query` and issue a ticket for its first page.
    ///
    /// Blank queries are rejected before anything is issued.
    pub fn begin_search(&mut self, query: &str) -> Result<FetchTicket, ControllerError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(ControllerError::EmptyQuery);
        }
        Ok(self.issue(query.to_string(), 1))
    }

    /// Issue a ticket for the next page, or `None` when every page is already cached.
    pub fn begin_load_more(&mut self) -> Option<FetchTicket> {
        if self.search.query.is_empty() || !self.search.has_more() {
            return None;
        }
        let query = self.search.query.clone();
        let page = self.search.page + 1;
        Some(self.issue(query, page))
    }

    /// Apply the outcome of the fetch identified by `ticket`.
    ///
    /// A first page replaces the cache and commits the ticket's query; later
    /// pages are appended. A failure only moves the phase to `Error`.
    ///
    /// # Arguments
    ///
    /// * `ticket` - The ticket handed out when the fetch began
    /// * `result` - The page, or the error the fetch ended with
    ///
    /// # Returns
    ///
    /// [`Completion::Stale`] if a newer ticket exists, otherwise whether the
    /// page was applied or the fetch failed.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<PageResult, FetchError>,
    ) -> Completion {
        if ticket.seq != self.issued {
            debug!(
                seq = ticket.seq,
                latest = self.issued,
                query = %ticket.query,
                page = ticket.page,
                "Dropping stale response"
            );
            return Completion::Stale;
        }

        match result {
            Ok(page) => {
                if ticket.appends() {
                    self.cache.extend(page.articles);
                } else {
                    self.cache.replace(page.articles);
                    self.search.query = ticket.query;
                    // A fresh result set rebuilds the source list; drop a selection it no longer offers.
                    let offered = match &self.filters.source_name {
                        Some(selected) => self.cache.sources().contains(selected),
                        None => true,
                    };
                    if !offered {
                        self.filters.source_name = None;
                    }
                }
                self.search.page = ticket.page;
                self.search.total_results = page.total_results;
                self.phase = Phase::Loaded;
                info!(
                    query = %self.search.query,
                    page = self.search.page,
                    cached = self.cache.len(),
                    total_results = self.search.total_results,
                    has_more = self.search.has_more(),
                    "Merged page into cache"
                );
                Completion::Applied
            }
            Err(e) => {
                warn!(query = %ticket.query, page = ticket.page, error = %e, "Fetch failed");
                self.phase = Phase::Error(e.clone());
                Completion::Failed(e)
            }
        }
    }

    /// Run a new search against `source`.
    ///
    /// # Arguments
    ///
    /// * `source` - Where the first page is fetched from
    /// * `query` - Search term; surrounding whitespace is ignored
    ///
    /// # Returns
    ///
    /// The [`Completion`] of the fetch, or [`ControllerError::EmptyQuery`]
    /// without any request when `query` is blank.
    #[instrument(level = "info", skip(self, source))]
    pub async fn start_search<S: NewsSource>(
        &mut self,
        source: &S,
        query: &str,
    ) -> Result<Completion, ControllerError> {
        let ticket = self.begin_search(query)?;
        let result = source.fetch_page(ticket.query(), ticket.page()).await;
        Ok(self.complete(ticket, result))
    }

    /// Fetch the next page from `source` and append it.
    ///
    /// # Arguments
    ///
    /// * `source` - Where the next page is fetched from
    ///
    /// # Returns
    ///
    /// [`Completion::NoMorePages`] without a request when nothing is left,
    /// otherwise the [`Completion`] of the fetch.
    #[instrument(level = "info", skip_all)]
    pub async fn load_more<S: NewsSource>(&mut self, source: &S) -> Completion {
        let Some(ticket) = self.begin_load_more() else {
            debug!(
                page = self.search.page,
                total_results = self.search.total_results,
                "No further pages"
            );
            return Completion::NoMorePages;
        };
        let result = source.fetch_page(ticket.query(), ticket.page()).await;
        self.complete(ticket, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    /// Replays canned responses and records every request.
    #[derive(Default)]
    struct ScriptedSource {
        responses: RefCell<VecDeque<Result<PageResult, FetchError>>>,
        calls: RefCell<Vec<(String, u32)>>,
    }

    impl ScriptedSource {
        fn push(&self, result: Result<PageResult, FetchError>) {
            self.responses.borrow_mut().push_back(result);
        }

        fn calls(&self) -> Vec<(String, u32)> {
            self.calls.borrow().clone()
        }
    }

    impl NewsSource for ScriptedSource {
        async fn fetch_page(&self, query: &str, page: u32) -> Result<PageResult, FetchError> {
            self.calls.borrow_mut().push((query.to_string(), page));
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("unexpected fetch")
        }
    }

    fn articles(prefix: &str, n: usize) -> Vec<Article> {
        (0..n)
            .map(|i| Article {
                title: Some(format!("{prefix} {i}")),
                description: None,
                url: format!("https://example.com/{prefix}/{i}"),
                image_url: None,
                source_name: if i % 2 == 0 { "ESPN" } else { "BBC Sport" }.to_string(),
                published_at: DateTime::parse_from_rfc3339("2025-05-06T12:00:00Z").ok(),
            })
            .collect()
    }

    fn page(prefix: &str, n: usize, total: u64) -> Result<PageResult, FetchError> {
        Ok(PageResult {
            articles: articles(prefix, n),
            total_results: total,
        })
    }

    #[tokio::test]
    async fn test_blank_query_issues_no_request() {
        let source = ScriptedSource::default();
        let mut controller = PaginationController::new(6);

        for q in ["", "   ", "\t\n"] {
            let err = controller.start_search(&source, q).await.unwrap_err();
            assert_eq!(err, ControllerError::EmptyQuery);
        }
        assert!(source.calls().is_empty());
        assert_eq!(controller.phase(), &Phase::Idle);
    }

    #[tokio::test]
    async fn test_cricket_load_more_scenario() {
        let source = ScriptedSource::default();
        source.push(page("cricket", 6, 20));
        source.push(page("cricket-2", 6, 20));
        let mut controller = PaginationController::new(6);

        let done = controller.start_search(&source, " cricket ").await.unwrap();
        assert_eq!(done, Completion::Applied);
        assert_eq!(controller.search().query, "cricket");
        assert_eq!(controller.search().page, 1);
        assert_eq!(controller.cache().len(), 6);
        assert!(controller.has_more());

        assert_eq!(controller.load_more(&source).await, Completion::Applied);
        assert_eq!(controller.search().page, 2);
        assert!(controller.cache().len() <= 12);
        assert_eq!(controller.cache().len(), 12);
        assert!(controller.has_more());
        assert_eq!(controller.phase(), &Phase::Loaded);

        assert_eq!(
            source.calls(),
            vec![("cricket".to_string(), 1), ("cricket".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn test_load_more_is_noop_when_exhausted() {
        let source = ScriptedSource::default();
        source.push(page("short", 4, 4));
        let mut controller = PaginationController::new(6);

        controller.start_search(&source, "short").await.unwrap();
        assert!(!controller.has_more());
        assert_eq!(controller.load_more(&source).await, Completion::NoMorePages);
        assert_eq!(source.calls().len(), 1);
        assert_eq!(controller.search().page, 1);
    }

    #[tokio::test]
    async fn test_load_more_before_any_search() {
        let source = ScriptedSource::default();
        let mut controller = PaginationController::new(6);
        assert_eq!(controller.load_more(&source).await, Completion::NoMorePages);
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_empty_results_hide_load_more() {
        let source = ScriptedSource::default();
        source.push(page("xyzzy", 0, 0));
        let mut controller = PaginationController::new(6);

        assert_eq!(
            controller.start_search(&source, "xyzzy").await.unwrap(),
            Completion::Applied
        );
        assert!(controller.visible().is_empty());
        assert!(!controller.has_more());
        assert_eq!(controller.phase(), &Phase::Loaded);
    }

    #[tokio::test]
    async fn test_api_error_leaves_cache_unchanged() {
        let source = ScriptedSource::default();
        source.push(page("cricket", 6, 20));
        let rate_limited = FetchError::Api {
            message: "rate limit".to_string(),
        };
        source.push(Err(rate_limited.clone()));
        let mut controller = PaginationController::new(6);

        controller.start_search(&source, "cricket").await.unwrap();
        let before = controller.cache().articles().to_vec();

        let done = controller.start_search(&source, "football").await.unwrap();
        assert_eq!(done, Completion::Failed(rate_limited.clone()));
        assert!(done_message(&done).contains("rate limit"));
        assert_eq!(controller.phase(), &Phase::Error(rate_limited));
        assert_eq!(controller.cache().articles(), before.as_slice());
        assert_eq!(controller.search().query, "cricket");
    }

    fn done_message(done: &Completion) -> String {
        match done {
            Completion::Failed(e) => e.to_string(),
            other => format!("{other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_load_more_keeps_page() {
        let source = ScriptedSource::default();
        source.push(page("cricket", 6, 20));
        source.push(Err(FetchError::Transport {
            message: "connection reset".to_string(),
        }));
        let mut controller = PaginationController::new(6);

        controller.start_search(&source, "cricket").await.unwrap();
        let done = controller.load_more(&source).await;
        assert!(matches!(done, Completion::Failed(FetchError::Transport { .. })));
        assert_eq!(controller.search().page, 1);
        assert_eq!(controller.cache().len(), 6);
        assert!(controller.has_more());
    }

    #[tokio::test]
    async fn test_new_query_replaces_cache() {
        let source = ScriptedSource::default();
        source.push(page("cricket", 6, 20));
        source.push(page("cricket-2", 6, 20));
        source.push(page("tennis", 3, 3));
        let mut controller = PaginationController::new(6);

        controller.start_search(&source, "cricket").await.unwrap();
        controller.load_more(&source).await;
        controller.start_search(&source, "tennis").await.unwrap();

        assert_eq!(controller.cache().len(), 3);
        assert_eq!(controller.search().page, 1);
        assert!(
            controller
                .cache()
                .articles()
                .iter()
                .all(|a| a.url.contains("/tennis/"))
        );
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let mut controller = PaginationController::new(6);

        let first = controller.begin_search("cricket").unwrap();
        let second = controller.begin_search("tennis").unwrap();

        assert_eq!(controller.complete(second, page("tennis", 2, 2)), Completion::Applied);
        assert_eq!(controller.complete(first, page("cricket", 6, 20)), Completion::Stale);

        assert_eq!(controller.search().query, "tennis");
        assert_eq!(controller.cache().len(), 2);
        assert_eq!(controller.search().total_results, 2);
        assert_eq!(controller.phase(), &Phase::Loaded);
    }

    #[test]
    fn test_stale_load_more_after_new_search() {
        let mut controller = PaginationController::new(6);
        let t = controller.begin_search("cricket").unwrap();
        controller.complete(t, page("cricket", 6, 20));

        let more = controller.begin_load_more().expect("more pages");
        assert!(more.appends());
        let fresh = controller.begin_search("tennis").unwrap();

        assert_eq!(controller.complete(more, page("cricket-2", 6, 20)), Completion::Stale);
        assert_eq!(controller.phase(), &Phase::Loading);
        assert_eq!(controller.complete(fresh, page("tennis", 1, 1)), Completion::Applied);
        assert_eq!(controller.cache().len(), 1);
    }

    #[tokio::test]
    async fn test_source_selection_reset_when_missing_from_new_results() {
        let source = ScriptedSource::default();
        source.push(page("cricket", 6, 6));
        source.push(Ok(PageResult {
            articles: vec![Article {
                source_name: "Reuters".to_string(),
                ..articles("tennis", 1).remove(0)
            }],
            total_results: 1,
        }));
        let mut controller = PaginationController::new(6);

        controller.start_search(&source, "cricket").await.unwrap();
        controller.set_source_filter(Some("ESPN".to_string()));
        assert_eq!(controller.visible().len(), 3);

        controller.start_search(&source, "tennis").await.unwrap();
        assert_eq!(controller.filters().source_name, None);
        assert_eq!(controller.visible().len(), 1);
    }
}
