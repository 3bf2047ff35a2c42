//! NewsAPI client.
//!
//! This module issues exactly one HTTP GET per page request against the
//! NewsAPI `/v2/everything` endpoint and maps every failure to a
//! [`FetchError`].
//!
//! # Architecture
//!
//! The module uses a trait-based design so the pagination controller can be
//! driven by something other than the live API:
//! - [`NewsSource`]: Core trait defining async page fetches
//! - [`NewsApiClient`]: The `reqwest`-backed implementation
//!
//! # Failure Mapping
//!
//! - Body decoded with `status != "ok"` → [`FetchError::Api`] carrying the payload's `message`
//! - Connection failure, unreadable body, or non-JSON body → [`FetchError::Transport`]
//!
//! The HTTP status code is not consulted. NewsAPI reports errors such as
//! rate limiting as JSON bodies alongside 4xx codes, and the payload's
//! `message` is what gets surfaced. There is no retry.

use crate::error::FetchError;
use crate::models::{ApiResponse, Article, PageResult};
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Default NewsAPI search endpoint.
pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/v2/everything";

/// Trait for fetching one page of search results.
///
/// Implementors return the articles of `page` (1-based) for `query` along
/// with the total number of hits the backend reports.
pub trait NewsSource {
    /// Fetch a single page.
    ///
    /// # Arguments
    ///
    /// * `query` - Non-empty search term
    /// * `page` - 1-based page number
    async fn fetch_page(&self, query: &str, page: u32) -> Result<PageResult, FetchError>;
}

/// `reqwest`-backed [`NewsSource`] talking to NewsAPI.
pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    page_size: u32,
}

impl fmt::Debug for NewsApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewsApiClient")
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl NewsApiClient {
    /// Create a client with a default `reqwest::Client`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, page_size: u32) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, api_key, page_size)
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        page_size: u32,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            page_size,
        }
    }

    /// Build the request URL for `query` and `page`.
    ///
    /// The query is percent-encoded the way a browser's `encodeURIComponent`
    /// does it (spaces become `%20`, not `+`).
    pub fn request_url(&self, query: &str, page: u32) -> Result<Url, FetchError> {
        let raw = format!(
            "{}?q={}&pageSize={}&page={}&apiKey={}&language=en&sortBy=publishedAt",
            self.base_url,
            urlencoding::encode(query),
            self.page_size,
            page,
            urlencoding::encode(&self.api_key),
        );
        Url::parse(&raw).map_err(|e| FetchError::Transport {
            message: format!("invalid request URL: {e}"),
        })
    }
}

impl NewsSource for NewsApiClient {
    #[instrument(level = "info", skip(self), fields(page_size = self.page_size))]
    async fn fetch_page(&self, query: &str, page: u32) -> Result<PageResult, FetchError> {
        let t0 = Instant::now();
        let url = self.request_url(query, page)?;

        let res = self.http.get(url).send().await;
        let response = match res {
            Ok(r) => r,
            Err(e) => {
                warn!(elapsed_ms = t0.elapsed().as_millis(), error = %e, "News request failed");
                return Err(e.into());
            }
        };
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "Received news response");

        let payload: ApiResponse = serde_json::from_str(&body)?;
        if payload.status != "ok" {
            let message = payload
                .message
                .unwrap_or_else(|| format!("unexpected status \"{}\"", payload.status));
            warn!(%status, %message, "News API returned an error");
            return Err(FetchError::Api { message });
        }

        let articles: Vec<Article> = payload.articles.into_iter().map(Article::from).collect();
        info!(
            count = articles.len(),
            total_results = payload.total_results,
            elapsed_ms = t0.elapsed().as_millis(),
            "Fetched news page"
        );
        Ok(PageResult {
            articles,
            total_results: payload.total_results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Json, Router,
        extract::{Query, State},
        http::StatusCode,
        response::IntoResponse,
        routing::get,
    };
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use tokio::net::TcpListener;

    type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

    async fn handle_everything(
        State(seen): State<Seen>,
        Query(params): Query<HashMap<String, String>>,
    ) -> axum::response::Response {
        let q = params.get("q").cloned().unwrap_or_default();
        seen.lock().unwrap().push(params);

        match q.as_str() {
            "rate" => (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({"status": "error", "code": "rateLimited", "message": "rate limit"})),
            )
                .into_response(),
            "garbage" => (StatusCode::OK, "<html>oops</html>").into_response(),
            "xyzzy" => Json(json!({"status": "ok", "totalResults": 0, "articles": []})).into_response(),
            _ => Json(json!({
                "status": "ok",
                "totalResults": 20,
                "articles": [
                    {
                        "source": {"id": null, "name": "ESPN"},
                        "title": "Test match report",
                        "description": "Day one",
                        "url": "https://example.com/1",
                        "urlToImage": null,
                        "publishedAt": "2025-05-06T10:00:00Z"
                    },
                    {
                        "source": {"id": "bbc-sport", "name": "BBC Sport"},
                        "title": "Squad named",
                        "description": null,
                        "url": "https://example.com/2",
                        "urlToImage": "https://example.com/2.jpg",
                        "publishedAt": "2025-05-05T09:00:00Z"
                    }
                ]
            }))
            .into_response(),
        }
    }

    async fn spawn_news_server() -> (String, Seen) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/v2/everything", get(handle_everything))
            .with_state(seen.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        (format!("http://{addr}/v2/everything"), seen)
    }

    fn client_for(base_url: &str) -> NewsApiClient {
        let http = reqwest::Client::builder().no_proxy().build().expect("client");
        NewsApiClient::with_http(http, base_url, "test-key", 6)
    }

    #[test]
    fn test_request_url_parameters() {
        let client = NewsApiClient::new(DEFAULT_BASE_URL, "k3y", 6);
        let url = client.request_url("world cup & more", 2).unwrap();
        let s = url.as_str();

        assert!(s.starts_with("https://newsapi.org/v2/everything?"));
        assert!(s.contains("q=world%20cup%20%26%20more"));
        assert!(s.contains("pageSize=6"));
        assert!(s.contains("page=2"));
        assert!(s.contains("apiKey=k3y"));
        assert!(s.contains("language=en"));
        assert!(s.contains("sortBy=publishedAt"));
    }

    #[tokio::test]
    async fn test_fetch_page_success() {
        let (base_url, seen) = spawn_news_server().await;
        let client = client_for(&base_url);

        let page = client.fetch_page("cricket", 1).await.expect("page");
        assert_eq!(page.total_results, 20);
        assert_eq!(page.articles.len(), 2);
        assert_eq!(page.articles[0].source_name, "ESPN");
        assert_eq!(page.articles[1].description, None);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].get("q").map(String::as_str), Some("cricket"));
        assert_eq!(seen[0].get("page").map(String::as_str), Some("1"));
        assert_eq!(seen[0].get("pageSize").map(String::as_str), Some("6"));
        assert_eq!(seen[0].get("apiKey").map(String::as_str), Some("test-key"));
        assert_eq!(seen[0].get("language").map(String::as_str), Some("en"));
        assert_eq!(seen[0].get("sortBy").map(String::as_str), Some("publishedAt"));
    }

    #[tokio::test]
    async fn test_fetch_page_empty_is_not_an_error() {
        let (base_url, _) = spawn_news_server().await;
        let page = client_for(&base_url).fetch_page("xyzzy", 1).await.expect("page");
        assert!(page.articles.is_empty());
        assert_eq!(page.total_results, 0);
    }

    #[tokio::test]
    async fn test_fetch_page_api_error_uses_payload_message() {
        let (base_url, _) = spawn_news_server().await;
        let err = client_for(&base_url).fetch_page("rate", 1).await.unwrap_err();
        assert_eq!(
            err,
            FetchError::Api {
                message: "rate limit".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_page_non_json_is_transport_error() {
        let (base_url, _) = spawn_news_server().await;
        let err = client_for(&base_url).fetch_page("garbage", 1).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }

    #[tokio::test]
    async fn test_fetch_page_connection_refused_is_transport_error() {
        // Bind then drop to obtain a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(&format!("http://{addr}/v2/everything"))
            .fetch_page("cricket", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
