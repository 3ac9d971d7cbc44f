// ABOUTME: A script-less Page that navigates with plain HTTP GETs and answers queries from the fetched HTML.
// ABOUTME: Used by the CLI when no browser session is attached, and by tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::Value;

use super::{Page, PageError};
use crate::resource::{Fetcher, ACCEPT_HTML};

/// Page backed by a `Fetcher`. `evaluate` is a no-op and screenshots are unsupported.
pub struct StaticPage {
    fetcher: Arc<dyn Fetcher>,
    headers: HashMap<String, String>,
    html: String,
}

impl StaticPage {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            headers: HashMap::new(),
            html: String::new(),
        }
    }
}

#[async_trait]
impl Page for StaticPage {
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<(), PageError> {
        // a failed navigation leaves an empty document, never the previous one
        self.html.clear();
        let mut headers = self.headers.clone();
        headers
            .entry("Accept".to_string())
            .or_insert_with(|| ACCEPT_HTML.to_string());

        let response = tokio::time::timeout(timeout, self.fetcher.get(url, &headers))
            .await
            .map_err(|_| PageError::Timeout {
                url: url.to_string(),
                timeout,
            })?
            .map_err(|e| PageError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(PageError::Navigation {
                url: url.to_string(),
                reason: format!("HTTP status {}", response.status),
            });
        }
        self.html = response.text();
        Ok(())
    }

    async fn set_extra_headers(&mut self, headers: HashMap<String, String>) -> Result<(), PageError> {
        self.headers = headers;
        Ok(())
    }

    async fn count(&mut self, selector: &str) -> Result<usize, PageError> {
        let parsed = Selector::parse(selector).map_err(|_| PageError::Selector {
            selector: selector.to_string(),
        })?;
        let document = Html::parse_document(&self.html);
        Ok(document.select(&parsed).count())
    }

    async fn content(&mut self) -> Result<String, PageError> {
        Ok(self.html.clone())
    }

    async fn evaluate(&mut self, _script: &str) -> Result<Value, PageError> {
        Ok(Value::Null)
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, PageError> {
        Err(PageError::Unsupported("screenshot"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::HttpFetcher;
    use httpmock::prelude::*;

    fn page() -> StaticPage {
        let fetcher = HttpFetcher::new("test-agent", Duration::from_secs(5)).unwrap();
        StaticPage::new(Arc::new(fetcher))
    }

    #[tokio::test]
    async fn goto_then_count_and_content() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/list").header("x-test", "1");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<ul><li class='event'>A</li><li class='event'>B</li></ul>");
        });

        let mut page = page();
        page.set_extra_headers(HashMap::from([("X-Test".to_string(), "1".to_string())]))
            .await
            .unwrap();
        page.goto(&server.url("/list"), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(page.count("li.event").await.unwrap(), 2);
        assert_eq!(page.count(".missing").await.unwrap(), 0);
        assert!(page.content().await.unwrap().contains("B</li>"));
        assert_eq!(page.evaluate("1 + 1").await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn invalid_selector_is_an_error() {
        let mut page = page();
        let err = page.count("li[").await.unwrap_err();
        assert!(matches!(err, PageError::Selector { .. }));
    }

    #[tokio::test]
    async fn error_status_fails_navigation() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/blocked");
            then.status(403);
        });

        let mut page = page();
        let err = page
            .goto(&server.url("/blocked"), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("HTTP status 403"));
        assert!(page.screenshot().await.is_err());
    }

    #[tokio::test]
    async fn failed_navigation_drops_previous_document() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/a");
            then.status(200).body("<p>SOURCE A</p>");
        });

        let mut page = page();
        page.goto(&server.url("/a"), Duration::from_secs(5))
            .await
            .unwrap();
        assert!(page.content().await.unwrap().contains("SOURCE A"));

        let unreachable = page
            .goto("http://127.0.0.1:1/b", Duration::from_secs(5))
            .await;
        assert!(unreachable.is_err());
        assert_eq!(page.content().await.unwrap(), "");
        assert_eq!(page.count("p").await.unwrap(), 0);
    }
}
