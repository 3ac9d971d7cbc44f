// ABOUTME: Plain HTTP fetching for the json, ics, and rss extractors and the detail-image fallback.
// ABOUTME: Defines the Fetcher trait, the reqwest-backed HttpFetcher, and charset-aware body decoding.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ExtractError;

/// Maximum allowed body length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

pub const ACCEPT_JSON: &str = "application/json, text/plain, */*";
pub const ACCEPT_FEED: &str =
    "application/rss+xml, application/atom+xml, application/xml;q=0.9, text/xml;q=0.8, */*;q=0.5";
pub const ACCEPT_CALENDAR: &str = "text/calendar, text/plain;q=0.9, */*;q=0.5";
pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// A completed HTTP exchange. Non-2xx statuses are responses too; callers decide.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as text, using the Content-Type charset or detection.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }

    /// Turns a non-2xx response into a reportable fetch error.
    pub fn require_success(self, target: &str, op: &str) -> Result<Self, ExtractError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ExtractError::fetch(
                target,
                op,
                Some(anyhow::anyhow!("HTTP status {}", self.status)),
            ))
        }
    }
}

/// Plain HTTP GET capability.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Errors only on transport failure; any HTTP status is returned as a response.
    async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<FetchResponse, ExtractError>;
}

/// `Fetcher` backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Builds a client with the given identity and timeout.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| {
                ExtractError::fetch("http client", "Build", Some(anyhow::anyhow!(e)))
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<FetchResponse, ExtractError> {
        let parsed = url::Url::parse(url).map_err(|e| {
            ExtractError::fetch(url, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ExtractError::fetch(
                url,
                "Fetch",
                Some(anyhow::anyhow!("scheme must be http or https")),
            ));
        }

        let mut request = self.client.get(parsed);
        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(|e| {
            ExtractError::fetch(url, "Fetch", Some(anyhow::anyhow!("request failed: {}", e)))
        })?;

        if let Some(len) = response.content_length() {
            if len as usize > MAX_CONTENT_LENGTH {
                return Err(ExtractError::fetch(
                    url,
                    "Fetch",
                    Some(anyhow::anyhow!("content too large")),
                ));
            }
        }

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_lowercase());

        let body = response.bytes().await.map_err(|e| {
            ExtractError::fetch(
                url,
                "Fetch",
                Some(anyhow::anyhow!("failed to read body: {}", e)),
            )
        })?;

        if body.len() > MAX_CONTENT_LENGTH {
            return Err(ExtractError::fetch(
                url,
                "Fetch",
                Some(anyhow::anyhow!("content too large")),
            ));
        }

        Ok(FetchResponse {
            status,
            final_url,
            content_type,
            body,
        })
    }
}

/// A single-entry Accept header map.
pub fn accept(value: &str) -> HashMap<String, String> {
    HashMap::from([("Accept".to_string(), value.to_string())])
}

/// Decode body bytes to a String using charset from content-type header or detection.
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(charset) = content_type.and_then(extract_charset) {
        if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
            let (decoded, _, _) = encoding.decode(body);
            return decoded.into_owned();
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    lower.split(';').find_map(|part| {
        part.trim()
            .strip_prefix("charset=")
            .map(|cs| cs.trim_matches('"').trim_matches('\'').to_string())
    })
}
