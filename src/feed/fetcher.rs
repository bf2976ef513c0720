use std::time::Duration;

use futures::StreamExt;
use thiserror::Error;
use url::Url;

use crate::config::Source;
use crate::feed::parser::{parse_feed, ParsedFeed, RawItem};
use crate::util::{validate_source_url, SourceUrlError};

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while retrieving a single feed.
///
/// Every variant is isolated to one source: the run logs it and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Feed URL is not an absolute http(s) URL
    #[error("Invalid feed URL: {0}")]
    InvalidUrl(#[from] SourceUrlError),
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request and body together exceeded the configured timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    /// Document could not be parsed as RSS, Atom or JSON Feed
    #[error("Parse error: {0}")]
    Parse(String),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
}

/// A successfully retrieved and parsed feed, ready for article extraction.
#[derive(Debug, Clone)]
pub struct FetchedFeed {
    /// Feed title, or the source's configured name when the feed has none
    pub title: String,
    /// Canonical site link as declared by the feed (possibly relative)
    pub link: String,
    /// URL the document was retrieved from; base for relative links
    pub update_url: String,
    /// Items in the feed's own order
    pub items: Vec<RawItem>,
}

impl FetchedFeed {
    /// Combines a parsed document with the source it came from.
    ///
    /// An empty feed title falls back to the source's name, and an empty feed
    /// link falls back to the source's site URL.
    pub fn from_parsed(parsed: ParsedFeed, source: &Source, update_url: String) -> Self {
        let title = if parsed.title.is_empty() {
            tracing::warn!(source = %source.feed_url, "Feed has no title");
            source.name.clone().unwrap_or_default()
        } else {
            parsed.title
        };

        let link = if parsed.link.is_empty() {
            source.site_url.clone().unwrap_or_default()
        } else {
            parsed.link
        };

        Self {
            title,
            link,
            update_url,
            items: parsed.items,
        }
    }
}

/// Fetches every source in order, one at a time.
///
/// A source that fails is logged and skipped; it never aborts the others.
/// The returned feeds keep the configured source order.
///
/// # Arguments
///
/// * `client` - HTTP client used for every request
/// * `sources` - Sources in configured order
/// * `timeout` - Upper bound for each fetch, request and body together
pub async fn fetch_feeds(
    client: &reqwest::Client,
    sources: &[Source],
    timeout: Duration,
) -> Vec<FetchedFeed> {
    tracing::info!(sources = sources.len(), "Fetching feeds...");

    let mut feeds = Vec::with_capacity(sources.len());
    for source in sources {
        match fetch_one(client, source, timeout).await {
            Ok(feed) => {
                tracing::info!(title = %feed.title, items = feed.items.len(), "Fetched feed");
                feeds.push(feed);
            }
            Err(e) => {
                tracing::warn!(source = %source.feed_url, error = %e, "Error fetching feed");
            }
        }
    }
    feeds
}

/// Retrieves and parses a single source.
///
/// # Errors
///
/// - [`FetchError::InvalidUrl`] - Feed URL is not an absolute http(s) URL
/// - [`FetchError::Network`] - Connection or TLS errors
/// - [`FetchError::Timeout`] - Request plus body exceeded `timeout`
/// - [`FetchError::HttpStatus`] - Non-2xx HTTP response
/// - [`FetchError::ResponseTooLarge`] - Response exceeded 10MB
/// - [`FetchError::Parse`] - Not a recognizable feed document
pub async fn fetch_one(
    client: &reqwest::Client,
    source: &Source,
    timeout: Duration,
) -> Result<FetchedFeed, FetchError> {
    let url = validate_source_url(&source.feed_url)?;
    let (update_url, bytes) = tokio::time::timeout(timeout, download(client, url))
        .await
        .map_err(|_| FetchError::Timeout(timeout))??;

    let parsed = parse_feed(&bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

    Ok(FetchedFeed::from_parsed(parsed, source, update_url))
}

/// Returns the final URL (after redirects) together with the body.
async fn download(client: &reqwest::Client, url: Url) -> Result<(String, Vec<u8>), FetchError> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    let final_url = response.url().to_string();
    let bytes = read_limited_bytes(response, MAX_FEED_SIZE).await?;
    Ok((final_url, bytes))
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
