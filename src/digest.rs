//! Article extraction and the global merge/sort/slice step.
//!
//! The pipeline is a pure fold: every fetched feed maps to a list of
//! [`Article`]s, the lists are flattened in feed order, stably sorted newest
//! first and cut to the requested length.
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::{DigestOptions, Source};
use crate::feed::{fetch_feeds, FetchedFeed, RawItem};
use crate::util::{
    parse_base, resolve_against, sanitize_summary, summary_source, truncate_markup, MalformedUrl,
};

/// Errors that abort a digest run.
#[derive(Debug, Error)]
pub enum DigestError {
    /// Every source failed to fetch, so there is nothing to render
    #[error("Expected at least one feed to successfully fetch")]
    NoUsableFeeds,
    /// A feed or item URL could not be parsed. One bad link fails the whole
    /// run rather than being skipped.
    #[error("Failed parsing {what} of feed {feed:?}: {source}")]
    MalformedUrl {
        what: &'static str,
        feed: String,
        #[source]
        source: MalformedUrl,
    },
}

/// One normalized entry of the digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    /// Absolute article URL
    pub link: String,
    /// Absolute URL of the site the article came from
    pub source_link: String,
    pub source_title: String,
    /// Published (or last updated) time; `None` when the feed gives neither
    pub date: Option<DateTime<Utc>>,
    /// Sanitized, escaped and truncated summary markup
    pub summary: String,
}

/// Builds the articles contributed by one feed.
///
/// Takes the first `options.per_source` items in the feed's own order. A feed
/// without items is logged and contributes nothing.
///
/// # Errors
///
/// [`DigestError::MalformedUrl`] if the feed's update URL, its link, or any
/// selected item link fails to parse.
pub fn extract_articles(
    feed: &FetchedFeed,
    options: &DigestOptions,
) -> Result<Vec<Article>, DigestError> {
    if feed.items.is_empty() {
        tracing::warn!(title = %feed.title, "Feed has no items");
        return Ok(Vec::new());
    }

    let malformed = |what: &'static str| {
        move |source: MalformedUrl| DigestError::MalformedUrl {
            what,
            feed: feed.title.clone(),
            source,
        }
    };

    let base = parse_base(&feed.update_url).map_err(malformed("update URL"))?;
    let source_link = resolve_against(&feed.link, &base).map_err(malformed("canonical link"))?;

    feed.items
        .iter()
        .take(options.per_source)
        .map(|item| -> Result<Article, DigestError> {
            let link = resolve_against(&item.link, &base).map_err(malformed("article link"))?;
            Ok(Article {
                title: item.title.clone(),
                link,
                source_link: source_link.clone(),
                source_title: feed.title.clone(),
                date: item.date,
                summary: build_summary(item, options.summary_width),
            })
        })
        .collect()
}

/// Summary, else entity-decoded content, sanitized and cut to `max_width`.
fn build_summary(item: &RawItem, max_width: usize) -> String {
    let raw = summary_source(&item.summary, &item.content);
    let sanitized = sanitize_summary(&raw);
    truncate_markup(&sanitized, max_width).into_owned()
}

/// Sorts articles newest first and keeps at most `count`.
///
/// The sort is stable: articles with equal dates keep their input order.
/// Undated articles sort after every dated one.
pub fn merge_articles(mut articles: Vec<Article>, count: usize) -> Vec<Article> {
    articles.sort_by(|a, b| b.date.cmp(&a.date));
    articles.truncate(count);
    articles
}

/// Turns already-fetched feeds into the final, ordered article list.
///
/// # Errors
///
/// - [`DigestError::NoUsableFeeds`] if `feeds` is empty
/// - [`DigestError::MalformedUrl`] from [`extract_articles`]
pub fn build_digest(
    feeds: &[FetchedFeed],
    options: &DigestOptions,
) -> Result<Vec<Article>, DigestError> {
    if feeds.is_empty() {
        return Err(DigestError::NoUsableFeeds);
    }

    let per_feed = feeds
        .iter()
        .map(|feed| extract_articles(feed, options))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(merge_articles(
        per_feed.into_iter().flatten().collect(),
        options.articles,
    ))
}

/// Fetches every source and builds the digest.
///
/// Failing sources are skipped (see [`fetch_feeds`]); the run only fails
/// when none succeed or a URL is malformed.
pub async fn collect_articles(
    client: &reqwest::Client,
    sources: &[Source],
    options: &DigestOptions,
    timeout: Duration,
) -> Result<Vec<Article>, DigestError> {
    let feeds = fetch_feeds(client, sources, timeout).await;
    build_digest(&feeds, options)
}
