use anyhow::Result;
use chrono::{DateTime, Utc};
use feed_rs::model::Link;
use feed_rs::parser;

/// Feed-level data extracted from an RSS, Atom or JSON Feed document.
#[derive(Debug, Clone, Default)]
pub struct ParsedFeed {
    pub title: String,
    /// Canonical site link; empty when the feed declares none
    pub link: String,
    /// Items in document order
    pub items: Vec<RawItem>,
}

/// One entry as it appears on the wire, before any normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawItem {
    pub title: String,
    /// Possibly relative; empty when the entry has no link
    pub link: String,
    pub date: Option<DateTime<Utc>>,
    pub summary: String,
    /// Full HTML content, used when `summary` is empty
    pub content: String,
}

pub fn parse_feed(bytes: &[u8]) -> Result<ParsedFeed> {
    let feed = parser::parse(bytes)?;

    let items = feed
        .entries
        .into_iter()
        .map(|entry| RawItem {
            title: entry.title.map(|t| t.content).unwrap_or_default(),
            link: preferred_link(&entry.links),
            date: entry.published.or(entry.updated),
            summary: entry.summary.map(|s| s.content).unwrap_or_default(),
            content: entry.content.and_then(|c| c.body).unwrap_or_default(),
        })
        .collect();

    Ok(ParsedFeed {
        title: feed.title.map(|t| t.content).unwrap_or_default(),
        link: preferred_link(&feed.links),
        items,
    })
}

/// Picks the human-facing link: the first `alternate` (or untyped) link,
/// falling back to whatever comes first. Atom feeds list `self` links too.
fn preferred_link(links: &[Link]) -> String {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
        .unwrap_or_default()
}
