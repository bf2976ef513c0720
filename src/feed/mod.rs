//! Feed retrieval and parsing.
//!
//! - [`parser`] - Converts RSS/Atom/JSON Feed documents into [`ParsedFeed`] using `feed-rs`
//! - [`fetcher`] - Sequential HTTP retrieval with per-source failure isolation
//!
//! # Example
//!
//! ```ignore
//! use webring::feed::fetch_feeds;
//!
//! let feeds = fetch_feeds(&client, &config.sources, config.fetch_timeout()).await;
//! ```

mod fetcher;
mod parser;

pub use fetcher::{fetch_feeds, fetch_one, FetchError, FetchedFeed};
pub use parser::{parse_feed, ParsedFeed, RawItem};
