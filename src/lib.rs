//! # webring
//!
//! Generates a "webring" digest: the most recent articles from a handful of
//! RSS/Atom feeds, merged newest first and rendered through a template.
//!
//! ## Architecture
//!
//! ```text
//! Sources → Fetcher → Extractor (sanitize, truncate, resolve) → Merge/Sort/Slice → Renderer
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! webring sites.yml < in.html > out.html
//! webring -s https://example.com/feed.xml -n 5 -t template.html
//! ```

/// Sources file and digest tunables.
pub mod config;

/// Article extraction and the merge/sort/slice step.
///
/// - [`Article`](digest::Article): normalized digest entry
/// - [`build_digest`](digest::build_digest): fetched feeds → ordered articles
pub mod digest;

/// Sequential feed retrieval and parsing.
pub mod feed;

/// Template rendering with the `date` / `datef` helpers.
pub mod render;

/// Sanitizing, truncation and URL resolution helpers.
pub mod util;
