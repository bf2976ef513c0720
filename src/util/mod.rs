//! Text, HTML and URL helpers used to normalize feed items.
//!
//! - **Sanitizing**: strict tag stripping of untrusted feed HTML
//! - **Truncation**: display-width-aware shortening of escaped markup
//! - **URLs**: reference resolution and feed URL validation
//!
//! # Examples
//!
//! ```
//! use webring::util::{resolve_url, sanitize_summary, truncate_markup};
//!
//! let summary = sanitize_summary("<p>Fish &amp; chips</p>");
//! assert_eq!(truncate_markup(&summary, 8), "Fish &amp; …");
//!
//! let link = resolve_url("/post/1", "https://example.com/feed").unwrap();
//! assert_eq!(link, "https://example.com/post/1");
//! ```

mod html;
mod link;
mod text;

pub use html::{sanitize_summary, summary_source};
pub use link::{
    parse_base, resolve_against, resolve_url, validate_source_url, MalformedUrl, SourceUrlError,
};
pub use text::{display_width, markup_width, strip_control_chars, truncate_markup, ELLIPSIS};
