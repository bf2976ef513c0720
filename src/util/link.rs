use thiserror::Error;
use url::Url;

/// A URL that could not be parsed, either as a base or as a reference.
#[derive(Debug, Error)]
#[error("Malformed URL {url:?}: {source}")]
pub struct MalformedUrl {
    /// The offending input, verbatim
    pub url: String,
    #[source]
    pub source: url::ParseError,
}

/// Errors raised when validating a configured feed URL.
#[derive(Debug, Error)]
pub enum SourceUrlError {
    /// The URL string could not be parsed as an absolute URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
}

/// Resolves a possibly-relative reference against a base URL.
///
/// Follows RFC 3986 reference resolution: an absolute reference is returned
/// as-is, a relative one inherits scheme, host and (depending on its shape)
/// path from `base`, and an empty reference yields `base` itself.
///
/// # Errors
///
/// Returns [`MalformedUrl`] if `base` is not an absolute URL or `reference`
/// cannot be parsed relative to it.
///
/// # Examples
///
/// ```
/// use webring::util::resolve_url;
///
/// let url = resolve_url("/post/1", "https://example.com/feed").unwrap();
/// assert_eq!(url, "https://example.com/post/1");
///
/// let url = resolve_url("https://other.org/a", "https://example.com/feed").unwrap();
/// assert_eq!(url, "https://other.org/a");
/// ```
pub fn resolve_url(reference: &str, base: &str) -> Result<String, MalformedUrl> {
    resolve_against(reference, &parse_base(base)?)
}

/// Parses an absolute base URL for use with [`resolve_against`].
pub fn parse_base(base: &str) -> Result<Url, MalformedUrl> {
    Url::parse(base).map_err(|source| MalformedUrl {
        url: base.to_owned(),
        source,
    })
}

/// [`resolve_url`] with an already parsed base.
pub fn resolve_against(reference: &str, base: &Url) -> Result<String, MalformedUrl> {
    let resolved = base.join(reference).map_err(|source| MalformedUrl {
        url: reference.to_owned(),
        source,
    })?;
    Ok(resolved.into())
}

/// Validates a URL string for use as a feed source.
///
/// Only absolute `http` and `https` URLs can be fetched.
///
/// ```
/// use webring::util::validate_source_url;
///
/// assert!(validate_source_url("https://example.com/feed.xml").is_ok());
/// assert!(validate_source_url("file:///etc/passwd").is_err());
/// assert!(validate_source_url("/relative/feed.xml").is_err());
/// ```
pub fn validate_source_url(url_str: &str) -> Result<Url, SourceUrlError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(SourceUrlError::UnsupportedScheme(scheme.to_owned())),
    }
}
