//! Sources file parser.
//!
//! The native format is TOML; `.yml` / `.yaml` files are read as YAML and may
//! be either the same mapping or a bare list of sources. Every key is
//! optional, missing ones fall back to `Config::default()`. Unknown TOML keys
//! are ignored by serde, though we log a warning when the file contains
//! potential typos.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read sources file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in sources file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid YAML in sources file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Sources file exceeds maximum allowed size.
    #[error("Sources file too large: {0}")]
    TooLarge(String),

    #[error("No feed sources configured")]
    NoSources,

    #[error("Fetch timeout must be at least one second")]
    ZeroTimeout,
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// A configured feed endpoint.
///
/// Field names follow the classic webring `sites.yml` layout:
/// `name`, `url` (the site) and `rss` (the feed).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Source {
    /// Display name, used when the feed itself has no title.
    #[serde(default)]
    pub name: Option<String>,

    /// Feed document URL. An entry without one fails when fetched, like any
    /// other unreachable source.
    #[serde(default, rename = "rss", alias = "feed")]
    pub feed_url: String,

    /// Canonical site URL, used when the feed declares no link.
    #[serde(default, rename = "url", alias = "site")]
    pub site_url: Option<String>,
}

impl Source {
    /// A source known only by its feed URL (e.g. given on the command line).
    pub fn from_feed_url(feed_url: impl Into<String>) -> Self {
        Self {
            name: None,
            feed_url: feed_url.into(),
            site_url: None,
        }
    }
}

/// Tunables for one digest run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestOptions {
    /// Total number of articles in the digest (N).
    pub articles: usize,
    /// Maximum articles taken from each feed (P).
    pub per_source: usize,
    /// Maximum display width of a summary, ellipsis included (W).
    pub summary_width: usize,
}

impl Default for DigestOptions {
    fn default() -> Self {
        Self {
            articles: 3,
            per_source: 1,
            summary_width: 256,
        }
    }
}

/// Contents of a sources file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Feeds to aggregate, in order.
    pub sources: Vec<Source>,

    /// Total number of articles in the digest.
    pub articles: usize,

    /// Maximum number of articles taken from each feed.
    pub per_source: usize,

    /// Maximum summary width in display columns.
    pub summary_length: usize,

    /// Per-feed fetch timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let options = DigestOptions::default();
        Self {
            sources: Vec::new(),
            articles: options.articles,
            per_source: options.per_source,
            summary_length: options.summary_width,
            timeout_secs: 30,
        }
    }
}

/// YAML files may hold just the list of sources.
#[derive(Deserialize)]
#[serde(untagged)]
enum YamlConfig {
    Sources(Vec<Source>),
    Full(Config),
}

impl Config {
    /// Maximum sources file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] = [
        "sources",
        "articles",
        "per_source",
        "summary_length",
        "timeout_secs",
    ];

    /// Load configuration from a TOML or YAML file, chosen by extension.
    ///
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML/YAML → `Err(ConfigError::Toml)` / `Err(ConfigError::Yaml)`
    /// - Unknown keys → silently accepted, logged as warning (TOML)
    ///
    /// Unlike an optional settings file, a sources file that does not exist is
    /// an error: the caller asked for it explicitly.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let meta = std::fs::metadata(path)?;
        if meta.len() > Self::MAX_FILE_SIZE {
            return Err(ConfigError::TooLarge(format!(
                "Sources file is {} bytes (max {} bytes)",
                meta.len(),
                Self::MAX_FILE_SIZE
            )));
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Sources file is empty, using defaults");
            return Ok(Self::default());
        }

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"));

        let config = if is_yaml {
            Self::from_yaml_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };
        tracing::debug!(
            path = %path.display(),
            sources = config.sources.len(),
            "Loaded sources file"
        );
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        // Parse as a raw table first to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in sources file, ignoring");
                }
            }
        }

        Ok(toml::from_str(content)?)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(match serde_yaml::from_str::<YamlConfig>(content)? {
            YamlConfig::Sources(sources) => Self {
                sources,
                ..Self::default()
            },
            YamlConfig::Full(config) => config,
        })
    }

    /// Checks that there is something to fetch.
    ///
    /// Feed URLs are not checked here: a bad one only drops that source when
    /// it is fetched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn options(&self) -> DigestOptions {
        DigestOptions {
            articles: self.articles,
            per_source: self.per_source,
            summary_width: self.summary_length,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Writes `content` to a fresh file under the temp dir and returns its path.
    fn write_temp(test: &str, file: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("webring_config_test_{}", test));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(file);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.sources.is_empty());
        assert_eq!(config.options(), DigestOptions::default());
        assert_eq!(config.options().articles, 3);
        assert_eq!(config.options().per_source, 1);
        assert_eq!(config.options().summary_width, 256);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_missing_file_is_error() {
        let path = Path::new("/tmp/webring_test_nonexistent_sources.toml");
        assert!(matches!(Config::load(path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_empty_file_returns_default() {
        let path = write_temp("empty", "sources.toml", "   \n  ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_full_toml() {
        let content = r#"
articles = 5
per_source = 2
summary_length = 120
timeout_secs = 10

[[sources]]
name = "Example"
url = "https://example.com"
rss = "https://example.com/feed.xml"

[[sources]]
rss = "https://other.org/atom.xml"
"#;
        let path = write_temp("full_toml", "sources.toml", content);
        let config = Config::load(&path).unwrap();

        assert_eq!(
            config.options(),
            DigestOptions {
                articles: 5,
                per_source: 2,
                summary_width: 120,
            }
        );
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].name.as_deref(), Some("Example"));
        assert_eq!(config.sources[0].site_url.as_deref(), Some("https://example.com"));
        assert_eq!(config.sources[1], Source::from_feed_url("https://other.org/atom.xml"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str("articles = 10\n").unwrap();
        assert_eq!(config.articles, 10);
        assert_eq!(config.per_source, 1);
        assert_eq!(config.summary_length, 256);
    }

    #[test]
    fn test_yaml_bare_list() {
        let content = r#"
- name: Drew DeVault
  url: https://drewdevault.com
  rss: https://drewdevault.com/blog/index.xml
- rss: https://emersion.fr/blog/atom.xml
"#;
        let path = write_temp("yaml_list", "sites.yml", content);
        let config = Config::load(&path).unwrap();

        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].name.as_deref(), Some("Drew DeVault"));
        assert_eq!(config.sources[0].feed_url, "https://drewdevault.com/blog/index.xml");
        assert_eq!(config.sources[1].name, None);
        assert_eq!(config.options(), DigestOptions::default());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_yaml_mapping() {
        let content = r#"
articles: 4
sources:
  - rss: https://example.com/feed.xml
"#;
        let config = Config::from_yaml_str(content).unwrap();
        assert_eq!(config.articles, 4);
        assert_eq!(config.sources.len(), 1);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let err = Config::from_toml_str("this is not [valid toml").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_wrong_type_returns_error() {
        assert!(Config::from_toml_str("articles = \"three\"\n").is_err());
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let content = r#"
articles = 2
totally_fake_key = "should not fail"
"#;
        let config = Config::from_toml_str(content).unwrap();
        assert_eq!(config.articles, 2);
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = write_temp("too_large", "sources.toml", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_validate_requires_sources() {
        assert!(matches!(
            Config::default().validate(),
            Err(ConfigError::NoSources)
        ));
    }

    #[test]
    fn test_validate_leaves_feed_urls_to_the_fetcher() {
        let config = Config {
            sources: vec![
                Source::from_feed_url("https://example.com/feed.xml"),
                Source::from_feed_url("example.com/feed.xml"),
                Source::from_feed_url("ftp://example.com/feed.xml"),
            ],
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = Config {
            sources: vec![Source::from_feed_url("https://example.com/feed.xml")],
            timeout_secs: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn test_yaml_entry_without_feed_url_still_loads() {
        let content = "- name: No Feed\n  url: https://nofeed.example/\n- rss: https://ok.example/feed.xml\n";
        let config = Config::from_yaml_str(content).unwrap();
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[0].feed_url, "");
        assert_eq!(config.sources[1].feed_url, "https://ok.example/feed.xml");
    }
}
