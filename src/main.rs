use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

use webring::config::{Config, Source};
use webring::digest::collect_articles;
use webring::render::Renderer;

#[derive(Parser, Debug)]
#[command(
    name = "webring",
    about = "Render the latest articles from a set of feeds through a template",
    after_help = "Example: webring sites.yml < in.html > out.html"
)]
struct Args {
    /// Sources file (TOML, or YAML with a .yml/.yaml extension)
    #[arg(value_name = "FILE")]
    sources_file: Option<PathBuf>,

    /// Additional feed URL (repeatable)
    #[arg(short = 's', long = "source", value_name = "URL")]
    sources: Vec<String>,

    /// Total number of articles to include
    #[arg(short = 'n', long)]
    articles: Option<usize>,

    /// Maximum number of articles per feed
    #[arg(short = 'p', long)]
    per_source: Option<usize>,

    /// Maximum summary width in display columns
    #[arg(short = 'l', long)]
    summary_length: Option<usize>,

    /// Read the template from a file instead of stdin
    #[arg(short = 't', long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Per-feed fetch timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

impl Args {
    /// Command-line values take precedence over the sources file.
    fn apply(&self, config: &mut Config) {
        config
            .sources
            .extend(self.sources.iter().map(Source::from_feed_url));
        if let Some(n) = self.articles {
            config.articles = n;
        }
        if let Some(p) = self.per_source {
            config.per_source = p;
        }
        if let Some(l) = self.summary_length {
            config.summary_length = l;
        }
        if let Some(t) = self.timeout {
            config.timeout_secs = t;
        }
    }
}

fn read_template(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template '{}'", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read template from stdin")?;
            Ok(input)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Diagnostics go to stderr; stdout carries the rendered document
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.sources_file {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load sources file '{}'", path.display()))?,
        None => Config::default(),
    };
    args.apply(&mut config);
    config.validate()?;
    tracing::debug!(?config, "Effective configuration");

    // Parse the template before any network traffic
    let template = read_template(args.template.as_ref())?;
    let renderer = Renderer::new(template)?;

    let client = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .context("Failed to build HTTP client")?;

    let articles = collect_articles(
        &client,
        &config.sources,
        &config.options(),
        config.fetch_timeout(),
    )
    .await?;

    let mut stdout = std::io::stdout().lock();
    renderer.render_to(&articles, &mut stdout)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "webring",
            "-s",
            "https://a.example/feed",
            "-s",
            "https://b.example/feed",
            "-n",
            "7",
            "-l",
            "80",
        ]);
        let mut config = Config {
            sources: vec![Source::from_feed_url("https://file.example/feed")],
            ..Config::default()
        };
        args.apply(&mut config);

        let urls: Vec<_> = config.sources.iter().map(|s| s.feed_url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://file.example/feed",
                "https://a.example/feed",
                "https://b.example/feed"
            ]
        );
        assert_eq!(config.articles, 7);
        assert_eq!(config.per_source, 1);
        assert_eq!(config.summary_length, 80);
    }

    #[test]
    fn test_cli_defaults_leave_config_untouched() {
        let args = Args::parse_from(["webring", "sites.yml"]);
        let mut config = Config::default();
        args.apply(&mut config);
        assert_eq!(config, Config::default());
        assert_eq!(args.sources_file, Some(PathBuf::from("sites.yml")));
    }
}
