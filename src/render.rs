//! Renders the digest through a caller-supplied template.
//!
//! Templates use Jinja syntax (via `minijinja`). The context holds one
//! variable, `articles`, a list of objects with `title`, `link`,
//! `source_link`, `source_title`, `summary` and `date` (RFC 3339 string, or
//! none). Output is HTML-escaped except for `summary`, which is already safe
//! markup. Referencing an undefined variable or attribute is an error.
//!
//! ```text
//! {% for article in articles %}
//! <a href="{{ article.link }}">{{ article.title }}</a>
//! <p>{{ article.summary }}</p>
//! <small>via {{ article.source_title }}, {{ date(article.date) }}</small>
//! {% endfor %}
//! ```
use std::io::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, SecondsFormat};
use minijinja::{context, AutoEscape, Environment, ErrorKind, UndefinedBehavior, Value};
use thiserror::Error;

use crate::digest::Article;

const TEMPLATE_NAME: &str = "digest";

/// Format used by the `date` helper, e.g. "January 2, 2006".
const DATE_FORMAT: &str = "%B %-d, %Y";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to parse template: {0}")]
    Parse(#[source] minijinja::Error),
    #[error("Failed to render template: {0}")]
    Render(#[source] minijinja::Error),
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Formatting functions callable from templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Helper {
    /// `date(d)`: fixed "Month D, YYYY" format
    Date,
    /// `datef(fmt, d)`: strftime-style format chosen by the template
    DateFormat,
}

impl Helper {
    pub const ALL: [Helper; 2] = [Helper::Date, Helper::DateFormat];

    /// Name the helper is called by inside a template.
    pub fn name(self) -> &'static str {
        match self {
            Helper::Date => "date",
            Helper::DateFormat => "datef",
        }
    }

    fn register(self, env: &mut Environment<'static>) {
        match self {
            Helper::Date => env.add_function(self.name(), format_date),
            Helper::DateFormat => env.add_function(self.name(), format_date_with),
        }
    }
}

/// A parsed template, ready to render a digest.
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    /// Parses `source` and registers every [`Helper`].
    ///
    /// # Errors
    ///
    /// [`RenderError::Parse`] if the template has a syntax error.
    pub fn new(source: impl Into<String>) -> Result<Self, RenderError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        for helper in Helper::ALL {
            helper.register(&mut env);
        }
        env.add_template_owned(TEMPLATE_NAME, source.into())
            .map_err(RenderError::Parse)?;
        Ok(Self { env })
    }

    /// Renders the whole document into memory.
    pub fn render(&self, articles: &[Article]) -> Result<String, RenderError> {
        let template = self
            .env
            .get_template(TEMPLATE_NAME)
            .map_err(RenderError::Render)?;
        let articles: Vec<Value> = articles.iter().map(article_value).collect();
        template
            .render(context! { articles })
            .map_err(RenderError::Render)
    }

    /// Renders the document and writes it to `out` in a single write.
    ///
    /// Nothing is written if rendering fails.
    pub fn render_to<W: Write>(&self, articles: &[Article], out: &mut W) -> Result<(), RenderError> {
        let document = self.render(articles)?;
        out.write_all(document.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

fn article_value(article: &Article) -> Value {
    context! {
        title => article.title,
        link => article.link,
        source_link => article.source_link,
        source_title => article.source_title,
        summary => Value::from_safe_string(article.summary.clone()),
        date => article.date.map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true)),
    }
}

fn parse_date(value: &str) -> Result<DateTime<FixedOffset>, minijinja::Error> {
    DateTime::parse_from_rfc3339(value).map_err(|e| {
        minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("not a date: {:?} ({})", value, e),
        )
    })
}

fn format_date(value: Option<String>) -> Result<String, minijinja::Error> {
    match value {
        Some(value) => Ok(parse_date(&value)?.format(DATE_FORMAT).to_string()),
        None => Ok(String::new()),
    }
}

fn format_date_with(format: String, value: Option<String>) -> Result<String, minijinja::Error> {
    // chrono panics when displaying an invalid format, so reject it up front
    if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
        return Err(minijinja::Error::new(
            ErrorKind::InvalidOperation,
            format!("invalid date format {:?}", format),
        ));
    }
    match value {
        Some(value) => Ok(parse_date(&value)?.format(&format).to_string()),
        None => Ok(String::new()),
    }
}
