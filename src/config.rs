// src/config.rs
//! Invocation parameters and the feed source list.
//!
//! Everything here runs before any network or disk writes; every failure is a
//! `DigestError::Config`.

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{DigestError, Result};
use crate::ingest::providers::rss::{DEFAULT_FETCH_TIMEOUT, DEFAULT_USER_AGENT};
use crate::ingest::types::FeedSource;
use crate::store::DEFAULT_STORE_PATH;
use crate::summarize::DEFAULT_SUMMARY_SENTENCES;

pub const ENV_SOURCES_PATH: &str = "NEWS_SOURCES_PATH";
pub const DEFAULT_SOURCES_TOML: &str = "config/sources.toml";
pub const DEFAULT_SOURCES_JSON: &str = "config/sources.json";
pub const DEFAULT_REPORT_PATH: &str = "reports/latest.md";
pub const DEFAULT_SITE_DIR: &str = "site";
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;

const MAX_TICKER_LEN: usize = 15;

/// Which earlier items count as duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DedupScope {
    /// Only items seen earlier in the same run.
    Run,
    /// Also items persisted by any earlier run for this ticker.
    Store,
}

#[derive(Debug, Parser)]
#[command(name = "ticker-news-digest")]
#[command(about = "Collect, dedup, summarize and label news headlines for a ticker")]
#[command(version)]
pub struct Cli {
    /// Ticker symbol, e.g. DASH
    #[arg(short, long, env = "NEWS_TICKER")]
    pub ticker: Option<String>,

    /// Search query for query-based feeds (defaults to the ticker)
    #[arg(short, long, env = "NEWS_QUERY")]
    pub query: Option<String>,

    /// Report date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Feed source list (TOML or JSON)
    #[arg(long)]
    pub sources: Option<PathBuf>,

    /// Item store path
    #[arg(long, default_value = DEFAULT_STORE_PATH)]
    pub db: PathBuf,

    /// Latest markdown report path; dated reports go next to it
    #[arg(long, default_value = DEFAULT_REPORT_PATH)]
    pub out: PathBuf,

    /// Static site output directory
    #[arg(long, default_value = DEFAULT_SITE_DIR)]
    pub site: PathBuf,

    /// Skip the static site
    #[arg(long)]
    pub no_site: bool,

    /// Custom domain written to the site's CNAME file
    #[arg(long, env = "NEWS_CNAME")]
    pub cname: Option<String>,

    /// JSON lexicon {"term": weight} replacing the built-in one
    #[arg(long)]
    pub lexicon: Option<PathBuf>,

    /// Per-feed request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Feeds fetched at the same time
    #[arg(long, default_value_t = DEFAULT_MAX_CONCURRENT_FETCHES)]
    pub max_concurrent_fetches: usize,

    /// Sentences in the summary
    #[arg(long, default_value_t = DEFAULT_SUMMARY_SENTENCES)]
    pub summary_sentences: usize,

    /// Dedup against this run only, or against the store as well
    #[arg(long, value_enum, default_value_t = DedupScope::Store)]
    pub dedup_scope: DedupScope,

    /// User-Agent header sent to feeds
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Log as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub max_concurrent: usize,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub dir: PathBuf,
    pub cname: Option<String>,
}

/// Validated run parameters. Sources have their URL templates rendered.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub ticker: String,
    pub query: String,
    pub date: NaiveDate,
    pub sources: Vec<FeedSource>,
    pub store_path: PathBuf,
    pub report_path: PathBuf,
    pub site: Option<SiteConfig>,
    pub lexicon_path: Option<PathBuf>,
    pub fetch: FetchConfig,
    pub summary_sentences: usize,
    pub dedup_scope: DedupScope,
}

impl RunConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let ticker = normalize_ticker(cli.ticker.as_deref().unwrap_or_default())?;
        let query = match cli.query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => q.to_string(),
            Some(_) => return Err(DigestError::config("query must not be blank")),
            None => ticker.clone(),
        };
        if cli.timeout_secs == 0 {
            return Err(DigestError::config("timeout must be at least 1 second"));
        }
        if cli.max_concurrent_fetches == 0 {
            return Err(DigestError::config("max concurrent fetches must be at least 1"));
        }
        if cli.summary_sentences == 0 {
            return Err(DigestError::config("summary sentences must be at least 1"));
        }
        if cli.user_agent.trim().is_empty() {
            return Err(DigestError::config("user agent must not be blank"));
        }
        for (what, p) in [("store path", &cli.db), ("report path", &cli.out)] {
            if p.as_os_str().is_empty() || p.file_name().is_none() {
                return Err(DigestError::config(format!("{what} must name a file")));
            }
        }

        let templates = resolve_sources(cli.sources.as_deref())?;
        let sources = render_sources(&templates, &ticker, &query)?;

        let site = if cli.no_site {
            None
        } else {
            if cli.site.as_os_str().is_empty() {
                return Err(DigestError::config("site directory must not be empty"));
            }
            Some(SiteConfig {
                dir: cli.site,
                cname: cli
                    .cname
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty()),
            })
        };

        Ok(Self {
            ticker,
            query,
            date: cli.date.unwrap_or_else(|| chrono::Local::now().date_naive()),
            sources,
            store_path: cli.db,
            report_path: cli.out,
            site,
            lexicon_path: cli.lexicon,
            fetch: FetchConfig {
                timeout: Duration::from_secs(cli.timeout_secs),
                max_concurrent: cli.max_concurrent_fetches,
                user_agent: cli.user_agent.trim().to_string(),
            },
            summary_sentences: cli.summary_sentences,
            dedup_scope: cli.dedup_scope,
        })
    }
}

/// Trimmed, upper-cased ticker of 1..=15 chars from `[A-Za-z0-9.^=-]`.
pub fn normalize_ticker(raw: &str) -> Result<String> {
    let t = raw.trim();
    if t.is_empty() {
        return Err(DigestError::config("ticker is required (--ticker or NEWS_TICKER)"));
    }
    if t.chars().count() > MAX_TICKER_LEN {
        return Err(DigestError::config(format!(
            "ticker {t:?} is longer than {MAX_TICKER_LEN} characters"
        )));
    }
    if let Some(bad) = t
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '^' | '=' | '-')))
    {
        return Err(DigestError::config(format!(
            "ticker {t:?} contains invalid character {bad:?}"
        )));
    }
    Ok(t.to_ascii_uppercase())
}

/// The two defaults: a ticker headline feed and a query search feed.
pub fn builtin_sources() -> Vec<FeedSource> {
    vec![
        FeedSource::new(
            "Yahoo Finance",
            "https://finance.yahoo.com/rss/headline?s={ticker}",
        ),
        FeedSource::new(
            "Google News",
            "https://news.google.com/rss/search?q={query}&hl=en-US&gl=US&ceid=US:en",
        ),
    ]
}

/// Source list resolution:
/// 1) explicit path (must exist)
/// 2) $NEWS_SOURCES_PATH (must exist)
/// 3) config/sources.toml
/// 4) config/sources.json
/// 5) built-in defaults
pub fn resolve_sources(explicit: Option<&Path>) -> Result<Vec<FeedSource>> {
    if let Some(p) = explicit {
        return load_sources_from(p).map_err(config_err);
    }
    if let Ok(p) = std::env::var(ENV_SOURCES_PATH) {
        let pb = PathBuf::from(p);
        if !pb.exists() {
            return Err(DigestError::config(format!(
                "{ENV_SOURCES_PATH} points to non-existent path {}",
                pb.display()
            )));
        }
        return load_sources_from(&pb).map_err(config_err);
    }
    for fallback in [DEFAULT_SOURCES_TOML, DEFAULT_SOURCES_JSON] {
        let p = Path::new(fallback);
        if p.exists() {
            return load_sources_from(p).map_err(config_err);
        }
    }
    Ok(builtin_sources())
}

fn config_err(e: anyhow::Error) -> DigestError {
    DigestError::Config(format!("{e:#}"))
}

/// Load a source list from TOML or JSON.
pub fn load_sources_from(path: &Path) -> anyhow::Result<Vec<FeedSource>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading sources from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let sources = parse_sources(&content, ext.as_str())
        .with_context(|| format!("parsing sources in {}", path.display()))?;
    clean_sources(sources)
}

#[derive(serde::Deserialize)]
struct SourcesFile {
    sources: Vec<FeedSource>,
}

fn parse_sources(s: &str, hint_ext: &str) -> anyhow::Result<Vec<FeedSource>> {
    let try_toml = hint_ext == "toml" || (hint_ext != "json" && s.contains("[[sources]]"));
    if try_toml {
        let v: SourcesFile = toml::from_str(s)?;
        return Ok(v.sources);
    }
    // JSON: {"sources": [...]} or a bare array
    if let Ok(v) = serde_json::from_str::<SourcesFile>(s) {
        return Ok(v.sources);
    }
    if let Ok(v) = serde_json::from_str::<Vec<FeedSource>>(s) {
        return Ok(v);
    }
    if hint_ext != "json" {
        if let Ok(v) = toml::from_str::<SourcesFile>(s) {
            return Ok(v.sources);
        }
    }
    Err(anyhow!("unsupported sources format"))
}

fn clean_sources(items: Vec<FeedSource>) -> anyhow::Result<Vec<FeedSource>> {
    let mut out = Vec::with_capacity(items.len());
    for (i, s) in items.into_iter().enumerate() {
        let name = s.name.trim();
        let url = s.url.trim();
        if name.is_empty() || url.is_empty() {
            return Err(anyhow!("source #{} needs both a name and a url", i + 1));
        }
        out.push(FeedSource::new(name, url));
    }
    if out.is_empty() {
        return Err(anyhow!("source list is empty"));
    }
    Ok(out)
}

static RE_PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex"));

/// Fill `{ticker}` and `{query}` (percent-encoded). Anything else in braces is an error.
pub fn render_url(template: &str, ticker: &str, query: &str) -> Result<String> {
    let mut unknown = None;
    let rendered = RE_PLACEHOLDER.replace_all(template, |caps: &regex::Captures| {
        match &caps[1] {
            "ticker" => urlencoding::encode(ticker).into_owned(),
            "query" => urlencoding::encode(query).into_owned(),
            other => {
                unknown.get_or_insert_with(|| other.to_string());
                caps[0].to_string()
            }
        }
    });
    if let Some(name) = unknown {
        return Err(DigestError::config(format!(
            "unknown placeholder {{{name}}} in {template}"
        )));
    }

    let url = reqwest::Url::parse(&rendered)
        .map_err(|e| DigestError::config(format!("invalid feed url {rendered}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(DigestError::config(format!(
            "feed url {rendered} must be http or https"
        )));
    }
    Ok(rendered.into_owned())
}

pub fn render_sources(sources: &[FeedSource], ticker: &str, query: &str) -> Result<Vec<FeedSource>> {
    sources
        .iter()
        .map(|s| {
            render_url(&s.url, ticker, query)
                .map(|url| FeedSource::new(s.name.clone(), url))
                .map_err(|e| match e {
                    DigestError::Config(msg) => DigestError::Config(format!("{}: {msg}", s.name)),
                    other => other,
                })
        })
        .collect()
}
