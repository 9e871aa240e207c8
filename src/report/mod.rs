// src/report/mod.rs
//! Run Record rendering.
//!
//! Markdown layout next to the latest report path:
//! - `<out>`            latest report, overwritten every run
//! - `<dir>/<date>.md`  one report per run date
//! - `<dir>/index.md`   dated reports, newest first
//!
//! The optional HTML site mirrors this (see [`site`]).

pub mod site;

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SiteConfig;
use crate::error::{DigestError, Result};
use crate::ingest::types::CanonicalItem;
use crate::sentiment::SentimentScore;

pub const MARKDOWN_INDEX: &str = "index.md";
pub const SENTIMENT_DISCLAIMER: &str =
    "Lexicon-based tally of headline wording. Not a forecast or a trading signal.";

/// Everything one run produced. Built once at the end of the run.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub date: NaiveDate,
    pub ticker: String,
    pub query: String,
    pub items: Vec<CanonicalItem>,
    pub summary: String,
    pub sentiment: SentimentScore,
    /// "<source>: <reason>" per feed that failed this run.
    pub fetch_errors: Vec<String>,
}

impl RunRecord {
    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

pub fn render_markdown(rec: &RunRecord) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "# {} Daily News Summary", rec.ticker);
    s.push('\n');
    let _ = writeln!(s, "Date: {}", rec.date_str());
    let _ = writeln!(s, "Query: {}", rec.query);
    let _ = writeln!(s, "Items: {}", rec.items.len());
    s.push('\n');

    s.push_str("## Sentiment (non-predictive)\n");
    let _ = writeln!(s, "Label: {}", rec.sentiment.label);
    let _ = writeln!(s, "Score: {}", rec.sentiment.score);
    s.push('\n');
    let _ = writeln!(s, "_{SENTIMENT_DISCLAIMER}_");
    s.push('\n');

    s.push_str("## Summary\n");
    let _ = writeln!(s, "{}", rec.summary);
    s.push('\n');

    s.push_str("## Articles\n");
    if rec.items.is_empty() {
        s.push_str("No articles found.\n");
    } else {
        for it in &rec.items {
            let title = if it.title.is_empty() { &it.summary } else { &it.title };
            let _ = writeln!(s, "- {title}");
            let _ = writeln!(s, "  Source: {}", it.source);
            if let Some(p) = &it.published {
                let _ = writeln!(s, "  Published: {p}");
            }
            if !it.link.is_empty() {
                let _ = writeln!(s, "  Link: {}", it.link);
            }
        }
    }

    if !rec.fetch_errors.is_empty() {
        s.push('\n');
        s.push_str("## Fetch Errors\n");
        for e in &rec.fetch_errors {
            let _ = writeln!(s, "- {e}");
        }
    }
    s
}

/// Markdown archive index over the given dates (expected newest first).
pub fn render_markdown_index(ticker: &str, dates: &[NaiveDate]) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "# {ticker} Report Archive");
    s.push('\n');
    if dates.is_empty() {
        s.push_str("No reports yet.\n");
    }
    for d in dates {
        let day = d.format("%Y-%m-%d");
        let _ = writeln!(s, "- [{day}]({day}.md)");
    }
    s
}

/// Paths written by one [`ReportWriter::write`].
#[derive(Debug, Clone)]
pub struct WrittenReport {
    pub latest: PathBuf,
    pub dated: PathBuf,
    pub index: PathBuf,
    pub site: Option<site::SitePaths>,
}

#[derive(Debug, Clone)]
pub struct ReportWriter {
    report_path: PathBuf,
    site: Option<SiteConfig>,
}

impl ReportWriter {
    pub fn new(report_path: impl Into<PathBuf>, site: Option<SiteConfig>) -> Self {
        Self {
            report_path: report_path.into(),
            site,
        }
    }

    fn report_dir(&self) -> PathBuf {
        match self.report_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// Write latest + dated markdown, regenerate the index, then the site.
    /// Earlier dated reports are never removed.
    pub fn write(&self, rec: &RunRecord) -> Result<WrittenReport> {
        let body = render_markdown(rec);
        let dir = self.report_dir();

        let dated = dir.join(format!("{}.md", rec.date_str()));
        write_file(&dated, &body)?;
        write_file(&self.report_path, &body)?;

        let dates = list_dated(&dir, "md").map_err(|source| DigestError::Render {
            path: dir.clone(),
            source,
        })?;
        let index = dir.join(MARKDOWN_INDEX);
        write_file(&index, &render_markdown_index(&rec.ticker, &dates))?;

        let site = match &self.site {
            Some(cfg) => Some(site::write_site(cfg, rec)?),
            None => None,
        };

        tracing::info!(
            latest = %self.report_path.display(),
            dated = %dated.display(),
            archived = dates.len(),
            "report written"
        );
        Ok(WrittenReport {
            latest: self.report_path.clone(),
            dated,
            index,
            site,
        })
    }
}

/// Create parent directories and write `contents` to `path`.
pub(crate) fn write_file(path: &Path, contents: &str) -> Result<()> {
    let render_err = |source| DigestError::Render {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(render_err)?;
    }
    fs::write(path, contents).map_err(render_err)
}

/// Dates of `<YYYY-MM-DD>.<ext>` files in `dir`, newest first. Other files are ignored.
pub(crate) fn list_dated(dir: &Path, ext: &str) -> std::io::Result<Vec<NaiveDate>> {
    let mut dates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|s| s.to_str()) != Some(ext) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Ok(d) = NaiveDate::parse_from_str(stem, "%Y-%m-%d") {
            dates.push(d);
        }
    }
    dates.sort_unstable_by(|a, b| b.cmp(a));
    dates.dedup();
    Ok(dates)
}
