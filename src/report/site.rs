// src/report/site.rs
//! Static site: `index.html` (latest), `archive/<date>.html`, `archive.html`,
//! and an optional `CNAME` marker for static hosting on a custom domain.

use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as esc};
use std::fmt::Write as _;
use std::path::PathBuf;

use super::{list_dated, write_file, RunRecord, SENTIMENT_DISCLAIMER};
use crate::config::SiteConfig;
use crate::error::{DigestError, Result};

pub const LATEST_PAGE: &str = "index.html";
pub const ARCHIVE_PAGE: &str = "archive.html";
pub const ARCHIVE_DIR: &str = "archive";
pub const CNAME_FILE: &str = "CNAME";

const STYLE: &str = "body{font-family:system-ui,-apple-system,Segoe UI,Roboto,sans-serif;margin:40px;color:#111;}\
h1{margin-bottom:4px;} .meta{color:#555;margin-bottom:20px;}\
.card{border:1px solid #ddd;padding:16px;border-radius:8px;margin-bottom:16px;}\
a{color:#0b57d0;text-decoration:none;} a:hover{text-decoration:underline;}";

#[derive(Debug, Clone)]
pub struct SitePaths {
    pub latest: PathBuf,
    pub dated: PathBuf,
    pub archive_index: PathBuf,
    pub cname: Option<PathBuf>,
}

fn page_head(s: &mut String, title: &str) {
    s.push_str("<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    s.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(s, "<title>{}</title>", esc(title));
    let _ = writeln!(s, "<style>{STYLE}</style>");
    s.push_str("</head>\n<body>\n");
}

fn is_web_link(link: &str) -> bool {
    let l = link.to_ascii_lowercase();
    l.starts_with("http://") || l.starts_with("https://")
}

/// `root` is the relative path from the page back to the site root:
/// `""` for `index.html`, `"../"` for pages under `archive/`.
pub fn render_html_report(rec: &RunRecord, root: &str) -> String {
    let title = format!("{} Daily News Summary", rec.ticker);
    let mut s = String::new();
    page_head(&mut s, &title);

    let _ = writeln!(s, "<h1>{}</h1>", esc(&title));
    let _ = writeln!(
        s,
        "<div class=\"meta\">Date: {} &middot; Query: {} &middot; Items: {} &middot; <a href=\"{root}{ARCHIVE_PAGE}\">Archive</a></div>",
        rec.date_str(),
        esc(&rec.query),
        rec.items.len()
    );

    s.push_str("<div class=\"card\">\n<h2>Sentiment (non-predictive)</h2>\n");
    let _ = writeln!(
        s,
        "<p>Label: {} &middot; Score: {}</p>",
        rec.sentiment.label, rec.sentiment.score
    );
    let _ = writeln!(s, "<p class=\"meta\">{}</p>\n</div>", esc(SENTIMENT_DISCLAIMER));

    s.push_str("<div class=\"card\">\n<h2>Summary</h2>\n");
    let _ = writeln!(s, "<p>{}</p>\n</div>", esc(&rec.summary));

    s.push_str("<div class=\"card\">\n<h2>Articles</h2>\n");
    if rec.items.is_empty() {
        s.push_str("<p>No articles found.</p>\n");
    } else {
        s.push_str("<ul>\n");
        for it in &rec.items {
            let title = if it.title.is_empty() { &it.summary } else { &it.title };
            s.push_str("<li>");
            if is_web_link(&it.link) {
                let _ = write!(s, "<a href=\"{}\">{}</a>", attr(&it.link), esc(title));
            } else {
                s.push_str(&esc(title));
            }
            let _ = write!(s, "<div class=\"meta\">{}", esc(&it.source));
            if let Some(p) = &it.published {
                let _ = write!(s, " &middot; {}", esc(p));
            }
            s.push_str("</div>");
            if !it.summary.is_empty() && !it.title.is_empty() {
                let _ = write!(s, "<div>{}</div>", esc(&it.summary));
            }
            s.push_str("</li>\n");
        }
        s.push_str("</ul>\n");
    }
    s.push_str("</div>\n");

    if !rec.fetch_errors.is_empty() {
        s.push_str("<div class=\"card\">\n<h2>Fetch Errors</h2>\n<ul>\n");
        for e in &rec.fetch_errors {
            let _ = writeln!(s, "<li>{}</li>", esc(e));
        }
        s.push_str("</ul>\n</div>\n");
    }

    s.push_str("</body>\n</html>\n");
    s
}

/// Archive page linking each dated report, in the order given (newest first).
pub fn render_archive_index(ticker: &str, dates: &[NaiveDate]) -> String {
    let title = format!("{ticker} Report Archive");
    let mut s = String::new();
    page_head(&mut s, &title);
    let _ = writeln!(s, "<h1>{}</h1>", esc(&title));
    let _ = writeln!(s, "<p><a href=\"{LATEST_PAGE}\">Latest</a></p>");
    s.push_str("<ul>\n");
    for d in dates {
        let day = d.format("%Y-%m-%d");
        let _ = writeln!(s, "<li><a href=\"{ARCHIVE_DIR}/{day}.html\">{day}</a></li>");
    }
    s.push_str("</ul>\n</body>\n</html>\n");
    s
}

/// Write latest + dated pages, regenerate the archive page, write CNAME.
pub fn write_site(cfg: &SiteConfig, rec: &RunRecord) -> Result<SitePaths> {
    let archive_dir = cfg.dir.join(ARCHIVE_DIR);

    let dated = archive_dir.join(format!("{}.html", rec.date_str()));
    write_file(&dated, &render_html_report(rec, "../"))?;
    let latest = cfg.dir.join(LATEST_PAGE);
    write_file(&latest, &render_html_report(rec, ""))?;

    let dates = list_dated(&archive_dir, "html").map_err(|source| DigestError::Render {
        path: archive_dir.clone(),
        source,
    })?;
    let archive_index = cfg.dir.join(ARCHIVE_PAGE);
    write_file(&archive_index, &render_archive_index(&rec.ticker, &dates))?;

    let cname = match &cfg.cname {
        Some(domain) => {
            let p = cfg.dir.join(CNAME_FILE);
            write_file(&p, &format!("{domain}\n"))?;
            Some(p)
        }
        None => None,
    };

    tracing::info!(dir = %cfg.dir.display(), archived = dates.len(), "site written");
    Ok(SitePaths {
        latest,
        dated,
        archive_index,
        cname,
    })
}
