// src/ingest/feed.rs
//! Syndication body parsing. RSS 2.0 and Atom, picked by the root element.

use anyhow::{bail, Context, Result};
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::{OffsetDateTime, UtcOffset};

use crate::ingest::types::RawItem;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entry: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    summary: Option<AtomText>,
    content: Option<AtomText>,
    published: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href", default)]
    href: String,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

// Atom text constructs carry a `type` attribute, so read the text node explicitly.
#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

impl AtomEntry {
    fn alternate_link(&self) -> String {
        self.links
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| self.links.first())
            .map(|l| l.href.clone())
            .unwrap_or_default()
    }
}

/// Parse a feed body into raw items tagged with `source`.
pub fn parse_feed(body: &str, source: &str) -> Result<Vec<RawItem>> {
    let t0 = std::time::Instant::now();
    let xml = scrub_html_entities_for_xml(body);

    let items = match root_element(&xml).as_deref() {
        Some("rss") => {
            let rss: Rss =
                from_str(&xml).with_context(|| format!("parsing rss xml from {source}"))?;
            rss.channel
                .item
                .into_iter()
                .map(|it| RawItem {
                    source: source.to_string(),
                    title: it.title.unwrap_or_default(),
                    link: it.link.unwrap_or_default(),
                    summary: it.description.unwrap_or_default(),
                    published: it.pub_date.as_deref().and_then(normalize_timestamp),
                })
                .collect::<Vec<_>>()
        }
        Some("feed") => {
            let atom: AtomFeed =
                from_str(&xml).with_context(|| format!("parsing atom xml from {source}"))?;
            atom.entry
                .into_iter()
                .map(|e| {
                    let link = e.alternate_link();
                    RawItem {
                        source: source.to_string(),
                        title: e.title.map(|t| t.value).unwrap_or_default(),
                        link,
                        summary: e
                            .summary
                            .or(e.content)
                            .map(|t| t.value)
                            .unwrap_or_default(),
                        published: e
                            .published
                            .or(e.updated)
                            .as_deref()
                            .and_then(normalize_timestamp),
                    }
                })
                .collect()
        }
        Some(other) => bail!("unsupported feed document <{other}> from {source}"),
        None => bail!("no xml root element in response from {source}"),
    };

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("ingest_parse_ms").record(ms);
    counter!("ingest_events_total").increment(items.len() as u64);
    Ok(items)
}

/// Local name of the first element, skipping the prolog.
fn root_element(xml: &str) -> Option<String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
}

/// RFC 2822 (RSS) or RFC 3339 (Atom) → RFC 3339 UTC. Unparsable values are
/// kept verbatim so the report can still show them.
pub fn normalize_timestamp(ts: &str) -> Option<String> {
    let ts = ts.trim();
    if ts.is_empty() {
        return None;
    }
    let parsed = OffsetDateTime::parse(ts, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(ts, &Rfc3339))
        .ok()
        .and_then(|dt| dt.to_offset(UtcOffset::UTC).format(&Rfc3339).ok());
    Some(parsed.unwrap_or_else(|| ts.to_string()))
}

// HTML-only entities are not defined in XML and make the parser bail.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}
