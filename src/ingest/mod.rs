// src/ingest/mod.rs
pub mod feed;
pub mod providers;
pub mod types;

use crate::error::DigestError;
use crate::ingest::types::{CanonicalItem, FeedProvider, RawItem};
use futures::stream::{self, StreamExt};
use metrics::{counter, describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_events_total", "Total entries parsed from feeds.");
        describe_counter!(
            "ingest_kept_total",
            "Items kept after normalization and dedup."
        );
        describe_counter!(
            "ingest_filtered_total",
            "Items dropped for empty title and summary."
        );
        describe_counter!(
            "ingest_dedup_total",
            "Items dropped as duplicates within a run."
        );
        describe_counter!(
            "ingest_known_total",
            "Items dropped because the store already has them."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Feed fetch/parse errors."
        );
        describe_histogram!("ingest_parse_ms", "Feed parse time in milliseconds.");
    });
}

/// Normalize feed text: decode entities, strip tags, fold quotes, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[a-z!][^>]*>").expect("tag regex"));
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace (includes NBSP)
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("whitespace regex"));
    out = re_ws.replace_all(&out, " ").trim().to_string();

    // 5) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect::<String>().trim_end().to_string();
    }

    out
}

/// Identity key: the link when present, otherwise the title; case-folded.
pub fn identity_key(link: &str, title: &str) -> String {
    let link = link.trim();
    if link.is_empty() {
        title.trim().to_lowercase()
    } else {
        link.to_lowercase()
    }
}

/// Canonicalize one raw item. `None` when title and summary are both empty.
pub fn canonicalize(raw: RawItem) -> Option<CanonicalItem> {
    let title = normalize_text(&raw.title);
    let summary = normalize_text(&raw.summary);
    if title.is_empty() && summary.is_empty() {
        return None;
    }
    let link = raw.link.trim().to_string();
    let key = identity_key(&link, if title.is_empty() { &summary } else { &title });
    Some(CanonicalItem {
        key,
        source: raw.source.trim().to_string(),
        title,
        link,
        summary,
        published: raw.published.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
    })
}

/// Result of the normalize + dedup pass.
#[derive(Debug, Default, Clone)]
pub struct DedupOutcome {
    pub items: Vec<CanonicalItem>,
    /// Dropped for empty title and summary.
    pub empty: usize,
    /// Dropped because an earlier item in this run had the same key.
    pub duplicates: usize,
    /// Dropped because `is_known` reported the key (previous runs).
    pub known: usize,
}

/// Canonicalize and deduplicate in input order; the first occurrence of a key wins.
///
/// `is_known` lets the caller exclude keys persisted by earlier runs. Pass
/// `|_| false` for within-run dedup only.
pub fn normalize_dedup<I, F>(raw: I, is_known: F) -> DedupOutcome
where
    I: IntoIterator<Item = RawItem>,
    F: Fn(&str) -> bool,
{
    ensure_metrics_described();

    let mut out = DedupOutcome::default();
    let mut seen: HashSet<String> = HashSet::new();

    for ev in raw {
        let Some(item) = canonicalize(ev) else {
            out.empty += 1;
            continue;
        };
        if !seen.insert(item.key.clone()) {
            tracing::debug!(key = %item.key, source = %item.source, "duplicate dropped");
            out.duplicates += 1;
            continue;
        }
        if is_known(&item.key) {
            out.known += 1;
            continue;
        }
        out.items.push(item);
    }

    counter!("ingest_kept_total").increment(out.items.len() as u64);
    counter!("ingest_filtered_total").increment(out.empty as u64);
    counter!("ingest_dedup_total").increment(out.duplicates as u64);
    counter!("ingest_known_total").increment(out.known as u64);

    out
}

/// Per-source results of one fetch pass, in configured source order.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    batches: Vec<Vec<RawItem>>,
    pub errors: Vec<DigestError>,
}

impl FetchOutcome {
    pub fn item_count(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    /// All raw items, lazily concatenated across sources.
    pub fn into_items(self) -> impl Iterator<Item = RawItem> {
        self.batches.into_iter().flatten()
    }
}

/// Fetch every provider once, at most `max_concurrent` at a time.
///
/// A failing provider is logged and contributes nothing. Output order is the
/// provider order regardless of completion order.
pub async fn fetch_all(providers: &[Box<dyn FeedProvider>], max_concurrent: usize) -> FetchOutcome {
    ensure_metrics_described();

    let results: Vec<_> = stream::iter(providers.iter())
        .map(|p| async move { (p.name().to_string(), p.fetch_latest().await) })
        .buffered(max_concurrent.max(1))
        .collect()
        .await;

    let mut out = FetchOutcome::default();
    for (name, res) in results {
        match res {
            Ok(items) => {
                tracing::info!(provider = %name, items = items.len(), "feed fetched");
                out.batches.push(items);
            }
            Err(e) => {
                tracing::warn!(error = ?e, provider = %name, "provider error");
                counter!("ingest_provider_errors_total").increment(1);
                out.errors.push(DigestError::fetch(name, &e));
            }
        }
    }
    out
}
