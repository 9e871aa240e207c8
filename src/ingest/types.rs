// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One configured feed: a display name and a URL template with
/// `{ticker}` / `{query}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A feed entry as parsed. Missing fields are resolved to empty strings at
/// parse time; only `published` stays optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawItem {
    pub source: String,
    pub title: String,
    pub link: String,
    pub summary: String,
    pub published: Option<String>,
}

/// A normalized, deduplicated item. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalItem {
    pub key: String,
    pub source: String,
    pub title: String,
    pub link: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
}

impl CanonicalItem {
    /// "title summary" text used by the summarizer and the sentiment scorer.
    pub fn pooled_text(&self) -> String {
        match (self.title.is_empty(), self.summary.is_empty()) {
            (false, false) => format!("{} {}", self.title, self.summary),
            (false, true) => self.title.clone(),
            _ => self.summary.clone(),
        }
    }
}

#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    /// Fetch and parse the feed; entries in feed order.
    async fn fetch_latest(&self) -> Result<Vec<RawItem>>;
    fn name(&self) -> &str;
}
