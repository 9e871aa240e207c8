// src/ingest/providers/mod.rs
pub mod rss;

use reqwest::Client;

use crate::ingest::types::{FeedProvider, FeedSource};
use rss::RssFeedProvider;

/// One HTTP provider per source, in configured order. `sources` must already
/// have their URL templates rendered.
pub fn http_providers(sources: &[FeedSource], client: &Client) -> Vec<Box<dyn FeedProvider>> {
    sources
        .iter()
        .map(|s| {
            Box::new(RssFeedProvider::from_url(&s.name, &s.url, client.clone()))
                as Box<dyn FeedProvider>
        })
        .collect()
}
