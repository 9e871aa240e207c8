// src/ingest/providers/rss.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use metrics::counter;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::ingest::feed::parse_feed;
use crate::ingest::types::{FeedProvider, RawItem};

pub const DEFAULT_USER_AGENT: &str = concat!("ticker-news-digest/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared HTTP client: identifying User-Agent and a whole-request timeout.
pub fn http_client(user_agent: &str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .context("building http client")
}

/// RSS/Atom feed provider, either fetched over HTTP or parsed from an
/// in-memory body.
pub struct RssFeedProvider {
    name: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: Client },
}

impl RssFeedProvider {
    pub fn from_fixture(name: impl Into<String>, body: &str) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Fixture(body.to_string()),
        }
    }

    pub fn from_url(name: impl Into<String>, url: impl Into<String>, client: Client) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Http {
                url: url.into(),
                client,
            },
        }
    }

    async fn fetch_body(url: &str, client: &Client) -> Result<String> {
        let resp = client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;
        let status = resp.status();
        if status != StatusCode::OK {
            bail!("GET {url}: unexpected status {status}");
        }
        resp.text()
            .await
            .with_context(|| format!("reading body of {url}"))
    }
}

#[async_trait]
impl FeedProvider for RssFeedProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawItem>> {
        match &self.mode {
            Mode::Fixture(body) => parse_feed(body, &self.name),
            Mode::Http { url, client } => {
                let body = match Self::fetch_body(url, client).await {
                    Ok(body) => body,
                    Err(e) => {
                        counter!("ingest_http_errors_total").increment(1);
                        return Err(e);
                    }
                };
                tracing::debug!(provider = %self.name, bytes = body.len(), "feed body fetched");
                parse_feed(&body, &self.name)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
