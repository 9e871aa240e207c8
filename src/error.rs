//! Error taxonomy for a digest run.
//!
//! `Config`, `Store`, `StoreCorrupt` and `Render` are fatal and abort the run.
//! `Fetch` is recovered: the failing source contributes zero items and the
//! message is carried into the report.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DigestError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{feed}: {reason}")]
    Fetch { feed: String, reason: String },

    #[error("store write failed at {}: {source}", path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store log {} is corrupt at line {line}: {source}", path.display())]
    StoreCorrupt {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DigestError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn fetch(feed: impl Into<String>, err: &anyhow::Error) -> Self {
        // `{:#}` keeps the context chain on one line for the report.
        Self::Fetch {
            feed: feed.into(),
            reason: format!("{err:#}"),
        }
    }

    /// True for errors that must abort the run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Fetch { .. })
    }
}

pub type Result<T, E = DigestError> = std::result::Result<T, E>;
