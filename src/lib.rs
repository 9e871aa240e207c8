// src/lib.rs
// Library surface for the binary and the integration tests.

pub mod config;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod sentiment;
pub mod store;
pub mod summarize;
pub mod text;

// ---- Re-exports for a stable public API ----
pub use crate::config::{Cli, DedupScope, RunConfig};
pub use crate::error::DigestError;
pub use crate::ingest::types::{CanonicalItem, FeedProvider, FeedSource, RawItem};
pub use crate::pipeline::{run, run_with_providers, RunOutcome, RunStats};
pub use crate::report::RunRecord;
pub use crate::sentiment::{Lexicon, SentimentAnalyzer, SentimentLabel, SentimentScore};
pub use crate::store::ItemStore;
pub use crate::summarize::{Summarizer, NO_ITEMS_PLACEHOLDER};
