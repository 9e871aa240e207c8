//! # Digest Pipeline
//! One run: fetch → normalize/dedup (against the store) → store append →
//! summary + sentiment → report.
//!
//! Feed failures degrade the run; store and render failures abort it.

use crate::config::{DedupScope, RunConfig};
use crate::error::{DigestError, Result};
use crate::ingest::providers::http_providers;
use crate::ingest::providers::rss::http_client;
use crate::ingest::types::FeedProvider;
use crate::ingest::{fetch_all, normalize_dedup};
use crate::report::{ReportWriter, RunRecord, WrittenReport};
use crate::sentiment::{Lexicon, SentimentAnalyzer};
use crate::store::ItemStore;
use crate::summarize::Summarizer;

/// Counters for one run, logged at the end and handy in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub sources: usize,
    pub failed_sources: usize,
    pub fetched: usize,
    pub kept: usize,
    pub empty: usize,
    pub duplicates: usize,
    pub known: usize,
    pub appended: usize,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub record: RunRecord,
    pub written: WrittenReport,
    pub stats: RunStats,
}

/// Load the lexicon named by the config, or the built-in one.
pub fn load_lexicon(cfg: &RunConfig) -> Result<Lexicon> {
    let lexicon = match &cfg.lexicon_path {
        Some(p) => Lexicon::load_from_file(p),
        None => Lexicon::builtin(),
    };
    lexicon.map_err(|e| DigestError::Config(format!("{e:#}")))
}

/// Full run against the configured HTTP feeds.
pub async fn run(cfg: &RunConfig) -> Result<RunOutcome> {
    let analyzer = SentimentAnalyzer::new(load_lexicon(cfg)?);
    let client = http_client(&cfg.fetch.user_agent, cfg.fetch.timeout)
        .map_err(|e| DigestError::Config(format!("{e:#}")))?;
    let providers = http_providers(&cfg.sources, &client);
    run_with_providers(cfg, &providers, &analyzer).await
}

/// Run with caller-supplied providers (fixtures in tests, HTTP in `run`).
pub async fn run_with_providers(
    cfg: &RunConfig,
    providers: &[Box<dyn FeedProvider>],
    analyzer: &SentimentAnalyzer,
) -> Result<RunOutcome> {
    // Open first so a corrupt or unreadable log aborts before any fetching.
    let mut store = ItemStore::open(&cfg.store_path, &cfg.ticker)?;

    let fetched = fetch_all(providers, cfg.fetch.max_concurrent).await;
    let mut stats = RunStats {
        sources: providers.len(),
        failed_sources: fetched.errors.len(),
        fetched: fetched.item_count(),
        ..RunStats::default()
    };
    if stats.failed_sources == stats.sources && stats.sources > 0 {
        tracing::warn!(sources = stats.sources, "every feed failed; rendering a degraded report");
    }
    let fetch_errors: Vec<String> = fetched.errors.iter().map(ToString::to_string).collect();

    let outcome = match cfg.dedup_scope {
        DedupScope::Store => normalize_dedup(fetched.into_items(), |k| store.contains(k)),
        DedupScope::Run => normalize_dedup(fetched.into_items(), |_| false),
    };
    stats.kept = outcome.items.len();
    stats.empty = outcome.empty;
    stats.duplicates = outcome.duplicates;
    stats.known = outcome.known;

    stats.appended = store.append(&outcome.items)?;

    let summary = Summarizer::new(cfg.summary_sentences).summarize(&outcome.items);
    let sentiment = analyzer.score_items(&outcome.items);

    let record = RunRecord {
        date: cfg.date,
        ticker: cfg.ticker.clone(),
        query: cfg.query.clone(),
        items: outcome.items,
        summary,
        sentiment,
        fetch_errors,
    };

    let writer = ReportWriter::new(&cfg.report_path, cfg.site.clone());
    let written = writer.write(&record)?;

    tracing::info!(
        ticker = %record.ticker,
        date = %record.date_str(),
        fetched = stats.fetched,
        kept = stats.kept,
        duplicates = stats.duplicates,
        known = stats.known,
        appended = stats.appended,
        failed_sources = stats.failed_sources,
        label = %record.sentiment.label,
        score = record.sentiment.score,
        "run complete"
    );

    Ok(RunOutcome {
        record,
        written,
        stats,
    })
}
