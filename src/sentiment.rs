//! # Lexicon Sentiment
//! Sums term weights over the run's pooled text (each item's title + summary)
//! and maps the sign to a label. The label is a lexical proxy, not a forecast.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::ingest::types::CanonicalItem;
use crate::text::tokenize;

const BUILTIN_LEXICON: &str = include_str!("../sentiment_lexicon.json");

/// Term → polarity weight. Terms are stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    weights: HashMap<String, i32>,
}

impl Lexicon {
    pub fn from_json(raw: &str) -> Result<Self> {
        let parsed: HashMap<String, i32> =
            serde_json::from_str(raw).context("parsing sentiment lexicon json")?;
        Ok(Self::from_weights(parsed))
    }

    pub fn from_weights<I, S>(weights: I) -> Self
    where
        I: IntoIterator<Item = (S, i32)>,
        S: AsRef<str>,
    {
        let weights = weights
            .into_iter()
            .map(|(t, w)| (t.as_ref().trim().to_lowercase(), w))
            .filter(|(t, w)| !t.is_empty() && *w != 0)
            .collect();
        Self { weights }
    }

    /// The embedded default lexicon.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_LEXICON)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading lexicon from {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("in {}", path.display()))
    }

    #[inline]
    pub fn weight(&self, term: &str) -> i32 {
        self.weights.get(term).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Bullish,
    Neutral,
    Bearish,
}

impl SentimentLabel {
    /// Sign of the net score; zero is neutral.
    pub fn from_score(score: i64) -> Self {
        match score {
            s if s > 0 => Self::Bullish,
            s if s < 0 => Self::Bearish,
            _ => Self::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bullish => "bullish",
            Self::Neutral => "neutral",
            Self::Bearish => "bearish",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentScore {
    pub score: i64,
    pub label: SentimentLabel,
}

impl SentimentScore {
    pub fn from_score(score: i64) -> Self {
        Self {
            score,
            label: SentimentLabel::from_score(score),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    lexicon: Lexicon,
}

impl SentimentAnalyzer {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    /// Returns (score, token count). The sum saturates at the `i64` bounds.
    pub fn score_text(&self, text: &str) -> (i64, usize) {
        let mut score: i64 = 0;
        let mut n = 0usize;
        for tok in tokenize(text) {
            score = score.saturating_add(i64::from(self.lexicon.weight(&tok)));
            n += 1;
        }
        (score, n)
    }

    /// Net score over every item's title + summary.
    pub fn score_items(&self, items: &[CanonicalItem]) -> SentimentScore {
        let total = items
            .iter()
            .map(|it| self.score_text(&it.pooled_text()).0)
            .fold(0i64, i64::saturating_add);
        SentimentScore::from_score(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> SentimentAnalyzer {
        SentimentAnalyzer::new(Lexicon::builtin().unwrap())
    }

    #[test]
    fn builtin_lexicon_loads() {
        let lx = Lexicon::builtin().unwrap();
        assert_eq!(lx.weight("beats"), 1);
        assert_eq!(lx.weight("downgrade"), -1);
        assert_eq!(lx.weight("banana"), 0);
    }

    #[test]
    fn label_threshold_is_zero() {
        assert_eq!(SentimentLabel::from_score(1), SentimentLabel::Bullish);
        assert_eq!(SentimentLabel::from_score(0), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(-1), SentimentLabel::Bearish);
    }

    #[test]
    fn score_text_is_case_insensitive() {
        let (score, n) = analyzer().score_text("Analysts UPGRADE the stock after record quarter");
        assert_eq!(score, 2);
        assert_eq!(n, 7);
    }

    #[test]
    fn custom_weights_are_lowercased_and_zero_dropped() {
        let lx = Lexicon::from_weights([(" Rally ", 2), ("meh", 0)]);
        assert_eq!(lx.weight("rally"), 2);
        assert_eq!(lx.len(), 1);
    }

    #[test]
    fn large_weights_do_not_overflow_or_flip_sign() {
        let a = SentimentAnalyzer::new(Lexicon::from_weights([("rally", i32::MAX)]));
        let (score, _) = a.score_text("rally rally");
        assert_eq!(score, 2 * i64::from(i32::MAX));

        let item = |title: &str| CanonicalItem {
            key: title.into(),
            source: "S".into(),
            title: title.into(),
            link: String::new(),
            summary: String::new(),
            published: None,
        };
        let s = a.score_items(&[item("rally rally"), item("rally again")]);
        assert_eq!(s.score, 3 * i64::from(i32::MAX));
        assert_eq!(s.label, SentimentLabel::Bullish);
    }

    #[test]
    fn label_serializes_lowercase() {
        let s = serde_json::to_string(&SentimentLabel::Bearish).unwrap();
        assert_eq!(s, "\"bearish\"");
    }
}
