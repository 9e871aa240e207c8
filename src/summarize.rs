//! # Extractive Summarizer
//! Picks the highest-scoring sentences from the run's items and returns them
//! in their original order.
//!
//! Candidate pool: each item's title (as one sentence) followed by the
//! sentences of its summary. A sentence scores the sum, over its content
//! terms, of that term's frequency across the whole pool. Ties go to the
//! earlier sentence. No text is generated; output is a pure function of the
//! input order.

use std::collections::{HashMap, HashSet};

use crate::ingest::types::CanonicalItem;
use crate::text::{content_terms, split_sentences};

/// Returned instead of a summary when the run collected nothing.
pub const NO_ITEMS_PLACEHOLDER: &str = "No items collected.";
pub const DEFAULT_SUMMARY_SENTENCES: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct Summarizer {
    max_sentences: usize,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self::new(DEFAULT_SUMMARY_SENTENCES)
    }
}

impl Summarizer {
    pub fn new(max_sentences: usize) -> Self {
        Self {
            max_sentences: max_sentences.max(1),
        }
    }

    pub fn summarize(&self, items: &[CanonicalItem]) -> String {
        let pool = candidate_sentences(items);
        if pool.is_empty() {
            return NO_ITEMS_PLACEHOLDER.to_string();
        }
        if pool.len() <= self.max_sentences {
            return pool.join(" ");
        }

        let mut freq: HashMap<String, usize> = HashMap::new();
        for s in &pool {
            for t in content_terms(s) {
                *freq.entry(t).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(usize, usize)> = pool
            .iter()
            .enumerate()
            .map(|(idx, s)| {
                let score = content_terms(s)
                    .map(|t| freq.get(&t).copied().unwrap_or(0))
                    .sum();
                (idx, score)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let mut picked: Vec<usize> = ranked
            .into_iter()
            .take(self.max_sentences)
            .map(|(idx, _)| idx)
            .collect();
        picked.sort_unstable();

        picked
            .into_iter()
            .map(|idx| pool[idx].as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Titles get a terminating period so joined output reads as sentences.
fn candidate_sentences(items: &[CanonicalItem]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut pool = Vec::new();
    for it in items {
        let mut sentences = Vec::new();
        if !it.title.is_empty() {
            sentences.push(terminated(&it.title));
        }
        sentences.extend(split_sentences(&it.summary));
        for s in sentences {
            if seen.insert(s.clone()) {
                pool.push(s);
            }
        }
    }
    pool
}

fn terminated(s: &str) -> String {
    if s.ends_with(['.', '!', '?']) {
        s.to_string()
    } else {
        format!("{s}.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(title: &str, summary: &str) -> CanonicalItem {
        CanonicalItem {
            key: title.to_lowercase(),
            source: "Test".into(),
            title: title.into(),
            link: String::new(),
            summary: summary.into(),
            published: None,
        }
    }

    #[test]
    fn empty_input_yields_placeholder() {
        assert_eq!(Summarizer::default().summarize(&[]), NO_ITEMS_PLACEHOLDER);
    }

    #[test]
    fn short_pool_is_returned_whole() {
        let items = vec![item("Shares climb", "Revenue beat estimates.")];
        assert_eq!(
            Summarizer::new(3).summarize(&items),
            "Shares climb. Revenue beat estimates."
        );
    }

    #[test]
    fn picks_top_sentences_in_original_order() {
        let items = vec![
            item("Weather is mild", ""),
            item("DoorDash revenue jumps", "DoorDash revenue growth tops forecasts."),
            item("Unrelated sports score", ""),
            item("Analysts lift DoorDash revenue target", ""),
        ];
        let out = Summarizer::new(2).summarize(&items);
        // "doordash" and "revenue" dominate the pool; the two longest
        // DoorDash/revenue sentences win and keep their input order.
        assert_eq!(
            out,
            "DoorDash revenue growth tops forecasts. Analysts lift DoorDash revenue target."
        );
    }

    #[test]
    fn ties_go_to_earlier_sentences() {
        let items = vec![item("alpha", ""), item("bravo", ""), item("charlie", "")];
        assert_eq!(Summarizer::new(2).summarize(&items), "alpha. bravo.");
    }

    #[test]
    fn duplicate_sentences_are_pooled_once() {
        let items = vec![item("Same headline", "Same headline.")];
        assert_eq!(Summarizer::new(3).summarize(&items), "Same headline.");
    }
}
