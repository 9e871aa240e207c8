//! Tokenizing and sentence splitting shared by the summarizer and the sentiment scorer.

use once_cell::sync::Lazy;
use std::collections::HashSet;

static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    "a an the and or but if while of to in on for with without by as is are was were be been \
     this that these those from at it its into over under about after before between not no \
     you your we our they their i me my us he she him her them his hers ours theirs \
     has have had will would can could says said new inc corp"
        .split_whitespace()
        .collect()
});

pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Lower-cased word tokens: runs of alphanumerics and apostrophes, with
/// leading/trailing apostrophes removed.
pub fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .map(|t| t.trim_matches(|c| c == '\'' || c == '\u{2019}'))
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
}

/// Terms that carry content: tokens of 3+ chars that are not stopwords.
pub fn content_terms(s: &str) -> impl Iterator<Item = String> + '_ {
    tokenize(s).filter(|t| t.chars().count() > 2 && !is_stopword(t))
}

/// Split on `.`, `!` or `?` followed by whitespace. Terminators stay with their sentence.
pub fn split_sentences(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = s.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(j, next)) = chars.peek() {
                if next.is_whitespace() {
                    push_trimmed(&mut out, &s[start..j]);
                    start = j;
                }
            }
        }
    }
    push_trimmed(&mut out, &s[start..]);
    out
}

fn push_trimmed(out: &mut Vec<String>, s: &str) {
    let t = s.trim();
    if !t.is_empty() {
        out.push(t.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_keeps_contractions() {
        let toks: Vec<_> = tokenize("DoorDash's Q3 BEATS, 'quoted' won't").collect();
        assert_eq!(toks, vec!["doordash's", "q3", "beats", "quoted", "won't"]);
    }

    #[test]
    fn content_terms_drop_stopwords_and_short_tokens() {
        let terms: Vec<_> = content_terms("The stock is up on a strong quarter").collect();
        assert_eq!(terms, vec!["stock", "strong", "quarter"]);
    }

    #[test]
    fn sentences_split_on_terminal_punctuation() {
        let s = split_sentences("Shares rose 3.5% today. Analysts cheered!  Why? Because.");
        assert_eq!(
            s,
            vec!["Shares rose 3.5% today.", "Analysts cheered!", "Why?", "Because."]
        );
    }

    #[test]
    fn no_terminator_is_one_sentence() {
        assert_eq!(split_sentences("  just a headline  "), vec!["just a headline"]);
        assert!(split_sentences("   ").is_empty());
    }
}
