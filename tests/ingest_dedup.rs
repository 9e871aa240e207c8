// tests/ingest_dedup.rs
use std::collections::HashSet;
use ticker_news_digest::ingest::feed::parse_feed;
use ticker_news_digest::ingest::normalize_dedup;
use ticker_news_digest::RawItem;

fn raw(source: &str, title: &str, link: &str) -> RawItem {
    RawItem {
        source: source.into(),
        title: title.into(),
        link: link.into(),
        summary: String::new(),
        published: None,
    }
}

fn fixture(name: &str) -> String {
    let path = format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"));
    std::fs::read_to_string(path).expect("fixture")
}

#[test]
fn first_occurrence_wins() {
    let evs = vec![
        raw("S1", "A", "https://a/x"),
        raw("S2", "A-dup", "https://a/x"),
        raw("S2", "B", "https://b/y"),
    ];
    let out = normalize_dedup(evs, |_| false);
    assert_eq!(out.items.len(), 2);
    assert_eq!(out.duplicates, 1);
    assert_eq!(out.items[0].link, "https://a/x");
    assert_eq!(out.items[0].title, "A");
    assert_eq!(out.items[0].source, "S1");
    assert_eq!(out.items[1].link, "https://b/y");
    assert_eq!(out.items[1].title, "B");
}

#[test]
fn linkless_items_dedup_on_title_case_insensitively() {
    let evs = vec![raw("S1", "Breaking News", ""), raw("S2", "breaking  NEWS", "")];
    let out = normalize_dedup(evs, |_| false);
    assert_eq!(out.items.len(), 1);
    assert_eq!(out.items[0].source, "S1");
}

#[test]
fn keys_are_unique_across_real_feeds_and_order_is_kept() {
    let mut raw_items = parse_feed(&fixture("yahoo_rss.xml"), "Yahoo Finance").unwrap();
    raw_items.extend(parse_feed(&fixture("google_rss.xml"), "Google News").unwrap());
    assert_eq!(raw_items.len(), 5);

    let out = normalize_dedup(raw_items, |_| false);
    // Google's first entry is Yahoo's first story with an upper-cased host.
    assert_eq!(out.items.len(), 4);
    assert_eq!(out.duplicates, 1);

    let keys: HashSet<_> = out.items.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys.len(), out.items.len());

    let sources: Vec<_> = out.items.iter().map(|i| i.source.as_str()).collect();
    assert_eq!(
        sources,
        vec!["Yahoo Finance", "Yahoo Finance", "Yahoo Finance", "Google News"]
    );
}
