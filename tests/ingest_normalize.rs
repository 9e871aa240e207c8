// tests/ingest_normalize.rs
use ticker_news_digest::ingest::{canonicalize, normalize_text};
use ticker_news_digest::RawItem;

#[test]
fn empty_is_ok() {
    assert_eq!(normalize_text(""), "");
}

#[test]
fn strips_html_and_unescapes() {
    let s = "<p>Hello&nbsp;<b>world</b> &ldquo;ok&rdquo;</p>";
    let n = normalize_text(s);
    assert_eq!(n, r#"Hello world "ok""#);
}

#[test]
fn folds_whitespace_and_nbsp() {
    let s = "A\u{00A0}\n\tB   C";
    let n = normalize_text(s);
    assert_eq!(n, "A B C");
}

#[test]
fn comparison_signs_are_not_tags() {
    assert_eq!(normalize_text("EPS < 1 and revenue > 2"), "EPS < 1 and revenue > 2");
}

#[test]
fn length_cap_applies() {
    let s = "x".repeat(2_000);
    let n = normalize_text(&s);
    assert!(n.chars().count() <= 1_500);
}

#[test]
fn canonicalize_trims_every_field() {
    let raw = RawItem {
        source: " Yahoo Finance ".into(),
        title: "  DoorDash\n beats  ".into(),
        link: "  https://a/x  ".into(),
        summary: " <p>Body</p> ".into(),
        published: Some("  ".into()),
    };
    let it = canonicalize(raw).expect("kept");
    assert_eq!(it.source, "Yahoo Finance");
    assert_eq!(it.title, "DoorDash beats");
    assert_eq!(it.link, "https://a/x");
    assert_eq!(it.summary, "Body");
    assert_eq!(it.published, None);
    assert_eq!(it.key, "https://a/x");
}
