// tests/sources_config.rs
use clap::Parser;
use std::{env, fs};
use ticker_news_digest::config::{
    load_sources_from, render_sources, resolve_sources, ENV_SOURCES_PATH,
};
use ticker_news_digest::{Cli, DedupScope, DigestError, RunConfig};

#[test]
fn parse_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("sources.toml");
    fs::write(
        &p_toml,
        r#"
[[sources]]
name = " Yahoo Finance "
url = "https://finance.yahoo.com/rss/headline?s={ticker}"

[[sources]]
name = "SEC"
url = "https://www.sec.gov/cgi-bin/browse-edgar?action=getcompany&CIK={ticker}&output=atom"
"#,
    )
    .unwrap();
    let v = load_sources_from(&p_toml).unwrap();
    assert_eq!(v.len(), 2);
    assert_eq!(v[0].name, "Yahoo Finance");

    let p_json = dir.path().join("sources.json");
    fs::write(&p_json, r#"[{"name":"Google News","url":" https://news.google.com/rss/search?q={query} "}]"#)
        .unwrap();
    let vj = load_sources_from(&p_json).unwrap();
    assert_eq!(vj[0].url, "https://news.google.com/rss/search?q={query}");

    let p_bad = dir.path().join("bad.json");
    fs::write(&p_bad, r#"[{"name":"","url":"https://x"}]"#).unwrap();
    assert!(load_sources_from(&p_bad).is_err());
}

#[test]
fn shipped_source_list_loads_and_renders() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("config/sources.toml");
    let sources = load_sources_from(&path).unwrap();
    let names: Vec<_> = sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        ["Yahoo Finance", "Google News", "PR Newswire", "Business Wire", "SEC Filings"]
    );

    let rendered = render_sources(&sources, "DASH", "DoorDash stock").unwrap();
    assert_eq!(rendered[0].url, "https://finance.yahoo.com/rss/headline?s=DASH");
    assert!(rendered[4].url.ends_with("output=atom"));
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_SOURCES_PATH);

    // 1) nothing configured: built-in feeds
    let v = resolve_sources(None).unwrap();
    let names: Vec<_> = v.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Yahoo Finance", "Google News"]);

    // 2) ./config/sources.json
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(
        cfg_dir.join("sources.json"),
        r#"{"sources":[{"name":"Json","url":"https://j/{ticker}"}]}"#,
    )
    .unwrap();
    assert_eq!(resolve_sources(None).unwrap()[0].name, "Json");

    // 3) ./config/sources.toml wins over json
    fs::write(
        cfg_dir.join("sources.toml"),
        "[[sources]]\nname = \"Toml\"\nurl = \"https://t/{ticker}\"\n",
    )
    .unwrap();
    assert_eq!(resolve_sources(None).unwrap()[0].name, "Toml");

    // 4) env wins over fallbacks
    let p_env = tmp.path().join("env_sources.json");
    fs::write(&p_env, r#"[{"name":"Env","url":"https://e/{query}"}]"#).unwrap();
    env::set_var(ENV_SOURCES_PATH, p_env.display().to_string());
    assert_eq!(resolve_sources(None).unwrap()[0].name, "Env");

    // 5) explicit path wins over env
    let p_cli = tmp.path().join("cli.toml");
    fs::write(&p_cli, "[[sources]]\nname = \"Cli\"\nurl = \"https://c/\"\n").unwrap();
    assert_eq!(resolve_sources(Some(&p_cli)).unwrap()[0].name, "Cli");

    // 6) env naming a missing file is an error, not a silent fallback
    env::set_var(ENV_SOURCES_PATH, tmp.path().join("gone.json").display().to_string());
    assert!(matches!(resolve_sources(None), Err(DigestError::Config(_))));
    env::remove_var(ENV_SOURCES_PATH);

    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn cli_builds_run_config_with_rendered_urls() {
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_SOURCES_PATH);

    let cli = Cli::try_parse_from([
        "ticker-news-digest",
        "--ticker",
        " dash ",
        "--query",
        "DoorDash stock",
        "--date",
        "2024-05-07",
        "--no-site",
    ])
    .unwrap();
    let cfg = RunConfig::from_cli(cli).unwrap();
    assert_eq!(cfg.ticker, "DASH");
    assert_eq!(cfg.date.to_string(), "2024-05-07");
    assert!(cfg.site.is_none());
    assert_eq!(cfg.dedup_scope, DedupScope::Store);
    assert_eq!(cfg.summary_sentences, 3);
    assert_eq!(
        cfg.sources[0].url,
        "https://finance.yahoo.com/rss/headline?s=DASH"
    );
    assert!(cfg.sources[1].url.contains("q=DoorDash%20stock"));

    env::set_current_dir(&old).unwrap();
}

#[serial_test::serial]
#[test]
fn unknown_placeholder_is_a_config_error() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("sources.toml");
    fs::write(&p, "[[sources]]\nname = \"X\"\nurl = \"https://x/{symbol}\"\n").unwrap();

    let cli = Cli::try_parse_from([
        "ticker-news-digest",
        "--ticker",
        "DASH",
        "--sources",
        p.to_str().unwrap(),
    ])
    .unwrap();
    let err = RunConfig::from_cli(cli).unwrap_err();
    assert!(err.to_string().contains("{symbol}"));
}

#[test]
fn blank_ticker_is_rejected() {
    let cli = Cli::try_parse_from(["ticker-news-digest", "--ticker", "  "]).unwrap();
    assert!(matches!(RunConfig::from_cli(cli), Err(DigestError::Config(_))));
}
