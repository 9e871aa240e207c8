//! # Item Store
//! Append-only audit log of canonical items, one JSON object per line.
//!
//! The log is an arena (`Vec` in insertion order) plus an index from identity
//! key to arena slot. Records are scoped by ticker: a store opened for `DASH`
//! only sees and dedups against `DASH` records, while records of other tickers
//! in the same file are carried through untouched.
//!
//! `append` is one transactional write: the full log is written to a temp
//! file next to the target and renamed over it, so a crash leaves either the
//! old log or the new one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::PathBuf;

use crate::error::{DigestError, Result};
use crate::ingest::types::CanonicalItem;

pub const DEFAULT_STORE_PATH: &str = "data/news.jsonl";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredItem {
    ticker: String,
    fetched_at: String,
    #[serde(flatten)]
    item: CanonicalItem,
}

#[derive(Debug)]
pub struct ItemStore {
    path: PathBuf,
    ticker: String,
    log: Vec<StoredItem>,
    index: HashMap<String, usize>,
}

impl ItemStore {
    /// Open (or start) the log at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>, ticker: &str) -> Result<Self> {
        let path = path.into();
        let content = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(source) => return Err(DigestError::Store { path, source }),
        };

        let mut log = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let rec: StoredItem =
                serde_json::from_str(line).map_err(|source| DigestError::StoreCorrupt {
                    path: path.clone(),
                    line: i + 1,
                    source,
                })?;
            log.push(rec);
        }

        let mut store = Self {
            path,
            ticker: ticker.to_string(),
            log: Vec::new(),
            index: HashMap::new(),
        };
        for rec in log {
            store.push(rec);
        }
        tracing::debug!(
            path = %store.path.display(),
            records = store.log.len(),
            ticker_records = store.index.len(),
            "store opened"
        );
        Ok(store)
    }

    /// True if this ticker ever persisted `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// This ticker's items in insertion order.
    pub fn all(&self) -> Vec<&CanonicalItem> {
        self.log
            .iter()
            .filter(|r| r.ticker == self.ticker)
            .map(|r| &r.item)
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&CanonicalItem> {
        self.index.get(key).map(|&slot| &self.log[slot].item)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Persist items whose key is not stored yet; returns how many were new.
    /// Known keys (and repeats inside `items`) are skipped silently.
    pub fn append(&mut self, items: &[CanonicalItem]) -> Result<usize> {
        let fetched_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

        let mut fresh: Vec<StoredItem> = Vec::new();
        for it in items {
            if self.contains(&it.key) || fresh.iter().any(|r| r.item.key == it.key) {
                continue;
            }
            fresh.push(StoredItem {
                ticker: self.ticker.clone(),
                fetched_at: fetched_at.clone(),
                item: it.clone(),
            });
        }
        if fresh.is_empty() {
            return Ok(0);
        }

        self.write_log(self.log.iter().chain(fresh.iter()))
            .map_err(|source| DigestError::Store {
                path: self.path.clone(),
                source,
            })?;

        let n = fresh.len();
        for rec in fresh {
            self.push(rec);
        }
        tracing::info!(path = %self.path.display(), appended = n, "store updated");
        Ok(n)
    }

    fn push(&mut self, rec: StoredItem) {
        let slot = self.log.len();
        if rec.ticker == self.ticker {
            self.index.entry(rec.item.key.clone()).or_insert(slot);
        }
        self.log.push(rec);
    }

    fn write_log<'a>(&self, records: impl Iterator<Item = &'a StoredItem>) -> std::io::Result<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let tmp = tempfile::NamedTempFile::new_in(&dir)?;
        {
            let mut w = BufWriter::new(tmp.as_file());
            for rec in records {
                serde_json::to_writer(&mut w, rec)?;
                w.write_all(b"\n")?;
            }
            w.flush()?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}
