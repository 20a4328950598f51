//! Reddit id helpers: fullname prefixes, id lists, `link_id` collection.

use crate::ndjson::NdjsonReader;
use ahash::AHashSet;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// `t3_abc` -> `abc`. Ids without a `t<digit>_` kind prefix are returned unchanged.
pub fn strip_fullname_prefix(id: &str) -> &str {
    let b = id.as_bytes();
    if b.len() > 3 && b[0] == b't' && b[1].is_ascii_digit() && b[2] == b'_' {
        &id[3..]
    } else {
        id
    }
}

/// Distinct values in first-seen order.
fn dedup_in_order(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = AHashSet::new();
    items.into_iter().filter(|s| seen.insert(s.clone())).collect()
}

/// One id per line; blank lines and `#` comments are skipped, prefixes stripped,
/// duplicates dropped (first occurrence wins).
pub fn read_ids(path: &Path) -> Result<Vec<String>> {
    let mut r = NdjsonReader::open(path, 64 * 1024)
        .with_context(|| format!("open id list {}", path.display()))?;
    let mut ids = Vec::new();
    let mut buf = String::new();
    while r.read_line(&mut buf)? > 0 {
        let line = buf.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        ids.push(strip_fullname_prefix(line).to_string());
    }
    Ok(dedup_in_order(ids))
}

fn link_id_of(v: &Value) -> Option<String> {
    v.get("link_id").and_then(Value::as_str).map(str::to_string)
}

/// Distinct `link_id` values of a comment dump. The file may hold one JSON record per
/// line, or a single JSON array (on one line or spread over many).
pub fn link_ids_with_prefix(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let trimmed = raw.trim_start();

    let ids: Vec<String> = if trimmed.starts_with('[') {
        let arr: Vec<Value> = serde_json::from_str(trimmed)
            .with_context(|| format!("parse JSON array in {}", path.display()))?;
        arr.iter().filter_map(link_id_of).collect()
    } else {
        let mut out = Vec::new();
        for (i, line) in raw.lines().enumerate() {
            if line.trim().is_empty() { continue; }
            match serde_json::from_str::<Value>(line) {
                Ok(v) => out.extend(link_id_of(&v)),
                Err(e) => tracing::warn!("{}:{}: skipping unparsable line: {}", path.display(), i + 1, e),
            }
        }
        out
    };
    tracing::debug!("collected {} link ids from {}", ids.len(), path.display());
    Ok(dedup_in_order(ids))
}

pub fn link_ids_without_prefix(path: &Path) -> Result<Vec<String>> {
    Ok(link_ids_with_prefix(path)?
        .into_iter()
        .map(|l| strip_fullname_prefix(&l).to_string())
        .collect())
}

/// Membership test over bare ids.
#[derive(Clone, Debug, Default)]
pub struct IdFilter {
    ids: AHashSet<String>,
}

impl IdFilter {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self { ids: ids.into_iter().map(|s| strip_fullname_prefix(s.as_ref()).to_string()).collect() }
    }

    pub fn len(&self) -> usize { self.ids.len() }
    pub fn is_empty(&self) -> bool { self.ids.is_empty() }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(strip_fullname_prefix(id))
    }
}
