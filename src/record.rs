//! Record-level helpers: kind detection, demographic text, author normalisation.

use crate::config::Sources;
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Comment,
    Submission,
}

impl RecordKind {
    pub fn wanted_by(self, sources: Sources) -> bool {
        matches!(
            (self, sources),
            (_, Sources::Both)
                | (RecordKind::Comment, Sources::Comments)
                | (RecordKind::Submission, Sources::Submissions)
        )
    }
}

/// Heuristic: a record is a comment if it has a `body` and a `parent_id`.
pub fn is_comment_record(v: &Value) -> bool {
    v.get("body").is_some() && v.get("parent_id").is_some()
}

pub fn record_kind(v: &Value) -> RecordKind {
    if is_comment_record(v) { RecordKind::Comment } else { RecordKind::Submission }
}

/// Text mined for demographics: the body of a comment, or title and selftext of a
/// submission. `None` when the record carries no text at all.
pub fn demographic_text(v: &Value) -> Option<String> {
    let field = |k: &str| v.get(k).and_then(Value::as_str).filter(|s| !s.is_empty());
    match record_kind(v) {
        RecordKind::Comment => field("body").map(str::to_string),
        RecordKind::Submission => match (field("title"), field("selftext")) {
            (Some(t), Some(s)) => Some(format!("{t} {s}")),
            (Some(t), None) => Some(t.to_string()),
            (None, Some(s)) => Some(s.to_string()),
            (None, None) => None,
        },
    }
}

pub fn record_id(v: &Value) -> Option<&str> {
    v.get("id").and_then(Value::as_str)
}

fn is_pseudo_author(name: &str) -> bool {
    let n = name.trim();
    n.is_empty() || n.eq_ignore_ascii_case("[deleted]") || n.eq_ignore_ascii_case("[removed]")
}

/// Adds `author_name` and `author_id` to `row`. Missing, null, deleted and removed
/// authors are all reported as "deleted".
pub fn normalize_author(source: &Value, row: &mut Map<String, Value>) {
    let name = source.get("author").and_then(Value::as_str).filter(|a| !is_pseudo_author(a));
    match name {
        Some(name) => {
            row.insert("author_name".into(), Value::String(name.to_string()));
            let id = source
                .get("author_fullname")
                .and_then(Value::as_str)
                .map(|s| Value::String(s.to_string()))
                .unwrap_or(Value::Null);
            row.insert("author_id".into(), id);
        }
        None => {
            row.insert("author_name".into(), Value::String("deleted".into()));
            row.insert("author_id".into(), Value::String("deleted".into()));
        }
    }
}
