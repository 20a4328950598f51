//! Attribute selection and flattening of nested JSON records into flat rows.

use crate::record::normalize_author;
use serde_json::{Map, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Bulky attributes dropped under `AttributeSelection::All`. Naming one of them in
/// `Only` keeps it.
pub const DEFAULT_EXCLUDED_ATTRIBUTES: [&str; 12] = [
    "all_awardings",
    "awarders",
    "gildings",
    "media_embed",
    "secure_media",
    "secure_media_embed",
    "preview",
    "thumbnail_height",
    "thumbnail_width",
    "treatment_tags",
    "author_flair_richtext",
    "link_flair_richtext",
];

/// Which top-level attributes of a record go into its row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum AttributeSelection {
    /// Every attribute except `DEFAULT_EXCLUDED_ATTRIBUTES`.
    #[default]
    All,
    /// Exactly these attributes; an empty list selects nothing.
    Only(Vec<String>),
}

impl AttributeSelection {
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttributeSelection::Only(names.into_iter().map(Into::into).collect())
    }

    pub fn includes(&self, key: &str) -> bool {
        match self {
            AttributeSelection::All => !DEFAULT_EXCLUDED_ATTRIBUTES.contains(&key),
            AttributeSelection::Only(names) => names.iter().any(|n| n == key),
        }
    }
}

/// Flatten the selected attributes of `record` into one row.
/// Scalars are copied, nested objects become dotted keys (`media.type`), arrays
/// are stored as their JSON text. Selecting `author` also adds `author_name` and
/// `author_id`.
pub fn flatten_record(record: &Value, selection: &AttributeSelection) -> Map<String, Value> {
    let mut row = Map::new();
    let Some(obj) = record.as_object() else {
        return row;
    };
    for (k, v) in obj {
        if selection.includes(k) {
            flatten_into(&mut row, k, v);
        }
    }
    if selection.includes("author") {
        normalize_author(record, &mut row);
    }
    row
}

fn flatten_into(row: &mut Map<String, Value>, key: &str, v: &Value) {
    match v {
        Value::Object(inner) if !inner.is_empty() => {
            for (k, v) in inner {
                flatten_into(row, &format!("{key}.{k}"), v);
            }
        }
        Value::Object(_) => {
            row.insert(key.to_string(), Value::Null);
        }
        Value::Array(_) => {
            row.insert(key.to_string(), Value::String(v.to_string()));
        }
        scalar => {
            row.insert(key.to_string(), scalar.clone());
        }
    }
}

fn apply_human_timestamp_in_place(map: &mut Map<String, Value>, key: &str) {
    if let Some(v) = map.get_mut(key) {
        if let Some(n) = v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)) {
            if let Ok(dt) = OffsetDateTime::from_unix_timestamp(n) {
                if let Ok(s) = dt.format(&Rfc3339) {
                    *v = Value::String(s);
                }
            }
        }
    }
}

/// Render numeric `created_utc`, `retrieved_on` and `edited` as RFC3339 strings.
/// `edited` can be `false`; only numeric forms are converted.
pub fn apply_human_timestamps(row: &mut Map<String, Value>) {
    apply_human_timestamp_in_place(row, "created_utc");
    apply_human_timestamp_in_place(row, "retrieved_on");
    apply_human_timestamp_in_place(row, "edited");
}
