#[path = "common/mod.rs"]
mod common;

use common::*;
use demographics::{Annotator, OutputFormat, Sources, FAILED_LOG_NAME};
use serde_json::{json, Value};
use std::fs;

/// Full run over a directory holding a plain and a zstd dump:
/// - every parsed record is written with `gender` and `age` columns
/// - the malformed line is counted and listed in the failed-records log
#[test]
fn annotates_directory_to_jsonl() {
    let base = make_dump_basic();
    let out = base.join("out").join("annotated.jsonl");

    let stats = Annotator::new()
        .progress(false)
        .run(&base.join("dump"), &out)
        .unwrap();

    assert_eq!(stats.files, 2);
    assert_eq!(stats.records, 5);
    assert_eq!(stats.written, 5);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.with_gender, 2);
    assert_eq!(stats.with_age, 3);

    let rows = read_jsonl_values(&out);
    assert_eq!(rows.len(), 5);

    let s1 = by_id(&rows, "s1");
    assert_eq!(s1["gender"], json!("F"));
    assert_eq!(s1["age"], json!("23"));
    assert_eq!(s1["author_name"], json!("alice"));
    assert_eq!(s1["media.oembed.width"], json!(600));
    assert!(s1.get("all_awardings").is_none());

    let s2 = by_id(&rows, "s2");
    assert_eq!(s2["gender"], Value::Null);
    assert_eq!(s2["age"], Value::Null);
    assert_eq!(s2["author_name"], json!("deleted"));

    let c1 = by_id(&rows, "c1");
    assert_eq!(c1["gender"], json!("M"));
    assert_eq!(c1["age"], json!("23"));

    let c2 = by_id(&rows, "c2");
    assert_eq!(c2["gender"], Value::Null);
    assert_eq!(c2["age"], json!("30"));

    let failed = read_lines(&base.join("out").join(FAILED_LOG_NAME));
    assert_eq!(failed.len(), 1);
    assert!(failed[0].contains("RS_2006-01.jsonl:2:"), "{}", failed[0]);

    assert!(!base.join("out").join(".demographics_work").join("parts").exists());
}

#[test]
fn sources_and_id_filter() {
    let base = make_dump_basic();
    let out = base.join("out").join("comments.jsonl");
    let stats = Annotator::new()
        .progress(false)
        .sources(Sources::Comments)
        .run(&base.join("dump"), &out)
        .unwrap();
    assert_eq!(stats.records, 5);
    assert_eq!(stats.written, 3);
    assert!(read_jsonl_values(&out).iter().all(|v| v.get("body").is_some()));

    let out = base.join("out").join("picked.jsonl");
    let stats = Annotator::new()
        .progress(false)
        .ids(["t3_s1", "c2"])
        .run(&base.join("dump"), &out)
        .unwrap();
    assert_eq!(stats.written, 2);
    let rows = read_jsonl_values(&out);
    let mut ids: Vec<&str> = rows.iter().map(|v| v["id"].as_str().unwrap()).collect();
    ids.sort();
    assert_eq!(ids, vec!["c2", "s1"]);
}

#[test]
fn only_records_with_demographics() {
    let base = make_dump_basic();
    let out = base.join("out").join("matches.jsonl");
    let stats = Annotator::new()
        .progress(false)
        .only_with_demographics(true)
        .file_concurrency(2)
        .run(&base.join("dump"), &out)
        .unwrap();
    assert_eq!(stats.written, 3);
    let rows = read_jsonl_values(&out);
    assert!(rows.iter().all(|v| !v["gender"].is_null() || !v["age"].is_null()));
}

#[test]
fn tsv_with_selected_attributes() {
    let base = make_dump_basic();
    let out = base.join("out").join("table.tsv");
    Annotator::new()
        .progress(false)
        .format(OutputFormat::Tsv)
        .select_attributes(["id", "author"])
        .run(&base.join("dump"), &out)
        .unwrap();

    let lines = read_lines(&out);
    assert_eq!(lines.len(), 6, "header + 5 rows");
    let header: Vec<&str> = lines[0].split('\t').collect();
    assert_eq!(header.len(), 6);
    assert_eq!(&header[4..], &["gender", "age"]);
    for col in ["id", "author", "author_name", "author_id"] {
        assert!(header.contains(&col), "missing column {col}");
    }

    let id_col = header.iter().position(|c| *c == "id").unwrap();
    let s1: Vec<&str> = lines[1..]
        .iter()
        .map(|l| l.split('\t').collect::<Vec<_>>())
        .find(|cells| cells[id_col] == "s1")
        .unwrap();
    assert_eq!(&s1[4..], &["F", "23"]);
}

#[test]
fn pretty_json_array_with_human_timestamps() {
    let base = make_dump_basic();
    let out = base.join("out").join("all.json");
    Annotator::new()
        .progress(false)
        .format(OutputFormat::JsonArray { pretty: true })
        .timestamps_human_readable(true)
        .run(&base.join("dump"), &out)
        .unwrap();

    let all: Vec<Value> = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(all.len(), 5);
    for v in &all {
        assert!(v["created_utc"].is_string(), "created_utc should be RFC3339: {v}");
    }
}

#[test]
fn single_file_input_and_quotes_kept() {
    let base = make_dump_basic();
    let input = base.join("dump").join("submissions").join("RS_2006-01.jsonl");
    let out = base.join("out").join("subs.jsonl");
    let stats = Annotator::new()
        .progress(false)
        .strip_quotes(false)
        .run(&input, &out)
        .unwrap();
    assert_eq!(stats.files, 1);
    assert_eq!(stats.records, 2);
    assert_eq!(stats.failed, 1);

    let rows = read_jsonl_values(&out);
    let s2 = by_id(&rows, "s2");
    assert_eq!(s2["gender"], json!("M"));
    assert_eq!(s2["age"], json!("40"));
}

#[test]
fn missing_input_is_an_error() {
    let base = make_dump_basic();
    let res = Annotator::new()
        .progress(false)
        .run(&base.join("nope"), &base.join("out").join("x.jsonl"));
    assert!(res.is_err());
}

#[test]
fn builder_options_are_clamped() {
    let a = Annotator::new().file_concurrency(0).io_buffers(10, 10).strip_quotes(false);
    let opts = a.options();
    assert_eq!(opts.file_concurrency, 1);
    assert_eq!(opts.read_buffer_bytes, 8 * 1024);
    assert_eq!(opts.write_buffer_bytes, 8 * 1024);
    assert!(!opts.extract.strip_quotes);
    assert_eq!(opts.format, OutputFormat::Jsonl);
}
