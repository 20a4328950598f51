#![allow(dead_code)]

use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Write a compressed `.zst` file containing the provided JSONL lines.
pub fn write_zst_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let f = File::create(path).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    for l in lines {
        writeln!(&mut enc, "{}", l).unwrap();
    }
    enc.finish().unwrap();
}

/// Write a plain JSONL file, one string per line.
pub fn write_plain_lines(path: &Path, lines: &[String]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut f = File::create(path).unwrap();
    for l in lines {
        writeln!(&mut f, "{}", l).unwrap();
    }
}

/// Read a JSONL file into a vector of `serde_json::Value` (skips empty lines).
pub fn read_jsonl_values(path: &Path) -> Vec<Value> {
    read_lines(path).iter().map(|s| serde_json::from_str(s).unwrap()).collect()
}

/// Read a text file line-by-line into strings (skips empty lines).
pub fn read_lines(path: &Path) -> Vec<String> {
    let f = File::open(path).unwrap();
    let r = BufReader::new(f);
    r.lines().map(|l| l.unwrap()).filter(|s| !s.is_empty()).collect()
}

pub fn by_id<'a>(rows: &'a [Value], id: &str) -> &'a Value {
    rows.iter()
        .find(|v| v.get("id").and_then(|x| x.as_str()) == Some(id))
        .unwrap_or_else(|| panic!("no row with id {id}"))
}

/// Build a tiny dump under `<base>/dump` with:
/// - `submissions/RS_2006-01.jsonl` (plain):
///     s1 by "alice": selftext "I'm a 23f, live in the city" (F, 23)
///     a malformed line (line 2)
///     s2 by "[deleted]": the only claim sits inside quotes (nothing)
/// - `comments/RC_2006-01.zst`:
///     c1: "23M here, what do you guys think" (M, 23)
///     c2: "I am 30 years old and scared" (age 30 only)
///     c3: "nothing to see" (nothing)
///
/// Returns the base dir; input lives at `base/dump`, outputs go under `base/out`.
pub fn make_dump_basic() -> PathBuf {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.into_path();
    let dump = base.join("dump");

    let rs = dump.join("submissions").join("RS_2006-01.jsonl");
    let rs_lines = vec![
        json!({
            "author":"alice", "author_fullname":"t2_alice", "created_utc":1136073600,
            "id":"s1", "num_comments":1, "score":12, "subreddit":"relationships",
            "title":"Advice needed", "selftext":"I'm a 23f, live in the city",
            "all_awardings":[], "media": {"type":"none", "oembed": {"width": 600}},
            "link_flair_text": null
        }).to_string(),
        "{\"id\": \"broken\", ".to_string(),
        json!({
            "author":"[deleted]", "created_utc":1136073700,
            "id":"s2", "num_comments":1, "score":3, "subreddit":"relationships",
            "title":"Question", "selftext":"He said \"I'm a 40m\" to her",
            "all_awardings":[]
        }).to_string(),
    ];
    write_plain_lines(&rs, &rs_lines);

    let rc = dump.join("comments").join("RC_2006-01.zst");
    let rc_lines = vec![
        json!({
            "author":"bob", "author_fullname":"t2_bob", "body":"23M here, what do you guys think",
            "id":"c1", "link_id":"t3_s1", "parent_id":"t3_s1", "score":4,
            "subreddit":"relationships", "created_utc":1136074600
        }).to_string(),
        json!({
            "author":"carol", "body":"I am 30 years old and scared",
            "id":"c2", "link_id":"t3_s1", "parent_id":"t1_c1", "score":2,
            "subreddit":"relationships", "created_utc":1136074700
        }).to_string(),
        json!({
            "author":"dave", "body":"nothing to see",
            "id":"c3", "link_id":"t3_s2", "parent_id":"t3_s2", "score":1,
            "subreddit":"relationships", "created_utc":1136074800
        }).to_string(),
    ];
    write_zst_lines(&rc, &rc_lines);

    base
}
