//! Output stitching: merge per-file JSONL parts into the final JSONL, JSON array
//! or TSV output. Every writer goes to a temp file that replaces the output at the end.

use crate::ndjson::{NdjsonReader, NdjsonWriter};
use crate::util::{create_with_backoff, replace_file_atomic_backoff};
use ahash::AHashSet;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Columns that always close a TSV row.
pub const TRAILING_COLUMNS: [&str; 2] = ["gender", "age"];

pub fn part_name(index: usize) -> String {
    format!("part_{index:06}.jsonl")
}

fn tmp_path_for(out_path: &Path) -> PathBuf {
    let mut name = out_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    out_path.with_file_name(name)
}

fn for_each_part_line(
    parts: &[PathBuf],
    read_buf: usize,
    mut f: impl FnMut(&str) -> Result<()>,
) -> Result<()> {
    let mut buf = String::new();
    for p in parts {
        let mut r = NdjsonReader::open(p, read_buf).with_context(|| format!("open part {}", p.display()))?;
        while r.read_line(&mut buf)? > 0 {
            if buf.is_empty() { continue; }
            f(&buf)?;
        }
    }
    Ok(())
}

pub fn stitch_jsonl(parts: &[PathBuf], out_path: &Path, read_buf: usize, write_buf: usize) -> Result<()> {
    let tmp = tmp_path_for(out_path);
    let mut w = NdjsonWriter::create(&tmp, write_buf).with_context(|| format!("create {}", tmp.display()))?;
    for_each_part_line(parts, read_buf, |line| Ok(w.write_line(line)?))?;
    w.finish_atomic(out_path)
}

pub fn stitch_json_array(
    parts: &[PathBuf],
    out_path: &Path,
    pretty: bool,
    read_buf: usize,
    write_buf: usize,
) -> Result<()> {
    let tmp = tmp_path_for(out_path);
    let f = create_with_backoff(&tmp, 16, 50).with_context(|| format!("create {}", tmp.display()))?;
    let mut out = BufWriter::with_capacity(write_buf, f);
    let mut first = true;

    out.write_all(if pretty { b"[\n" } else { b"[" })?;
    for_each_part_line(parts, read_buf, |line| {
        if !first {
            out.write_all(if pretty { b",\n" } else { b"," })?;
        }
        first = false;
        if pretty {
            let val: Value = serde_json::from_str(line)?;
            serde_json::to_writer_pretty(&mut out, &val)?;
        } else {
            out.write_all(line.as_bytes())?;
        }
        Ok(())
    })?;
    out.write_all(if pretty { b"\n]" } else { b"]" })?;
    out.flush()?;
    drop(out);
    replace_file_atomic_backoff(&tmp, out_path)
}

/// Two passes over the parts: collect the column union in first-seen order,
/// then write one row per record.
pub fn stitch_tsv(parts: &[PathBuf], out_path: &Path, read_buf: usize, write_buf: usize) -> Result<()> {
    let mut columns: Vec<String> = Vec::new();
    let mut seen: AHashSet<String> = TRAILING_COLUMNS.iter().map(|s| s.to_string()).collect();
    for_each_part_line(parts, read_buf, |line| {
        let row: Map<String, Value> = serde_json::from_str(line)?;
        for k in row.keys() {
            if seen.insert(k.clone()) {
                columns.push(k.clone());
            }
        }
        Ok(())
    })?;
    columns.extend(TRAILING_COLUMNS.iter().map(|s| s.to_string()));

    let tmp = tmp_path_for(out_path);
    let f = create_with_backoff(&tmp, 16, 50).with_context(|| format!("create {}", tmp.display()))?;
    let mut out = BufWriter::with_capacity(write_buf, f);
    writeln!(out, "{}", columns.join("\t"))?;
    for_each_part_line(parts, read_buf, |line| {
        let row: Map<String, Value> = serde_json::from_str(line)?;
        let cells: Vec<String> = columns.iter().map(|c| tsv_cell(row.get(c))).collect();
        writeln!(out, "{}", cells.join("\t"))?;
        Ok(())
    })?;
    out.flush()?;
    drop(out);
    replace_file_atomic_backoff(&tmp, out_path)
}

/// Missing and null become empty cells; tabs and newlines inside text become spaces.
pub fn tsv_cell(v: Option<&Value>) -> String {
    let raw = match v {
        None | Some(Value::Null) => return String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    raw.replace(['\t', '\n', '\r'], " ")
}
