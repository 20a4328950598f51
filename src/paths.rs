//! Input discovery: a single file, or every JSON / JSONL / zstd file under a directory.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    Plain, // .jsonl / .ndjson / .json
    Zstd,  // .zst
}

#[derive(Clone, Debug)]
pub struct InputFile {
    pub path: PathBuf,
    pub compression: Compression,
}

impl InputFile {
    /// Classify by extension; `None` for files that are not record dumps.
    pub fn classify(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        let compression = match ext.as_str() {
            "zst" => Compression::Zstd,
            "jsonl" | "ndjson" | "json" => Compression::Plain,
            _ => return None,
        };
        Some(Self { path: path.to_path_buf(), compression })
    }
}

/// Discover inputs in sorted path order. A file path is taken as-is when its
/// extension is recognised; a directory is walked recursively.
pub fn discover_inputs(root: &Path) -> Result<Vec<InputFile>> {
    if !root.exists() {
        bail!("input {} does not exist", root.display());
    }
    if root.is_file() {
        return match InputFile::classify(root) {
            Some(f) => Ok(vec![f]),
            None => bail!("unsupported input file {}", root.display()),
        };
    }

    let mut files: Vec<InputFile> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| match e {
            Ok(ent) => Some(ent),
            Err(err) => {
                tracing::warn!("skipping unreadable entry under {}: {}", root.display(), err);
                None
            }
        })
        .filter(|ent| ent.file_type().is_file())
        .filter_map(|ent| InputFile::classify(ent.path()))
        .collect();
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}
