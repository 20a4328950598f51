//! Line streaming over plain and zstd-compressed JSONL inputs, with optional
//! byte-based progress.

use crate::paths::{Compression, InputFile};
use crate::util::open_with_backoff;
use anyhow::{Context, Result};
use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use zstd::stream::read::Decoder;

fn warn_decode_skip(path: &Path, e: &anyhow::Error) {
    let abs = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    tracing::warn!(
        "skipping zstd file after decode error\n  path : {}\n  error: {:#}\n\
         note : records read before the error were kept; the rest of the file is skipped.",
        abs.display(),
        e
    );
}

/// A `Read` wrapper that counts on-disk bytes read.
struct CountingReader<R: Read> {
    inner: R,
    counter: Arc<AtomicU64>,
}
impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.counter.fetch_add(n as u64, Ordering::Relaxed);
        Ok(n)
    }
}

/// Stream `input` line by line. `on_line` receives the 1-based line number and the
/// line without its terminator; `on_progress` receives deltas of on-disk bytes read.
///
/// A zstd stream that fails to decode is logged and skipped (progress is advanced
/// by the file size); errors returned by `on_line` abort and propagate.
pub fn for_each_line(
    input: &InputFile,
    read_buf_bytes: usize,
    mut on_progress: impl FnMut(u64),
    mut on_line: impl FnMut(u64, &str) -> Result<()>,
) -> Result<()> {
    let counter = Arc::new(AtomicU64::new(0));
    let file = open_with_backoff(&input.path, 16, 50)
        .with_context(|| format!("open {}", input.path.display()))?;
    let cnt = CountingReader { inner: file, counter: counter.clone() };
    let cap = read_buf_bytes.max(8 * 1024);

    match input.compression {
        Compression::Plain => {
            let reader = BufReader::with_capacity(cap, cnt);
            drive(reader, &counter, &mut on_progress, &mut on_line).map_err(|e| e.into_inner())
        }
        Compression::Zstd => {
            let reader = match zstd_reader(cnt, cap) {
                Ok(r) => r,
                Err(e) => {
                    warn_decode_skip(&input.path, &e);
                    skip_progress(&input.path, &mut on_progress);
                    return Ok(());
                }
            };
            match drive(reader, &counter, &mut on_progress, &mut on_line) {
                Ok(()) => Ok(()),
                Err(LineError::Read(e)) => {
                    warn_decode_skip(&input.path, &e);
                    skip_progress(&input.path, &mut on_progress);
                    Ok(())
                }
                Err(LineError::Callback(e)) => Err(e),
            }
        }
    }
}

fn zstd_reader<R: Read>(inner: R, cap: usize) -> Result<BufReader<Decoder<'static, BufReader<R>>>> {
    let mut decoder = Decoder::new(inner)?;
    // Reddit dumps use long windows.
    decoder.window_log_max(31)?;
    Ok(BufReader::with_capacity(cap, decoder))
}

fn skip_progress(path: &Path, on_progress: &mut impl FnMut(u64)) {
    if let Ok(meta) = fs::metadata(path) {
        on_progress(meta.len());
    }
}

enum LineError {
    Read(anyhow::Error),
    Callback(anyhow::Error),
}

impl LineError {
    fn into_inner(self) -> anyhow::Error {
        match self {
            LineError::Read(e) | LineError::Callback(e) => e,
        }
    }
}

fn drive<R: BufRead>(
    mut reader: R,
    counter: &AtomicU64,
    on_progress: &mut impl FnMut(u64),
    on_line: &mut impl FnMut(u64, &str) -> Result<()>,
) -> std::result::Result<(), LineError> {
    let mut buf = String::with_capacity(16 * 1024);
    let mut last = 0u64;
    let mut line_no = 0u64;
    loop {
        buf.clear();
        let n = reader.read_line(&mut buf).map_err(|e| LineError::Read(e.into()))?;
        let cur = counter.load(Ordering::Relaxed);
        if cur > last {
            on_progress(cur - last);
            last = cur;
        }
        if n == 0 {
            break;
        }
        line_no += 1;
        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') { buf.pop(); }
        }
        if buf.trim().is_empty() {
            continue;
        }
        on_line(line_no, &buf).map_err(LineError::Callback)?;
    }
    Ok(())
}
