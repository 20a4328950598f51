//! Annotation pipeline: stream record dumps, flatten each record, add the
//! self-reported `gender` and `age` columns, and stitch the final output.

use crate::concurrency::for_each_limited;
use crate::config::{AnnotateOptions, OutputFormat, Sources};
use crate::extractor::{Demographics, DemographicsExtractor};
use crate::ids::IdFilter;
use crate::lines::for_each_line;
use crate::ndjson::NdjsonWriter;
use crate::paths::{discover_inputs, InputFile};
use crate::progress::{make_progress_bar_labeled, total_input_size};
use crate::record::{demographic_text, record_id, record_kind};
use crate::select::{apply_human_timestamps, flatten_record, AttributeSelection};
use crate::stitch::{part_name, stitch_json_array, stitch_jsonl, stitch_tsv};
use crate::util::{create_with_backoff, init_tracing_once, remove_with_backoff};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

pub const FAILED_LOG_NAME: &str = "failed_records.log";

/// Counters reported by `Annotator::run`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnnotateStats {
    pub files: u64,
    pub records: u64, // parsed records, before any filtering
    pub written: u64,
    pub with_gender: u64,
    pub with_age: u64,
    pub failed: u64, // lines that were not a JSON object
}

#[derive(Default)]
struct Counters {
    records: AtomicU64,
    written: AtomicU64,
    with_gender: AtomicU64,
    with_age: AtomicU64,
    failed: AtomicU64,
}

/// Flatten `record` per `selection` and append the `gender` and `age` columns.
pub fn annotate_record(
    extractor: &DemographicsExtractor,
    record: &Value,
    selection: &AttributeSelection,
    human_timestamps: bool,
) -> (Map<String, Value>, Demographics) {
    let mut row = flatten_record(record, selection);
    if human_timestamps {
        apply_human_timestamps(&mut row);
    }
    let demo = demographic_text(record).map(|t| extractor.extract(&t)).unwrap_or_default();
    let gender = demo.gender.map_or(Value::Null, |g| Value::String(g.as_str().to_string()));
    let age = demo.age.clone().map_or(Value::Null, Value::String);
    row.insert("gender".into(), gender);
    row.insert("age".into(), age);
    (row, demo)
}

/// Appends unparsable lines to `failed_records.log`, created on first failure.
struct FailedLog {
    path: PathBuf,
    w: Mutex<Option<BufWriter<File>>>,
}

impl FailedLog {
    fn new(path: PathBuf) -> Self {
        Self { path, w: Mutex::new(None) }
    }

    fn record(&self, file: &Path, line_no: u64, reason: &str) -> Result<()> {
        let mut guard = self.w.lock();
        if guard.is_none() {
            let f = create_with_backoff(&self.path, 16, 50)
                .with_context(|| format!("create {}", self.path.display()))?;
            *guard = Some(BufWriter::new(f));
        }
        if let Some(w) = guard.as_mut() {
            writeln!(w, "{}:{}: {}", file.display(), line_no, reason)?;
        }
        Ok(())
    }

    fn finish(self) -> Result<()> {
        if let Some(mut w) = self.w.into_inner() {
            w.flush().with_context(|| format!("flush {}", self.path.display()))?;
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct Annotator {
    pub(crate) opts: AnnotateOptions,
}

impl Annotator {
    pub fn new() -> Self {
        Self { opts: AnnotateOptions::default() }
    }

    pub fn with_options(opts: AnnotateOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &AnnotateOptions { &self.opts }

    // -------- Builder methods --------
    pub fn sources(mut self, sources: Sources) -> Self { self.opts = self.opts.with_sources(sources); self }
    pub fn selection(mut self, selection: AttributeSelection) -> Self { self.opts = self.opts.with_selection(selection); self }
    pub fn select_attributes<I, S>(self, names: I) -> Self where I: IntoIterator<Item = S>, S: Into<String> { self.selection(AttributeSelection::only(names)) }
    pub fn ids<I, S>(mut self, ids: I) -> Self where I: IntoIterator<Item = S>, S: AsRef<str> { self.opts = self.opts.with_ids(ids); self }
    pub fn strip_quotes(mut self, yes: bool) -> Self { self.opts = self.opts.with_strip_quotes(yes); self }
    pub fn only_with_demographics(mut self, yes: bool) -> Self { self.opts = self.opts.with_only_with_demographics(yes); self }
    pub fn format(mut self, format: OutputFormat) -> Self { self.opts = self.opts.with_format(format); self }
    pub fn parallelism(mut self, threads: usize) -> Self { self.opts = self.opts.with_parallelism(threads); self }
    pub fn work_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_work_dir(dir); self }
    pub fn file_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_file_concurrency(n); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn io_buffers(mut self, read_bytes: usize, write_bytes: usize) -> Self { self.opts = self.opts.with_io_buffers(read_bytes, write_bytes); self }
    pub fn timestamps_human_readable(mut self, yes: bool) -> Self { self.opts = self.opts.with_human_timestamps(yes); self }

    fn work_dir_for(&self, output: &Path) -> PathBuf {
        self.opts.work_dir.clone().unwrap_or_else(|| {
            output.parent().unwrap_or_else(|| Path::new(".")).join(".demographics_work")
        })
    }

    /// Annotate every record under `input` (a file or a directory) into `output`.
    /// Unparsable lines are counted and listed in `failed_records.log` next to `output`.
    pub fn run(self, input: &Path, output: &Path) -> Result<AnnotateStats> {
        init_tracing_once();
        if let Some(n) = self.opts.parallelism { if n > 0 { rayon::ThreadPoolBuilder::new().num_threads(n).build_global().ok(); } }

        let extractor = DemographicsExtractor::with_options(self.opts.extract)?;
        let work_dir = self.work_dir_for(output);
        let parts_dir = work_dir.join("parts");
        if parts_dir.exists() {
            fs::remove_dir_all(&parts_dir).with_context(|| format!("clear {}", parts_dir.display()))?;
        }
        fs::create_dir_all(&parts_dir).with_context(|| format!("create {}", parts_dir.display()))?;
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
            }
        }

        let failed_log_path = output.parent().unwrap_or_else(|| Path::new(".")).join(FAILED_LOG_NAME);
        remove_with_backoff(&failed_log_path, 16, 50)?;
        let files: Vec<InputFile> = discover_inputs(input)?
            .into_iter()
            .filter(|f| f.path != output && f.path != failed_log_path && !f.path.starts_with(&work_dir))
            .collect();

        if files.is_empty() {
            tracing::warn!("No input files found under {}.", input.display());
        } else {
            tracing::info!("Planned {} files for annotation.", files.len());
        }

        let id_filter = self.opts.ids.as_ref().map(IdFilter::new);
        if let Some(f) = &id_filter {
            tracing::info!("Restricting to {} ids.", f.len());
        }
        let counters = Counters::default();
        let failed_log = FailedLog::new(failed_log_path);

        let pb = if self.opts.progress {
            Some(make_progress_bar_labeled(total_input_size(&files), self.opts.progress_label.as_deref()))
        } else {
            None
        };

        for_each_limited(&files, self.opts.file_concurrency, |i, file| {
            let part = parts_dir.join(part_name(i));
            self.annotate_file(file, &part, &extractor, id_filter.as_ref(), &counters, &failed_log, pb.as_ref())
                .with_context(|| format!("annotating {}", file.path.display()))
        })?;
        if let Some(pb) = &pb {
            pb.finish_with_message("annotated");
        }
        failed_log.finish()?;

        let parts: Vec<PathBuf> = (0..files.len())
            .map(|i| parts_dir.join(part_name(i)))
            .filter(|p| p.exists())
            .collect();
        let (rb, wb) = (self.opts.read_buffer_bytes, self.opts.write_buffer_bytes);
        match self.opts.format {
            OutputFormat::Jsonl => stitch_jsonl(&parts, output, rb, wb)?,
            OutputFormat::JsonArray { pretty } => stitch_json_array(&parts, output, pretty, rb, wb)?,
            OutputFormat::Tsv => stitch_tsv(&parts, output, rb, wb)?,
        }
        if let Err(e) = fs::remove_dir_all(&parts_dir) {
            tracing::warn!("could not remove {}: {}", parts_dir.display(), e);
        }

        let stats = AnnotateStats {
            files: files.len() as u64,
            records: counters.records.load(Ordering::Relaxed),
            written: counters.written.load(Ordering::Relaxed),
            with_gender: counters.with_gender.load(Ordering::Relaxed),
            with_age: counters.with_age.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
        };
        tracing::info!(
            files = stats.files,
            records = stats.records,
            written = stats.written,
            with_gender = stats.with_gender,
            with_age = stats.with_age,
            failed = stats.failed,
            "annotation finished -> {}",
            output.display()
        );
        if stats.failed > 0 {
            tracing::warn!("{} unparsable lines; see {}", stats.failed, FAILED_LOG_NAME);
        }
        Ok(stats)
    }

    #[allow(clippy::too_many_arguments)]
    fn annotate_file(
        &self,
        file: &InputFile,
        part: &Path,
        extractor: &DemographicsExtractor,
        id_filter: Option<&IdFilter>,
        counters: &Counters,
        failed_log: &FailedLog,
        pb: Option<&indicatif::ProgressBar>,
    ) -> Result<()> {
        let mut w = NdjsonWriter::create(part, self.opts.write_buffer_bytes)
            .with_context(|| format!("create part {}", part.display()))?;

        for_each_line(
            file,
            self.opts.read_buffer_bytes,
            |delta| if let Some(pb) = pb { pb.inc(delta) },
            |line_no, line| {
                let v: Value = match serde_json::from_str(line) {
                    Ok(v @ Value::Object(_)) => v,
                    Ok(_) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        return failed_log.record(&file.path, line_no, "not a JSON object");
                    }
                    Err(e) => {
                        counters.failed.fetch_add(1, Ordering::Relaxed);
                        return failed_log.record(&file.path, line_no, &e.to_string());
                    }
                };
                counters.records.fetch_add(1, Ordering::Relaxed);

                if !record_kind(&v).wanted_by(self.opts.sources) { return Ok(()); }
                if let Some(filter) = id_filter {
                    match record_id(&v) {
                        Some(id) if filter.contains(id) => {}
                        _ => return Ok(()),
                    }
                }

                let (row, demo) = annotate_record(extractor, &v, &self.opts.selection, self.opts.human_readable_timestamps);
                if self.opts.only_with_demographics && demo.is_empty() { return Ok(()); }
                if demo.gender.is_some() { counters.with_gender.fetch_add(1, Ordering::Relaxed); }
                if demo.age.is_some() { counters.with_age.fetch_add(1, Ordering::Relaxed); }

                w.write_value(&row)?;
                counters.written.fetch_add(1, Ordering::Relaxed);
                Ok(())
            },
        )?;
        w.finish()
    }
}
