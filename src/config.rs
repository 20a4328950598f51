use crate::extractor::ExtractOptions;
use crate::select::AttributeSelection;
use std::path::{Path, PathBuf};

/// Record kind toggle (comments, submissions, both).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sources {
    Comments,
    Submissions,
    Both,
}

/// Shape of the final annotated output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Jsonl,
    JsonArray { pretty: bool },
    /// Header is the union of all columns; `gender` and `age` come last.
    Tsv,
}

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct AnnotateOptions {
    pub sources: Sources,
    pub selection: AttributeSelection,
    pub ids: Option<Vec<String>>,     // bare ids (no "t3_"/"t1_" prefix)
    pub extract: ExtractOptions,
    pub only_with_demographics: bool, // drop records where neither gender nor age was found
    pub format: OutputFormat,
    pub parallelism: Option<usize>,   // Some(N) to set rayon threads, None to use default
    pub work_dir: Option<PathBuf>,    // if None, create next to the output
    pub file_concurrency: usize,      // limit number of input files processed concurrently
    pub progress: bool,
    pub progress_label: Option<String>,

    // IO tuning
    pub read_buffer_bytes: usize,
    pub write_buffer_bytes: usize,

    // output formatting
    pub human_readable_timestamps: bool,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            sources: Sources::Both,
            selection: AttributeSelection::All,
            ids: None,
            extract: ExtractOptions::default(),
            only_with_demographics: false,
            format: OutputFormat::Jsonl,
            parallelism: None,
            work_dir: None,
            file_concurrency: 1,
            progress: true,
            progress_label: None,

            read_buffer_bytes: 256 * 1024,
            write_buffer_bytes: 256 * 1024,

            human_readable_timestamps: false,
        }
    }
}

impl AnnotateOptions {
    pub fn with_sources(mut self, sources: Sources) -> Self {
        self.sources = sources;
        self
    }
    pub fn with_selection(mut self, selection: AttributeSelection) -> Self {
        self.selection = selection;
        self
    }
    pub fn with_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ids = Some(
            ids.into_iter()
                .map(|s| crate::ids::strip_fullname_prefix(s.as_ref().trim()).to_string())
                .collect(),
        );
        self
    }
    pub fn with_strip_quotes(mut self, yes: bool) -> Self {
        self.extract.strip_quotes = yes;
        self
    }
    pub fn with_only_with_demographics(mut self, yes: bool) -> Self {
        self.only_with_demographics = yes;
        self
    }
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }
    pub fn with_work_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.work_dir = Some(dir.as_ref().to_path_buf());
        self
    }
    pub fn with_file_concurrency(mut self, n: usize) -> Self {
        self.file_concurrency = n.max(1);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
    pub fn with_io_buffers(mut self, read_bytes: usize, write_bytes: usize) -> Self {
        self.read_buffer_bytes = read_bytes.max(8 * 1024);
        self.write_buffer_bytes = write_bytes.max(8 * 1024);
        self
    }
    pub fn with_human_timestamps(mut self, yes: bool) -> Self {
        self.human_readable_timestamps = yes;
        self
    }
}
