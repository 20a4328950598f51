mod config;
mod util;
mod paths;
mod lines;
mod ndjson;
mod progress;
mod concurrency;
mod stitch;

mod record;
mod select;
mod ids;
mod annotate;

pub mod patterns;
mod rules;
mod extractor;

pub use crate::config::{AnnotateOptions, OutputFormat, Sources};
pub use crate::annotate::{annotate_record, AnnotateStats, Annotator, FAILED_LOG_NAME};

// the extraction engine
pub use crate::extractor::{AgeCue, Demographics, DemographicsExtractor, ExtractOptions, Gender};
pub use crate::rules::{Guard, Rule, RuleMatch, RuleSet};

// record helpers: kinds, text, flattening
pub use crate::record::{demographic_text, is_comment_record, normalize_author, record_kind, RecordKind};
pub use crate::select::{apply_human_timestamps, flatten_record, AttributeSelection, DEFAULT_EXCLUDED_ATTRIBUTES};

// id helpers
pub use crate::ids::{link_ids_with_prefix, link_ids_without_prefix, read_ids, strip_fullname_prefix, IdFilter};

// input discovery and NDJSON helpers
pub use crate::paths::{discover_inputs, Compression, InputFile};
pub use crate::ndjson::{NdjsonReader, NdjsonWriter};
pub use crate::stitch::tsv_cell;

pub use crate::util::init_tracing_once;
