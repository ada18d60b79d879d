mod config;
mod date;
mod error;
mod record;

mod filters;
mod projector;
mod review;
mod plex;

mod reader;
mod writer;
mod progress;
mod concurrency;
mod util;
mod pipeline;

pub use crate::config::{ExportOptions, ReviewServiceConfig, DEFAULT_COMMUNITY_URL, DEFAULT_DISCOVER_URL};
pub use crate::date::{add_one_month, format_iso_date, parse_viewed_at, reference_now, DateCorrector};
pub use crate::error::ExportError;
pub use crate::record::{InputRecord, LetterboxdRow, NormalizedRecord, RunCounters, TraktRow};

pub use crate::filters::{parse_rating, InclusionFilter, Verdict};
pub use crate::projector::{normalize, project, round_rating};
pub use crate::pipeline::{ExportRun, PlexExport, RunSummary};

// Review enrichment seam plus the Plex-backed implementation.
pub use crate::review::{NoReviews, ReviewLookup, ReviewSource};
pub use crate::plex::{LookupError, PlexReviewClient};

//export lower-level pieces for callers (and tests) that drive a run step by step
pub use crate::record::REQUIRED_COLUMNS;
pub use crate::pipeline::{process_records, RunSettings};
pub use crate::plex::{pick_candidate, review_from_graphql, SearchMetadata};

// I/O building blocks, for callers that drive reading/writing themselves.
pub use crate::reader::{read_export, read_export_from};
pub use crate::writer::{staging_path, OutputWriters};
pub use crate::concurrency::map_ordered_limited;
pub use crate::util::{init_tracing_once, replace_file_atomic_backoff};
