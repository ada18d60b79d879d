use crate::concurrency::map_ordered_limited;
use crate::config::{ExportOptions, ReviewServiceConfig};
use crate::date::{format_iso_date, reference_now, DateCorrector};
use crate::filters::{InclusionFilter, Verdict};
use crate::plex::PlexReviewClient;
use crate::progress::ProgressScope;
use crate::projector::{normalize, project};
use crate::reader::read_export;
use crate::record::{InputRecord, LetterboxdRow, NormalizedRecord, RunCounters, TraktRow};
use crate::review::{NoReviews, ReviewLookup, ReviewSource};
use crate::util::{create_with_backoff, init_tracing_once, replace_file_atomic_backoff};
use crate::writer::{staging_path, OutputWriters};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use time::PrimitiveDateTime;

/// Builder-style entry point for one export run.
#[derive(Clone)]
pub struct PlexExport {
    pub(crate) opts: ExportOptions,
    now: Option<PrimitiveDateTime>,
}

/// Evaluation knobs shared by every row of a run.
#[derive(Clone, Copy, Debug)]
pub struct RunSettings {
    pub filter: InclusionFilter,
    pub enrich: bool,
    pub lookup_concurrency: usize,
    pub progress: bool,
}

/// Accepted row pairs in input order, plus the counters for the run.
#[derive(Clone, Debug, Default)]
pub struct ExportRun {
    pub rows: Vec<(LetterboxdRow, TraktRow)>,
    pub counters: RunCounters,
}

/// Final report for a run.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    #[serde(flatten)]
    pub counters: RunCounters,
    pub max_days_old: u32,
    pub date_offset_fixed: bool,
    pub reviews_enabled: bool,
    pub reference_date: String,
    pub letterboxd_path: PathBuf,
    pub trakt_path: PathBuf,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counters;
        writeln!(f, "Process complete!")?;
        writeln!(f, "  {} rows processed, {} exported", c.processed, c.accepted)?;
        writeln!(f, "  {} rows skipped (no rating)", c.skipped_no_rating)?;
        writeln!(f, "  {} rows skipped (last watched more than {} days ago)", c.skipped_too_old, self.max_days_old)?;
        if self.reviews_enabled {
            writeln!(f, "  {} reviews found ({} lookups failed)", c.reviews_found, c.review_lookup_failures)?;
        }
        write!(
            f,
            "Check {} and {} for results.",
            self.letterboxd_path.display(),
            self.trakt_path.display()
        )
    }
}

impl Default for PlexExport {
    fn default() -> Self {
        Self::new()
    }
}

impl PlexExport {
    pub fn new() -> Self {
        Self { opts: ExportOptions::default(), now: None }
    }

    pub fn from_options(opts: ExportOptions) -> Self {
        Self { opts, now: None }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.opts
    }

    // -------- Builder methods --------
    pub fn input(mut self, path: impl AsRef<Path>) -> Self { self.opts = self.opts.with_input(path); self }
    pub fn letterboxd_out(mut self, path: impl AsRef<Path>) -> Self { self.opts = self.opts.with_letterboxd_out(path); self }
    pub fn trakt_out(mut self, path: impl AsRef<Path>) -> Self { self.opts = self.opts.with_trakt_out(path); self }
    pub fn summary_json(mut self, path: impl AsRef<Path>) -> Self { self.opts = self.opts.with_summary_json(path); self }
    pub fn max_days_old(mut self, days: u32) -> Self { self.opts = self.opts.with_max_days_old(days); self }
    pub fn fix_date_offset(mut self, yes: bool) -> Self { self.opts = self.opts.with_fix_date_offset(yes); self }
    pub fn fetch_reviews(mut self, yes: bool) -> Self { self.opts = self.opts.with_fetch_reviews(yes); self }
    pub fn review_service(mut self, cfg: ReviewServiceConfig) -> Self { self.opts = self.opts.with_review_service(cfg); self }
    pub fn lookup_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_lookup_concurrency(n); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn io_write_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_write_buffer(bytes); self }
    /// Pin the run's reference instant (defaults to the wall clock at run start).
    pub fn reference_time(mut self, now: PrimitiveDateTime) -> Self { self.now = Some(now); self }

    /// Run with the review source implied by the options: the Plex client when reviews
    /// are on and a token is configured, otherwise no lookups.
    pub fn run(self) -> Result<RunSummary> {
        init_tracing_once();
        let source = self.default_review_source();
        self.run_with(source.as_ref())
    }

    /// Run with an explicit review source (used only when `fetch_reviews` is on).
    pub fn run_with(self, source: &dyn ReviewSource) -> Result<RunSummary> {
        init_tracing_once();

        // Fatal input problems surface here, before any output file is opened.
        let records = read_export(&self.opts.input)
            .with_context(|| format!("reading {}", self.opts.input.display()))?;
        if records.is_empty() {
            tracing::warn!("Input {} has no data rows.", self.opts.input.display());
        } else {
            tracing::info!("Starting export of {} rows from {}", records.len(), self.opts.input.display());
        }

        let now = self.now.unwrap_or_else(reference_now);
        let settings = self.settings(now);
        let run = process_records(&records, &settings, source);

        self.write_outputs(&run)?;

        let summary = RunSummary {
            counters: run.counters,
            max_days_old: self.opts.max_days_old,
            date_offset_fixed: self.opts.fix_date_offset,
            reviews_enabled: self.opts.fetch_reviews,
            reference_date: format_iso_date(now.date()),
            letterboxd_path: self.opts.letterboxd_out.clone(),
            trakt_path: self.opts.trakt_out.clone(),
        };
        if let Some(path) = &self.opts.summary_json {
            write_summary_json(&summary, path)?;
        }
        if summary.counters.review_lookup_failures > 0 {
            tracing::warn!(
                failures = summary.counters.review_lookup_failures,
                "Some review lookups failed; those rows were exported without a review"
            );
        }
        Ok(summary)
    }

    fn settings(&self, now: PrimitiveDateTime) -> RunSettings {
        let corrector = DateCorrector::new(self.opts.fix_date_offset);
        RunSettings {
            filter: InclusionFilter::new(corrector, self.opts.max_days_old, now),
            enrich: self.opts.fetch_reviews,
            lookup_concurrency: self.opts.lookup_concurrency,
            progress: self.opts.progress,
        }
    }

    fn default_review_source(&self) -> Box<dyn ReviewSource> {
        if !self.opts.fetch_reviews {
            return Box::new(NoReviews);
        }
        if !self.opts.review_service.has_token() {
            tracing::warn!("Review lookup is enabled but no Plex token is configured; Review column will be empty");
            return Box::new(NoReviews);
        }
        match PlexReviewClient::new(self.opts.review_service.clone()) {
            Ok(client) => Box::new(client),
            Err(e) => {
                tracing::warn!(error = %e, "Could not build the Plex review client; continuing without reviews");
                Box::new(NoReviews)
            }
        }
    }

    fn write_outputs(&self, run: &ExportRun) -> Result<()> {
        let mut out = OutputWriters::create(
            &self.opts.letterboxd_out,
            &self.opts.trakt_out,
            self.opts.fetch_reviews,
            self.opts.write_buffer_bytes,
        )?;
        for (lb, trakt) in &run.rows {
            if let Err(e) = out.write_pair(lb, trakt) {
                if let Err(cleanup) = out.abandon() {
                    tracing::warn!(error = %cleanup, "Failed to remove staging files");
                }
                return Err(e);
            }
        }
        let rows = out.rows_written();
        let [lb_path, trakt_path] = out.finalize()?;
        tracing::info!(letterboxd = %lb_path.display(), trakt = %trakt_path.display(), rows, "Wrote import files");
        Ok(())
    }
}

/// Evaluate every record in order, enrich the accepted ones, and project them.
///
/// Counters have a single writer: the sequential evaluation pass and the aggregation
/// pass after lookups are collected back in input order.
pub fn process_records(records: &[InputRecord], settings: &RunSettings, source: &dyn ReviewSource) -> ExportRun {
    let mut counters = RunCounters::default();
    let corrector = settings.filter.corrector();

    let pb = ProgressScope::count(settings.progress, "Evaluating rows", records.len() as u64);
    let mut accepted: Vec<NormalizedRecord> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        counters.processed += 1;
        pb.inc_items(1);
        match settings.filter.evaluate(rec) {
            Verdict::NoRating => {
                counters.skipped_no_rating += 1;
                tracing::debug!(row = i + 1, title = %rec.title, "Skipping (no rating)");
            }
            Verdict::TooOld => {
                counters.skipped_too_old += 1;
                tracing::debug!(
                    row = i + 1,
                    title = %rec.title,
                    last_viewed = %rec.last_viewed_at,
                    "Skipping (last watched more than {} days ago)",
                    settings.filter.max_days()
                );
            }
            Verdict::Eligible => match normalize(rec, &corrector) {
                Some(n) => accepted.push(n),
                None => counters.skipped_no_rating += 1,
            },
        }
    }
    pb.finish("done");

    let lookups: Vec<ReviewLookup> = if settings.enrich {
        let pb = ProgressScope::count(settings.progress, "Fetching reviews", accepted.len() as u64);
        let found = map_ordered_limited(&accepted, settings.lookup_concurrency, |rec| {
            let res = source.find_review(&rec.title, &rec.year, &rec.tmdb_id);
            pb.inc_items(1);
            res
        });
        pb.finish("done");
        found
    } else {
        vec![ReviewLookup::NotFound; accepted.len()]
    };

    let mut rows = Vec::with_capacity(accepted.len());
    for (rec, lookup) in accepted.iter().zip(lookups.iter()) {
        match lookup {
            ReviewLookup::Found(_) => {
                counters.reviews_found += 1;
                tracing::debug!(title = %rec.title, "Review found");
            }
            ReviewLookup::NotFound => {
                if settings.enrich {
                    tracing::debug!(title = %rec.title, "No review found");
                }
            }
            ReviewLookup::Failed(reason) => {
                counters.review_lookup_failures += 1;
                tracing::debug!(title = %rec.title, %reason, "Review lookup failed");
            }
        }
        rows.push(project(rec, lookup.review()));
        counters.accepted += 1;
    }

    ExportRun { rows, counters }
}

fn write_summary_json(summary: &RunSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let tmp = staging_path(path);
    let f = create_with_backoff(&tmp, 16, 50).with_context(|| format!("create {}", tmp.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, summary)?;
    w.write_all(b"\n")?;
    w.flush()?;
    drop(w);
    replace_file_atomic_backoff(&tmp, path)
}
