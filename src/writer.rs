//! Staged CSV writers for the two import files.
//!
//! File layout while a run is in flight:
//!   <dir>/<name>.inprogress   (temp, written row by row)
//!   <dir>/<name>              (final, after finalize())
//!
//! A run that fails before `finalize()` never touches the final names. If promoting the
//! second file fails, the first is put back (`<name>.previous` holds it meanwhile), so
//! the two final files are always from the same run.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::record::{LetterboxdRow, TraktRow};
use crate::util::{create_with_backoff, remove_with_backoff, replace_file_atomic_backoff};

fn with_suffix(final_path: &Path, suffix: &str) -> PathBuf {
    let mut name = final_path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(suffix);
    final_path.with_file_name(name)
}

pub fn staging_path(final_path: &Path) -> PathBuf {
    with_suffix(final_path, ".inprogress")
}

fn backup_path(final_path: &Path) -> PathBuf {
    with_suffix(final_path, ".previous")
}

/// Best-effort removal of staging files on an error path.
fn discard_staged(tmp_paths: &[PathBuf]) {
    for tmp in tmp_paths {
        if let Err(e) = remove_with_backoff(tmp, 4, 50) {
            tracing::warn!(path = %tmp.display(), error = %e, "Failed to remove staging file");
        }
    }
}

/// Move an existing final file out of the way; `None` when there was nothing to keep.
fn set_aside(final_path: &Path) -> Result<Option<PathBuf>> {
    if !final_path.is_file() {
        return Ok(None);
    }
    let backup = backup_path(final_path);
    fs::rename(final_path, &backup)
        .with_context(|| format!("rename {} -> {}", final_path.display(), backup.display()))?;
    Ok(Some(backup))
}

/// Undo a promotion: put the previous file back, or remove the new one if there was none.
fn restore(final_path: &Path, backup: Option<&Path>) {
    let res = match backup {
        Some(b) => fs::rename(b, final_path)
            .with_context(|| format!("rename {} -> {}", b.display(), final_path.display())),
        None => remove_with_backoff(final_path, 4, 50),
    };
    if let Err(e) = res {
        tracing::warn!(path = %final_path.display(), error = %e, "Failed to restore previous output");
    }
}

fn open_staged(final_path: &Path, write_buf: usize) -> Result<(csv::Writer<File>, PathBuf)> {
    if let Some(parent) = final_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let tmp = staging_path(final_path);
    let f = create_with_backoff(&tmp, 16, 50).with_context(|| format!("create {}", tmp.display()))?;
    let w = csv::WriterBuilder::new().has_headers(false).buffer_capacity(write_buf).from_writer(f);
    Ok((w, tmp))
}

/// Paired Letterboxd/Trakt writers; rows are always written to both files together.
pub struct OutputWriters {
    letterboxd: csv::Writer<File>,
    trakt: csv::Writer<File>,
    include_review: bool,
    tmp_paths: [PathBuf; 2],
    final_paths: [PathBuf; 2],
    rows: u64,
}

impl OutputWriters {
    /// Open both staging files and write their headers. On error no staging file is left.
    pub fn create(letterboxd_path: &Path, trakt_path: &Path, include_review: bool, write_buf: usize) -> Result<Self> {
        let (letterboxd, lb_tmp) = open_staged(letterboxd_path, write_buf)?;
        let (trakt, trakt_tmp) = match open_staged(trakt_path, write_buf) {
            Ok(opened) => opened,
            Err(e) => {
                drop(letterboxd);
                discard_staged(&[lb_tmp]);
                return Err(e);
            }
        };

        let mut out = Self {
            letterboxd,
            trakt,
            include_review,
            tmp_paths: [lb_tmp, trakt_tmp],
            final_paths: [letterboxd_path.to_path_buf(), trakt_path.to_path_buf()],
            rows: 0,
        };
        if let Err(e) = out.write_headers() {
            out.discard();
            return Err(e);
        }
        Ok(out)
    }

    fn write_headers(&mut self) -> Result<()> {
        self.letterboxd.write_record(LetterboxdRow::header(self.include_review))?;
        self.trakt.write_record(TraktRow::header())?;
        Ok(())
    }

    fn discard(self) {
        let Self { letterboxd, trakt, tmp_paths, .. } = self;
        drop(letterboxd);
        drop(trakt);
        discard_staged(&tmp_paths);
    }

    pub fn write_pair(&mut self, lb: &LetterboxdRow, trakt: &TraktRow) -> Result<()> {
        self.letterboxd.write_record(lb.to_record(self.include_review))?;
        self.trakt.serialize(trakt)?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    /// Flush, close, and promote both staging files to their final names.
    /// Returns `[letterboxd, trakt]` final paths. On error both final names hold
    /// what they held before and no staging file is left.
    pub fn finalize(self) -> Result<[PathBuf; 2]> {
        let Self { mut letterboxd, mut trakt, tmp_paths, final_paths, .. } = self;
        let flushed = letterboxd.flush().and_then(|_| trakt.flush());
        // Ensure files are closed before rename/copy
        drop(letterboxd);
        drop(trakt);
        if let Err(e) = flushed {
            discard_staged(&tmp_paths);
            return Err(e).context("flush staged outputs");
        }

        let [lb_tmp, trakt_tmp] = &tmp_paths;
        let [lb_final, trakt_final] = &final_paths;

        let backup = match set_aside(lb_final) {
            Ok(b) => b,
            Err(e) => {
                discard_staged(&tmp_paths);
                return Err(e);
            }
        };
        let promoted = replace_file_atomic_backoff(lb_tmp, lb_final)
            .and_then(|_| replace_file_atomic_backoff(trakt_tmp, trakt_final));
        if let Err(e) = promoted {
            restore(lb_final, backup.as_deref());
            discard_staged(&tmp_paths);
            return Err(e);
        }

        if let Some(b) = backup {
            if let Err(e) = remove_with_backoff(&b, 4, 50) {
                tracing::warn!(path = %b.display(), error = %e, "Failed to remove previous output");
            }
        }
        Ok(final_paths)
    }

    /// Close and delete the staging files without touching the final names.
    pub fn abandon(self) -> Result<()> {
        let Self { letterboxd, trakt, tmp_paths, .. } = self;
        drop(letterboxd);
        drop(trakt);
        for tmp in &tmp_paths {
            remove_with_backoff(tmp, 16, 50)?;
        }
        Ok(())
    }
}
