//! Plex export loading: header check, then one buffered pass over the rows.

use crate::error::ExportError;
use crate::record::{
    InputRecord, COL_LAST_VIEWED_AT, COL_TITLE, COL_TMDB_ID, COL_USER_RATING, COL_YEAR,
};
use crate::util::open_with_backoff;
use csv::StringRecord;
use std::io::Read;
use std::path::Path;

/// Column positions resolved once from the header row.
struct ColumnMap {
    title: usize,
    year: usize,
    tmdb_id: usize,
    user_rating: usize,
    last_viewed_at: usize,
}

impl ColumnMap {
    fn from_header(header: &StringRecord, path: &Path) -> Result<Self, ExportError> {
        let find = |column: &'static str| {
            header
                .iter()
                .position(|h| h == column)
                .ok_or_else(|| ExportError::MissingColumn { path: path.to_path_buf(), column })
        };
        Ok(Self {
            title: find(COL_TITLE)?,
            year: find(COL_YEAR)?,
            tmdb_id: find(COL_TMDB_ID)?,
            user_rating: find(COL_USER_RATING)?,
            last_viewed_at: find(COL_LAST_VIEWED_AT)?,
        })
    }

    fn record(&self, row: &StringRecord) -> InputRecord {
        let cell = |i: usize| row.get(i).unwrap_or("").to_string();
        InputRecord {
            title: cell(self.title),
            year: cell(self.year),
            tmdb_id: cell(self.tmdb_id),
            user_rating: cell(self.user_rating),
            last_viewed_at: cell(self.last_viewed_at),
        }
    }
}

/// Read the whole export into memory, preserving file order.
pub fn read_export(path: &Path) -> Result<Vec<InputRecord>, ExportError> {
    let file = open_with_backoff(path, 8, 50)
        .map_err(|source| ExportError::InputOpen { path: path.to_path_buf(), source })?;
    read_export_from(file, path)
}

/// Same as `read_export`, over any reader; `label` names the source in errors.
pub fn read_export_from<R: Read>(rdr: R, label: &Path) -> Result<Vec<InputRecord>, ExportError> {
    let csv_err = |source: csv::Error| ExportError::Csv { path: label.to_path_buf(), source };

    let mut reader = csv::ReaderBuilder::new().has_headers(true).flexible(true).from_reader(rdr);
    let header = reader.headers().map_err(csv_err)?.clone();
    let columns = ColumnMap::from_header(&header, label)?;

    let mut out = Vec::new();
    for row in reader.records() {
        let row = row.map_err(csv_err)?;
        out.push(columns.record(&row));
    }
    Ok(out)
}
