//! Row types flowing through the export: one raw input row, its normalized form, and the
//! two output projections.

use serde::Serialize;

/// Column names the Plex export must carry (matched exactly).
pub const COL_TITLE: &str = "Title";
pub const COL_YEAR: &str = "Year";
pub const COL_TMDB_ID: &str = "TMDB ID";
pub const COL_USER_RATING: &str = "User Rating";
pub const COL_LAST_VIEWED_AT: &str = "Last Viewed at";

pub const REQUIRED_COLUMNS: [&str; 5] = [COL_TITLE, COL_YEAR, COL_TMDB_ID, COL_USER_RATING, COL_LAST_VIEWED_AT];

/// One row of the Plex export. Missing or empty cells are empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputRecord {
    pub title: String,
    pub year: String,
    pub tmdb_id: String,
    pub user_rating: String,
    pub last_viewed_at: String,
}

impl InputRecord {
    pub fn new(
        title: impl Into<String>,
        year: impl Into<String>,
        tmdb_id: impl Into<String>,
        user_rating: impl Into<String>,
        last_viewed_at: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            year: year.into(),
            tmdb_id: tmdb_id.into(),
            user_rating: user_rating.into(),
            last_viewed_at: last_viewed_at.into(),
        }
    }
}

/// A row that passed the inclusion filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub title: String,
    pub year: String,
    pub tmdb_id: String,
    pub rating: u8,                       // 0..=10
    pub watched_date: Option<String>,     // YYYY-MM-DD
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LetterboxdRow {
    pub title: String,
    pub year: String,
    pub tmdb_id: String,
    pub rating10: u8,
    pub watched_date: String,
    pub review: String,
}

impl LetterboxdRow {
    pub fn header(include_review: bool) -> Vec<&'static str> {
        let mut h = vec!["Title", "Year", "tmdbID", "Rating10", "WatchedDate"];
        if include_review {
            h.push("Review");
        }
        h
    }

    pub fn to_record(&self, include_review: bool) -> Vec<String> {
        let mut r = vec![
            self.title.clone(),
            self.year.clone(),
            self.tmdb_id.clone(),
            self.rating10.to_string(),
            self.watched_date.clone(),
        ];
        if include_review {
            r.push(self.review.clone());
        }
        r
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TraktRow {
    pub tmdb_id: String,
    pub watched_at: String,
    pub rating: u8,
    pub rated_at: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl TraktRow {
    pub const KIND_MOVIE: &'static str = "movie";

    pub fn header() -> [&'static str; 5] {
        ["tmdb_id", "watched_at", "rating", "rated_at", "type"]
    }
}

/// Per-run accumulators. Owned by a single aggregation point in the pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunCounters {
    pub processed: u64,
    pub accepted: u64,
    pub skipped_no_rating: u64,
    pub skipped_too_old: u64,
    pub reviews_found: u64,
    pub review_lookup_failures: u64,
}
