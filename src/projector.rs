//! Projection of accepted rows into the Letterboxd and Trakt import schemas.

use crate::date::DateCorrector;
use crate::filters::parse_rating;
use crate::record::{InputRecord, LetterboxdRow, NormalizedRecord, TraktRow};

/// Round to the nearest integer with ties going to the even neighbour, clamped to 0..=10.
pub fn round_rating(value: f64) -> u8 {
    value.round_ties_even().clamp(0.0, 10.0) as u8
}

/// Build the normalized form of an accepted row. Returns `None` when the rating cannot
/// be parsed, which the inclusion filter already rules out for accepted rows.
pub fn normalize(rec: &InputRecord, corrector: &DateCorrector) -> Option<NormalizedRecord> {
    let rating = round_rating(parse_rating(&rec.user_rating)?);
    Some(NormalizedRecord {
        title: rec.title.clone(),
        year: rec.year.clone(),
        tmdb_id: rec.tmdb_id.clone(),
        rating,
        watched_date: corrector.correct_to_string(&rec.last_viewed_at),
    })
}

/// Both rows share one rating and one date; the review only lands in the Letterboxd row.
pub fn project(rec: &NormalizedRecord, review: Option<&str>) -> (LetterboxdRow, TraktRow) {
    let date = rec.watched_date.clone().unwrap_or_default();
    let letterboxd = LetterboxdRow {
        title: rec.title.clone(),
        year: rec.year.clone(),
        tmdb_id: rec.tmdb_id.clone(),
        rating10: rec.rating,
        watched_date: date.clone(),
        review: review.unwrap_or_default().to_string(),
    };
    let trakt = TraktRow {
        tmdb_id: rec.tmdb_id.clone(),
        watched_at: date.clone(),
        rating: rec.rating,
        rated_at: date,
        kind: TraktRow::KIND_MOVIE,
    };
    (letterboxd, trakt)
}
