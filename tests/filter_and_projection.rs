#[path = "common/mod.rs"]
mod common;

use common::fixed_now;
use plex_export::{
    normalize, parse_rating, project, round_rating, DateCorrector, InclusionFilter, InputRecord, Verdict,
};

fn filter(fix: bool, max_days: u32) -> InclusionFilter {
    InclusionFilter::new(DateCorrector::new(fix), max_days, fixed_now())
}

/// A blank rating is a hard skip no matter how recent (or broken) the date is.
#[test]
fn blank_rating_is_always_no_rating() {
    let f = filter(true, 365);
    for viewed in ["2024-08-01 12:00:00", "1999-01-01 00:00:00", "", "nonsense"] {
        for rating in ["", "   ", "\t"] {
            let rec = InputRecord::new("A", "2020", "1", rating, viewed);
            assert_eq!(f.evaluate(&rec), Verdict::NoRating);
            assert!(!f.is_eligible(rating, viewed));
        }
    }
}

/// Non-numeric ratings are treated like missing ones.
#[test]
fn non_numeric_rating_is_no_rating() {
    let f = filter(true, 365);
    let rec = InputRecord::new("A", "2020", "1", "eight", "2024-08-01 12:00:00");
    assert_eq!(f.evaluate(&rec), Verdict::NoRating);
    assert_eq!(parse_rating("NaN"), None);
    assert_eq!(parse_rating(" 7.5 "), Some(7.5));
}

/// The cutoff compares the corrected timestamp (time of day included) against now - max_days.
/// now = 2024-09-01 12:00, max = 365 -> cutoff 2023-09-02 12:00.
#[test]
fn recency_cutoff_uses_corrected_timestamp() {
    let f = filter(true, 365);
    let at = |viewed: &str| f.evaluate(&InputRecord::new("A", "2020", "1", "8", viewed));

    assert_eq!(at("2023-08-02 12:00:00"), Verdict::Eligible, "corrected to exactly the cutoff");
    assert_eq!(at("2023-08-02 11:59:59"), Verdict::TooOld, "one second before the cutoff");
    assert_eq!(at("2023-08-01 12:00:00"), Verdict::TooOld);

    // The same row is too old when the correction is off.
    let plain = filter(false, 365);
    assert_eq!(plain.evaluate(&InputRecord::new("A", "2020", "1", "8", "2023-08-02 12:00:00")), Verdict::TooOld);
}

/// Missing or malformed dates fail the recency check (counted as too old).
#[test]
fn unparseable_date_is_too_old() {
    let f = filter(true, 365);
    for viewed in ["", "2024-08-01", "yesterday"] {
        let rec = InputRecord::new("A", "2020", "1", "8", viewed);
        assert_eq!(f.evaluate(&rec), Verdict::TooOld, "{viewed:?}");
    }
}

/// A cutoff beyond the calendar's start disables the age check.
#[test]
fn huge_max_days_accepts_any_parsed_date() {
    let f = filter(true, u32::MAX);
    assert!(f.is_eligible("8", "1901-01-01 00:00:00"));
    assert!(!f.is_eligible("8", ""));
}

/// Ratings round half-to-even and stay within 0..=10.
#[test]
fn rating_rounding_and_clamping() {
    assert_eq!(round_rating(7.4), 7);
    assert_eq!(round_rating(7.6), 8);
    assert_eq!(round_rating(6.5), 6);
    assert_eq!(round_rating(7.5), 8);
    assert_eq!(round_rating(0.5), 0);
    assert_eq!(round_rating(-2.0), 0);
    assert_eq!(round_rating(12.0), 10);
}

/// Both projections carry one date, one rating and the verbatim TMDB id.
#[test]
fn projection_pairs_rows() {
    let fix = DateCorrector::new(true);
    let rec = InputRecord::new("Arrival", "2016", "329865", "9.0", "2024-05-31 22:10:00");
    let n = normalize(&rec, &fix).unwrap();
    assert_eq!(n.rating, 9);
    assert_eq!(n.watched_date.as_deref(), Some("2024-06-30"));

    let (lb, trakt) = project(&n, None);
    assert_eq!(lb.title, "Arrival");
    assert_eq!(lb.year, "2016");
    assert_eq!(lb.tmdb_id, "329865");
    assert_eq!(lb.rating10, 9);
    assert_eq!(lb.review, "");
    assert_eq!(lb.watched_date, trakt.watched_at);
    assert_eq!(trakt.watched_at, trakt.rated_at);
    assert_eq!(trakt.rating, lb.rating10);
    assert_eq!(trakt.tmdb_id, "329865");
    assert_eq!(trakt.kind, "movie");

    let (lb, _) = project(&n, Some("Stunning."));
    assert_eq!(lb.review, "Stunning.");
}

/// A missing TMDB id passes through as an empty string.
#[test]
fn empty_tmdb_id_passes_through() {
    let rec = InputRecord::new("Obscure", "1971", "", "6", "2024-08-01 00:00:00");
    let n = normalize(&rec, &DateCorrector::new(true)).unwrap();
    let (lb, trakt) = project(&n, None);
    assert_eq!(lb.tmdb_id, "");
    assert_eq!(trakt.tmdb_id, "");
}
