use plex_export::{add_one_month, format_iso_date, parse_viewed_at, DateCorrector};
use time::macros::{date, datetime};

/// Month-end clamping lands on the last day of February, leap years included.
#[test]
fn month_end_clamps_to_february() {
    let fix = DateCorrector::new(true);
    assert_eq!(fix.correct_to_string("2024-01-31 10:00:00").as_deref(), Some("2024-02-29"));
    assert_eq!(fix.correct_to_string("2023-01-31 10:00:00").as_deref(), Some("2023-02-28"));
    assert_eq!(fix.correct_to_string("2024-03-31 23:59:59").as_deref(), Some("2024-04-30"));
}

/// December rolls over into January of the following year.
#[test]
fn december_wraps_to_next_year() {
    let fix = DateCorrector::new(true);
    assert_eq!(fix.correct("2024-12-15 00:00:00"), Some(date!(2025-01-15)));
    assert_eq!(fix.correct("2023-12-31 08:30:00"), Some(date!(2024-01-31)));
}

/// Without clamping, the shift adds a full month: 28 to 31 days depending on the month.
#[test]
fn shift_is_one_calendar_month() {
    for (raw, days) in [
        ("2023-01-15 12:00:00", 31),
        ("2023-02-15 12:00:00", 28),
        ("2024-02-15 12:00:00", 29),
        ("2024-04-15 12:00:00", 30),
    ] {
        let before = parse_viewed_at(raw).unwrap();
        let after = add_one_month(before).unwrap();
        assert_eq!((after - before).whole_days(), days, "{raw}");
        assert_eq!(after.day(), before.day());
        assert_eq!(after.time(), before.time(), "time of day is kept before truncation");
    }
}

/// With the flag off the date is only truncated.
#[test]
fn disabled_correction_only_truncates() {
    let plain = DateCorrector::new(false);
    assert_eq!(plain.correct_to_string("2024-06-01 12:00:00").as_deref(), Some("2024-06-01"));
    assert_eq!(
        plain.corrected_timestamp("2024-06-01 12:00:00"),
        Some(datetime!(2024-06-01 12:00:00))
    );
}

/// Blank, malformed and out-of-range timestamps are absent, never an error.
#[test]
fn unparseable_timestamps_are_absent() {
    let fix = DateCorrector::default();
    for raw in ["", "   ", "2024-06-01", "06/01/2024 12:00:00", "2024-13-01 00:00:00", "2023-02-30 00:00:00", "garbage"] {
        assert_eq!(fix.correct(raw), None, "{raw:?}");
    }
    // Surrounding whitespace is tolerated.
    assert_eq!(fix.correct_to_string("  2024-06-01 12:00:00 ").as_deref(), Some("2024-07-01"));
}

#[test]
fn iso_date_formatting_is_zero_padded() {
    assert_eq!(format_iso_date(date!(2025-01-05)), "2025-01-05");
}
