//! Watched-date handling: parse the export's `Last Viewed at` timestamps and undo the
//! exporter's one-month shift.

use time::macros::format_description;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime};

/// Parse a `YYYY-MM-DD HH:MM:SS` timestamp. Blank or malformed input yields `None`.
pub fn parse_viewed_at(raw: &str) -> Option<PrimitiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day] [hour]:[minute]:[second]")).ok()
}

/// Advance one calendar month, wrapping December into January of the next year and
/// clamping the day to the target month's length (Jan 31 -> Feb 28/29).
/// Returns `None` only when the result falls outside the representable calendar.
pub fn add_one_month(dt: PrimitiveDateTime) -> Option<PrimitiveDateTime> {
    let date = dt.date();
    let (year, month) = match date.month() {
        Month::December => (date.year().checked_add(1)?, Month::January),
        m => (date.year(), m.next()),
    };
    let day = date.day().min(time::util::days_in_year_month(year, month));
    let shifted = Date::from_calendar_date(year, month, day).ok()?;
    Some(PrimitiveDateTime::new(shifted, dt.time()))
}

/// `YYYY-MM-DD` rendering used by both output formats.
pub fn format_iso_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

/// Wall-clock reference for a run: local time when the offset is known, UTC otherwise.
pub fn reference_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    PrimitiveDateTime::new(now.date(), now.time())
}

/// Applies (or skips) the one-month correction for exports produced by tools that
/// report viewing dates a month early.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateCorrector {
    fix_offset: bool,
}

impl DateCorrector {
    pub fn new(fix_offset: bool) -> Self {
        Self { fix_offset }
    }

    /// Corrected timestamp with time-of-day kept; the recency filter compares on this.
    pub fn corrected_timestamp(&self, raw: &str) -> Option<PrimitiveDateTime> {
        let dt = parse_viewed_at(raw)?;
        if self.fix_offset { add_one_month(dt) } else { Some(dt) }
    }

    /// Corrected calendar date (time-of-day discarded).
    pub fn correct(&self, raw: &str) -> Option<Date> {
        self.corrected_timestamp(raw).map(|dt| dt.date())
    }

    /// Corrected date as `YYYY-MM-DD`, or `None` when the input cannot be parsed.
    pub fn correct_to_string(&self, raw: &str) -> Option<String> {
        self.correct(raw).map(format_iso_date)
    }
}

impl Default for DateCorrector {
    fn default() -> Self {
        Self { fix_offset: true }
    }
}
