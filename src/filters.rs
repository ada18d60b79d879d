//! Inclusion policy: a row is exported only when it carries a rating and its corrected
//! watched timestamp is no older than the recency cutoff.

use crate::date::DateCorrector;
use crate::record::InputRecord;
use time::{Duration, PrimitiveDateTime};

/// Why a row was (or was not) accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Eligible,
    NoRating,
    TooOld,
}

/// Parse a user rating as a decimal number. Blank and non-numeric values yield `None`.
pub fn parse_rating(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Clone, Copy, Debug)]
pub struct InclusionFilter {
    corrector: DateCorrector,
    max_days: u32,
    cutoff: Option<PrimitiveDateTime>,
}

impl InclusionFilter {
    /// `now` is the single reference instant for the whole run.
    pub fn new(corrector: DateCorrector, max_days: u32, now: PrimitiveDateTime) -> Self {
        // A cutoff before the start of the calendar means "no age limit".
        let cutoff = now.checked_sub(Duration::days(i64::from(max_days)));
        Self { corrector, max_days, cutoff }
    }

    pub fn max_days(&self) -> u32 {
        self.max_days
    }

    pub fn corrector(&self) -> DateCorrector {
        self.corrector
    }

    pub fn evaluate(&self, rec: &InputRecord) -> Verdict {
        if rec.user_rating.trim().is_empty() {
            return Verdict::NoRating;
        }
        if parse_rating(&rec.user_rating).is_none() {
            tracing::warn!(title = %rec.title, rating = %rec.user_rating, "Unparseable user rating; treating as unrated");
            return Verdict::NoRating;
        }
        if !self.is_recent(&rec.last_viewed_at) {
            return Verdict::TooOld;
        }
        Verdict::Eligible
    }

    /// Boolean form of `evaluate`.
    pub fn is_eligible(&self, rating: &str, last_viewed_at: &str) -> bool {
        if parse_rating(rating).is_none() {
            return false;
        }
        self.is_recent(last_viewed_at)
    }

    /// Recency check on the corrected timestamp; unparseable dates are never recent.
    pub fn is_recent(&self, last_viewed_at: &str) -> bool {
        match self.corrector.corrected_timestamp(last_viewed_at) {
            Some(ts) => match self.cutoff {
                Some(cutoff) => ts >= cutoff,
                None => true,
            },
            None => false,
        }
    }
}
