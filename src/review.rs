//! Review enrichment seam. The pipeline only knows `ReviewSource`; how a review is found
//! (and whether the service is reachable at all) is up to the implementation.

/// Outcome of one best-effort lookup. Only `Found` puts text in the output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReviewLookup {
    Found(String),
    NotFound,
    Failed(String),
}

impl ReviewLookup {
    pub fn review(&self) -> Option<&str> {
        match self {
            ReviewLookup::Found(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Something that can look up the user's review of a title. Implementations must not
/// panic or block indefinitely; every failure is reported as `NotFound` or `Failed`.
pub trait ReviewSource: Send + Sync {
    fn find_review(&self, title: &str, year: &str, tmdb_id: &str) -> ReviewLookup;
}

/// Source used when enrichment is off or not configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoReviews;

impl ReviewSource for NoReviews {
    fn find_review(&self, _title: &str, _year: &str, _tmdb_id: &str) -> ReviewLookup {
        ReviewLookup::NotFound
    }
}

impl<F> ReviewSource for F
where
    F: Fn(&str, &str, &str) -> ReviewLookup + Send + Sync,
{
    fn find_review(&self, title: &str, year: &str, tmdb_id: &str) -> ReviewLookup {
        self(title, year, tmdb_id)
    }
}
