use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DISCOVER_URL: &str = "https://discover.provider.plex.tv";
pub const DEFAULT_COMMUNITY_URL: &str = "https://community.plex.tv/api";

/// Endpoints and credentials for the Plex review lookup.
#[derive(Clone, Debug)]
pub struct ReviewServiceConfig {
    pub discover_url: String,   // metadata search (title/year -> ratingKey)
    pub community_url: String,  // GraphQL endpoint serving the user's review
    pub token: Option<String>,  // X-Plex-Token
    pub timeout: Duration,      // per request
}

impl Default for ReviewServiceConfig {
    fn default() -> Self {
        Self {
            discover_url: DEFAULT_DISCOVER_URL.to_string(),
            community_url: DEFAULT_COMMUNITY_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }
}

impl ReviewServiceConfig {
    pub fn with_discover_url(mut self, url: impl Into<String>) -> Self {
        self.discover_url = url.into().trim_end_matches('/').to_string();
        self
    }
    pub fn with_community_url(mut self, url: impl Into<String>) -> Self {
        self.community_url = url.into().trim_end_matches('/').to_string();
        self
    }
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let t = token.into().trim().to_string();
        self.token = if t.is_empty() { None } else { Some(t) };
        self
    }
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }
}

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub input: PathBuf,
    pub letterboxd_out: PathBuf,
    pub trakt_out: PathBuf,
    pub summary_json: Option<PathBuf>,

    pub max_days_old: u32,         // recency cutoff in days
    pub fix_date_offset: bool,     // add one month to every Last Viewed at
    pub fetch_reviews: bool,       // enrichment on/off; also controls the Review column
    pub review_service: ReviewServiceConfig,
    pub lookup_concurrency: usize, // lookups in flight at once

    pub progress: bool,
    pub write_buffer_bytes: usize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from("movies.csv"),
            letterboxd_out: PathBuf::from("processed_movies_letterboxd.csv"),
            trakt_out: PathBuf::from("processed_movies_trakt.csv"),
            summary_json: None,

            max_days_old: 365,
            fix_date_offset: true,
            fetch_reviews: true,
            review_service: ReviewServiceConfig::default(),
            lookup_concurrency: 1,

            progress: true,
            write_buffer_bytes: 64 * 1024,
        }
    }
}

impl ExportOptions {
    pub fn with_input(mut self, path: impl AsRef<Path>) -> Self {
        self.input = path.as_ref().to_path_buf();
        self
    }
    pub fn with_letterboxd_out(mut self, path: impl AsRef<Path>) -> Self {
        self.letterboxd_out = path.as_ref().to_path_buf();
        self
    }
    pub fn with_trakt_out(mut self, path: impl AsRef<Path>) -> Self {
        self.trakt_out = path.as_ref().to_path_buf();
        self
    }
    pub fn with_summary_json(mut self, path: impl AsRef<Path>) -> Self {
        self.summary_json = Some(path.as_ref().to_path_buf());
        self
    }
    pub fn with_max_days_old(mut self, days: u32) -> Self {
        self.max_days_old = days;
        self
    }
    pub fn with_fix_date_offset(mut self, yes: bool) -> Self {
        self.fix_date_offset = yes;
        self
    }
    pub fn with_fetch_reviews(mut self, yes: bool) -> Self {
        self.fetch_reviews = yes;
        self
    }
    pub fn with_review_service(mut self, cfg: ReviewServiceConfig) -> Self {
        self.review_service = cfg;
        self
    }
    pub fn with_lookup_concurrency(mut self, n: usize) -> Self {
        self.lookup_concurrency = n.max(1);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_io_write_buffer(mut self, bytes: usize) -> Self {
        self.write_buffer_bytes = bytes.max(8 * 1024);
        self
    }
}
