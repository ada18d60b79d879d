//! Plex review client: resolve a title/year to a Plex `ratingKey` through the discover
//! search, then ask the community GraphQL service for the signed-in user's review.
//!
//! Both calls are best-effort. Nothing here returns an error to the pipeline; every
//! failure becomes `ReviewLookup::Failed` and a missing match becomes `NotFound`.

use crate::config::ReviewServiceConfig;
use crate::review::{ReviewLookup, ReviewSource};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;

const USER_AGENT: &str = concat!("plex-export/", env!("CARGO_PKG_VERSION"));
const TOKEN_HEADER: &str = "X-Plex-Token";
const SEARCH_LIMIT: &str = "10";

const REVIEW_QUERY: &str = "query GetReview($metadataID: ID!) { \
    metadataReviewV2(metadata: { id: $metadataID }) { \
    ... on ActivityReview { message } \
    ... on ActivityWatchReview { message } } }";

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no Plex token configured")]
    NoToken,

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("service error: {0}")]
    Service(String),
}

impl From<reqwest::Error> for LookupError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LookupError::Timeout(e.to_string())
        } else if e.is_decode() {
            LookupError::Parse(e.to_string())
        } else {
            LookupError::Network(e.to_string())
        }
    }
}

// ---- discover search response (only the fields we read) ----

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(rename = "MediaContainer", default)]
    media_container: MediaContainer,
}

#[derive(Debug, Default, Deserialize)]
struct MediaContainer {
    #[serde(rename = "SearchResults", default)]
    search_results: Vec<SearchResults>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchResults {
    #[serde(rename = "SearchResult", default)]
    search_result: Vec<SearchHit>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchHit {
    #[serde(rename = "Metadata")]
    metadata: Option<SearchMetadata>,
}

/// One search candidate.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(rename = "ratingKey", default)]
    pub rating_key: Option<Value>,
    #[serde(rename = "Guid", default)]
    pub guids: Vec<GuidRef>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GuidRef {
    #[serde(default)]
    pub id: String,
}

impl SearchMetadata {
    /// `ratingKey` arrives as a string from discover, as a number from some servers.
    pub fn key(&self) -> Option<String> {
        match self.rating_key.as_ref()? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    fn has_tmdb(&self, tmdb_id: &str) -> bool {
        self.guids
            .iter()
            .filter_map(|g| g.id.strip_prefix("tmdb://"))
            .any(|id| id == tmdb_id)
    }
}

/// Pick the candidate to fetch a review for: a TMDB guid match wins, otherwise the first
/// exact (case-insensitive) title match with the same year.
pub fn pick_candidate<'a>(
    candidates: &'a [SearchMetadata],
    title: &str,
    year: &str,
    tmdb_id: &str,
) -> Option<&'a SearchMetadata> {
    let tmdb_id = tmdb_id.trim();
    if !tmdb_id.is_empty() {
        if let Some(hit) = candidates.iter().find(|c| c.key().is_some() && c.has_tmdb(tmdb_id)) {
            return Some(hit);
        }
    }
    let year: i32 = year.trim().parse().ok()?;
    let title = title.trim().to_lowercase();
    candidates
        .iter()
        .find(|c| c.key().is_some() && c.year == Some(year) && c.title.trim().to_lowercase() == title)
}

/// Pull the review text (if any) out of a GraphQL response body.
pub fn review_from_graphql(body: &Value) -> Result<Option<String>, LookupError> {
    if let Some(errors) = body.get("errors").and_then(|e| e.as_array()) {
        if let Some(first) = errors.first() {
            let msg = first.get("message").and_then(|m| m.as_str()).unwrap_or("unknown error");
            return Err(LookupError::Service(msg.to_string()));
        }
    }
    Ok(body
        .pointer("/data/metadataReviewV2/message")
        .and_then(|m| m.as_str())
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string))
}

/// Blocking HTTP client for the two Plex services.
pub struct PlexReviewClient {
    http: Client,
    cfg: ReviewServiceConfig,
}

impl PlexReviewClient {
    pub fn new(cfg: ReviewServiceConfig) -> Result<Self, LookupError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;
        Ok(Self { http, cfg })
    }

    fn token(&self) -> Result<&str, LookupError> {
        self.cfg.token.as_deref().ok_or(LookupError::NoToken)
    }

    /// Step 1: title/year(/tmdb) -> ratingKey.
    pub fn resolve_key(&self, title: &str, year: &str, tmdb_id: &str) -> Result<Option<String>, LookupError> {
        let token = self.token()?;
        let url = format!("{}/library/search", self.cfg.discover_url);
        tracing::debug!(%title, %year, url = %url, "Searching Plex metadata");

        let resp = self
            .http
            .get(&url)
            .query(&[
                ("query", title),
                ("limit", SEARCH_LIMIT),
                ("searchTypes", "movies"),
                ("searchProviders", "discover"),
                ("includeMetadata", "1"),
            ])
            .header(TOKEN_HEADER, token)
            .header(ACCEPT, "application/json")
            .send()?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(LookupError::Api(status.as_u16(), text));
        }

        let parsed: SearchResponse = resp.json()?;
        let candidates: Vec<SearchMetadata> = parsed
            .media_container
            .search_results
            .into_iter()
            .flat_map(|r| r.search_result)
            .filter_map(|h| h.metadata)
            .collect();

        Ok(pick_candidate(&candidates, title, year, tmdb_id).and_then(SearchMetadata::key))
    }

    /// Step 2: ratingKey -> review text.
    pub fn fetch_review(&self, rating_key: &str) -> Result<Option<String>, LookupError> {
        let token = self.token()?;
        let body = json!({
            "query": REVIEW_QUERY,
            "operationName": "GetReview",
            "variables": { "metadataID": rating_key },
        });

        let resp = self
            .http
            .post(&self.cfg.community_url)
            .header(TOKEN_HEADER, token)
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(LookupError::Api(status.as_u16(), text));
        }

        let value: Value = resp.json()?;
        review_from_graphql(&value)
    }

    fn lookup(&self, title: &str, year: &str, tmdb_id: &str) -> Result<Option<String>, LookupError> {
        match self.resolve_key(title, year, tmdb_id)? {
            Some(key) => self.fetch_review(&key),
            None => Ok(None),
        }
    }
}

impl ReviewSource for PlexReviewClient {
    fn find_review(&self, title: &str, year: &str, tmdb_id: &str) -> ReviewLookup {
        match self.lookup(title, year, tmdb_id) {
            Ok(Some(text)) => ReviewLookup::Found(text),
            Ok(None) => ReviewLookup::NotFound,
            Err(e) => ReviewLookup::Failed(e.to_string()),
        }
    }
}
