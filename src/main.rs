use anyhow::Result;
use clap::Parser;
use plex_export::{PlexExport, ReviewServiceConfig, DEFAULT_COMMUNITY_URL, DEFAULT_DISCOVER_URL};
use std::path::PathBuf;
use std::time::Duration;

/// Convert a Plex ratings export into Letterboxd and Trakt import files.
#[derive(Parser, Debug)]
#[command(name = "plex-export", version, about)]
struct Args {
    /// Plex export CSV (needs Title, Year, TMDB ID, User Rating, Last Viewed at)
    #[arg(long, default_value = "movies.csv")]
    input: PathBuf,

    #[arg(long, default_value = "processed_movies_letterboxd.csv")]
    letterboxd_out: PathBuf,

    #[arg(long, default_value = "processed_movies_trakt.csv")]
    trakt_out: PathBuf,

    /// Skip rows last watched more than this many days ago
    #[arg(long, default_value_t = 365)]
    max_days_old: u32,

    /// Don't add one month to Last Viewed at (only for exports without the offset bug)
    #[arg(long)]
    no_date_fix: bool,

    /// Don't look up reviews; the Letterboxd file gets no Review column
    #[arg(long)]
    no_reviews: bool,

    #[arg(long, env = "PLEX_TOKEN", hide_env_values = true)]
    plex_token: Option<String>,

    #[arg(long, default_value = DEFAULT_DISCOVER_URL)]
    discover_url: String,

    #[arg(long, default_value = DEFAULT_COMMUNITY_URL)]
    community_url: String,

    #[arg(long, default_value_t = 10)]
    lookup_timeout_secs: u64,

    /// Review lookups in flight at once (output order is unaffected)
    #[arg(long, default_value_t = 1)]
    lookup_concurrency: usize,

    /// Also write the run summary as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,

    #[arg(long)]
    no_progress: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut service = ReviewServiceConfig::default()
        .with_discover_url(args.discover_url)
        .with_community_url(args.community_url)
        .with_timeout(Duration::from_secs(args.lookup_timeout_secs.max(1)));
    if let Some(token) = args.plex_token {
        service = service.with_token(token);
    }

    let mut export = PlexExport::new()
        .input(&args.input)
        .letterboxd_out(&args.letterboxd_out)
        .trakt_out(&args.trakt_out)
        .max_days_old(args.max_days_old)
        .fix_date_offset(!args.no_date_fix)
        .fetch_reviews(!args.no_reviews)
        .review_service(service)
        .lookup_concurrency(args.lookup_concurrency)
        .progress(!args.no_progress);
    if let Some(path) = &args.summary_json {
        export = export.summary_json(path);
    }

    let summary = export.run()?;
    println!("{summary}");
    Ok(())
}
