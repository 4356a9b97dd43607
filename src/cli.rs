//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use tweetgrab_core::{DEFAULT_TARGET_COUNT, SearchMode};
use tweetgrab_core::scrape::pacing::{DEFAULT_MAX_DELAY, DEFAULT_MIN_DELAY};

/// Collect tweets matching a search query into a CSV file.
///
/// Tweetgrab logs into X with saved cookies (or credentials on first
/// run), pages through search results at a polite pace, and appends
/// each tweet to the output CSV as it arrives.
#[derive(Parser, Debug)]
#[command(name = "tweetgrab")]
#[command(author, version, about)]
pub struct Args {
    /// Search query, e.g. "(from:nasa) lang:en until:2025-01-01 since:2024-01-01"
    pub query: String,

    /// Number of tweets to collect (1-10000)
    #[arg(short = 'n', long, default_value_t = DEFAULT_TARGET_COUNT, value_parser = clap::value_parser!(u64).range(1..=10_000))]
    pub count: u64,

    /// Search ranking: top or latest
    #[arg(short, long, default_value_t = SearchMode::Top)]
    pub mode: SearchMode,

    /// Output CSV file path
    #[arg(short, long, default_value = "tweets.csv")]
    pub output: PathBuf,

    /// Saved cookies file path
    #[arg(long, default_value = "cookies.json")]
    pub cookies: PathBuf,

    /// Credentials config file path (used when no cookies file exists)
    #[arg(long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Minimum delay between page fetches in seconds
    #[arg(long, default_value_t = DEFAULT_MIN_DELAY.as_secs(), value_parser = clap::value_parser!(u64).range(0..=600))]
    pub min_delay: u64,

    /// Maximum delay between page fetches in seconds
    #[arg(long, default_value_t = DEFAULT_MAX_DELAY.as_secs(), value_parser = clap::value_parser!(u64).range(0..=600))]
    pub max_delay: u64,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
