//! CLI entry point for the tweetgrab tool.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, error, info};

use tweetgrab_core::{
    Config, CookieStore, CsvSink, PacingPolicy, ScrapeEngine, StopReason, XSession, session,
};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("Tweetgrab starting");

    let pacing = PacingPolicy::new(
        Duration::from_secs(args.min_delay),
        Duration::from_secs(args.max_delay),
    )
    .context("invalid delay range")?;

    // Reuse saved cookies when present, otherwise log in with credentials
    // from the config file and save the resulting cookies for next time.
    let session = if args.cookies.exists() {
        let store = CookieStore::load(&args.cookies)
            .with_context(|| format!("failed to load cookies from {}", args.cookies.display()))?;
        info!(path = %args.cookies.display(), "Loaded saved cookies");
        XSession::from_cookie_store(&store)
    } else {
        info!(path = %args.config.display(), "No saved cookies, logging in with credentials");
        let config = Config::load(&args.config)
            .with_context(|| format!("failed to load config from {}", args.config.display()))?;
        let store = session::login(&config.x).await.context("login failed")?;
        store
            .save(&args.cookies)
            .with_context(|| format!("failed to save cookies to {}", args.cookies.display()))?;
        info!(path = %args.cookies.display(), "Logged in and saved cookies");
        XSession::from_cookie_store(&store)
    };

    let mut sink = CsvSink::create(&args.output)
        .with_context(|| format!("failed to create output file {}", args.output.display()))?;

    let engine = ScrapeEngine::new(args.query, args.mode, args.count, pacing)?;

    let summary = engine.run(&session, &mut sink).await;

    info!(
        collected = summary.records_collected,
        pages = summary.pages_fetched,
        output = %args.output.display(),
        "Run finished"
    );

    match summary.stop {
        StopReason::TargetReached => Ok(()),
        StopReason::SourceExhausted => {
            info!(
                collected = summary.records_collected,
                target = engine.target_count(),
                "Search ran out of results before reaching the target"
            );
            Ok(())
        }
        StopReason::Failed(err) => {
            error!(error = %err, "Run stopped on error");
            bail!("run failed after {} tweets: {err}", summary.records_collected);
        }
    }
}
