mod cli_args;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use roomweek_calendar::{render_html, Clock, FeedCache, FeedClient, FixedClock, WeeklyCalendar};
use roomweek_core::{AppError, CacheError, Config, ConfigError};
use serde_json::Value;

use crate::cli_args::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            eprintln!("{}", err.user_message());
            eprintln!("  {}", err);
            ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let (config, created) = load_config(&cli)?;
    roomweek_core::init(&config.logging.level)?;
    if let Some(path) = created {
        tracing::info!("Wrote default configuration to {}", path.display());
    }
    check_config(&config)?;

    let feed = obtain_feed(&cli, &config).await?;

    match cli.today {
        Some(today) => publish(WeeklyCalendar::with_clock(FixedClock(today)), &feed, &cli, &config),
        None => publish(WeeklyCalendar::new(), &feed, &cli, &config),
    }
}

/// Build the week from `feed`, then print it as JSON or write the HTML schedule.
fn publish<C: Clock>(
    mut calendar: WeeklyCalendar<C>,
    feed: &Value,
    cli: &Cli,
    config: &Config,
) -> Result<(), AppError> {
    calendar.set_events(feed)?;

    let week_of = calendar
        .week_of()
        .map(|monday| monday.to_string())
        .unwrap_or_default();

    if cli.json {
        let json = serde_json::to_string_pretty(calendar.events()).map_err(anyhow::Error::from)?;
        println!("{json}");
        return Ok(());
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| config.document.output_path.clone());
    let html = render_html(calendar.events(), &config.document);
    std::fs::write(&output, html)?;

    tracing::info!(path = %output.display(), week_of = %week_of, "Schedule written");
    println!(
        "Wrote {} events for the week of {} to {}",
        calendar.event_count(),
        week_of,
        output.display()
    );
    Ok(())
}

/// Load the config, returning the path of a default file if one was written.
///
/// An explicit `--config` path must already exist; the default location is
/// created on first run.
fn load_config(cli: &Cli) -> Result<(Config, Option<PathBuf>), ConfigError> {
    let path = match &cli.config {
        Some(path) if !path.exists() => {
            return Err(ConfigError::NotFound(path.display().to_string()))
        }
        Some(path) => path.clone(),
        None => Config::config_path().map_err(|e| ConfigError::NotFound(format!("{e:#}")))?,
    };

    let (config, created) =
        Config::load_from(&path).map_err(|e| ConfigError::ParseError(format!("{e:#}")))?;
    Ok((config, created.then_some(path)))
}

/// Log warnings; refuse to run on errors.
fn check_config(config: &Config) -> Result<(), ConfigError> {
    let validation = config.validate();

    for warning in &validation.warnings {
        tracing::warn!("Config warning: {}", warning);
    }

    if !validation.is_valid() {
        return Err(ConfigError::Invalid(validation.error_summary()));
    }
    Ok(())
}

fn open_cache(config: &Config) -> Option<FeedCache> {
    if !config.cache.enabled {
        return None;
    }

    let path = config.cache_path();
    match FeedCache::new(&path) {
        Ok(cache) => Some(cache),
        Err(e) => {
            tracing::warn!("Feed cache at {} unavailable: {}", path.display(), e);
            None
        }
    }
}

/// Pick the feed to build from: cache when offline or fresh, otherwise the
/// network, falling back to any cached copy if the download fails.
async fn obtain_feed(cli: &Cli, config: &Config) -> Result<Value, AppError> {
    let key = config.feed.cache_key.as_str();
    let cache = open_cache(config);

    if cli.offline {
        let cache = cache.ok_or_else(|| CacheError::Unavailable("cache is disabled".into()))?;
        return cache
            .load(key)?
            .ok_or_else(|| CacheError::Missing(key.to_string()).into());
    }

    if let (Some(cache), false) = (&cache, cli.refresh) {
        let max_age = chrono::Duration::hours(i64::from(config.cache.max_age_hours));
        match cache.load_fresh(key, max_age) {
            Ok(Some(feed)) => {
                tracing::info!("Using cached feed `{}`", key);
                return Ok(feed);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Ignoring unreadable cached feed: {}", e),
        }
    }

    if !config.feed.is_configured() {
        return Err(ConfigError::MissingSetting("feed.url".into()).into());
    }

    let client = FeedClient::new(
        &config.feed.url,
        Duration::from_secs(config.feed.timeout_secs),
    )?;

    match client.fetch().await {
        Ok(feed) => {
            if let Some(cache) = &cache {
                if let Err(e) = cache.save(key, &feed) {
                    tracing::warn!("Failed to cache feed: {}", e);
                }
            }
            Ok(feed)
        }
        Err(fetch_err) => {
            if let Some(cache) = &cache {
                if let Ok(Some(feed)) = cache.load(key) {
                    tracing::warn!("Download failed ({}); using cached feed `{}`", fetch_err, key);
                    return Ok(feed);
                }
            }
            Err(fetch_err.into())
        }
    }
}
