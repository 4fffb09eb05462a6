use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Parser, ValueHint};

/// Build next week's printable room schedule from the library events feed.
#[derive(Parser, Debug, Clone)]
#[command(name = "roomweek", version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default location.
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Use the cached feed only; never touch the network.
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "refresh")]
    pub offline: bool,

    /// Download the feed even if the cached copy is fresh.
    #[arg(long, action = ArgAction::SetTrue)]
    pub refresh: bool,

    /// Where to write the schedule (overrides `document.output_path`).
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Pretend today is this date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub today: Option<NaiveDate>,

    /// Print the week as JSON instead of writing the HTML schedule.
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["roomweek"]).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.offline);
        assert!(!cli.refresh);
        assert!(!cli.json);
        assert!(cli.today.is_none());
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "roomweek",
            "--config",
            "/tmp/roomweek.toml",
            "--refresh",
            "-o",
            "week.html",
            "--today",
            "2024-02-01",
            "--json",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/roomweek.toml")));
        assert!(cli.refresh);
        assert_eq!(cli.output, Some(PathBuf::from("week.html")));
        assert_eq!(cli.today, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert!(cli.json);
    }

    #[test]
    fn test_bad_today_rejected() {
        assert!(Cli::try_parse_from(["roomweek", "--today", "02/01/2024"]).is_err());
    }

    #[test]
    fn test_offline_conflicts_with_refresh() {
        assert!(Cli::try_parse_from(["roomweek", "--offline", "--refresh"]).is_err());
    }
}
