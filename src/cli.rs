//! Command-line interface definitions for Conflict News.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Flags override values from the optional YAML config file.

use clap::Parser;

/// Command-line arguments for the Conflict News aggregator.
///
/// # Examples
///
/// ```sh
/// # Serve on the default address, refreshing every five minutes
/// conflict_news
///
/// # Custom config, also exporting latest.json on every refresh
/// conflict_news -c ./config.yaml -j ./json
///
/// # Run the pipeline once and print the result
/// conflict_news --once --max-stories 5
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to config.yaml file
    #[arg(short, long, env = "CONFLICT_NEWS_CONFIG")]
    pub config: Option<String>,

    /// Address the HTTP server binds to
    #[arg(short, long, env = "CONFLICT_NEWS_BIND", default_value = "0.0.0.0:5000")]
    pub bind: String,

    /// Optional directory for the latest.json export
    #[arg(short, long)]
    pub json_output_dir: Option<String>,

    /// Run the pipeline once, print the stories as JSON and exit
    #[arg(long)]
    pub once: bool,

    /// Seconds between background refreshes
    #[arg(long)]
    pub refresh_secs: Option<u64>,

    /// Maximum number of stories to keep
    #[arg(long)]
    pub max_stories: Option<usize>,

    /// Headline relevance threshold (0-100)
    #[arg(long)]
    pub headline_threshold: Option<f64>,

    /// Body relevance threshold (0-100)
    #[arg(long)]
    pub body_threshold: Option<f64>,

    /// Display offset for timestamps, e.g. "+05:30" or "UTC"
    #[arg(long)]
    pub utc_offset: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["conflict_news"]);

        assert_eq!(cli.bind, "0.0.0.0:5000");
        assert!(!cli.once);
        assert!(cli.json_output_dir.is_none());
        assert!(cli.max_stories.is_none());
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "conflict_news",
            "-c",
            "/etc/conflict_news.yaml",
            "-b",
            "127.0.0.1:8080",
            "-j",
            "/tmp/json",
        ]);

        assert_eq!(cli.config.as_deref(), Some("/etc/conflict_news.yaml"));
        assert_eq!(cli.bind, "127.0.0.1:8080");
        assert_eq!(cli.json_output_dir.as_deref(), Some("/tmp/json"));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "conflict_news",
            "--once",
            "--refresh-secs",
            "60",
            "--body-threshold",
            "65.5",
            "--utc-offset",
            "+01:00",
        ]);

        assert!(cli.once);
        assert_eq!(cli.refresh_secs, Some(60));
        assert_eq!(cli.body_threshold, Some(65.5));
        assert_eq!(cli.utc_offset.as_deref(), Some("+01:00"));
    }
}
