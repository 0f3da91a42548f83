//! Runtime configuration.
//!
//! Every knob of the aggregation pipeline lives here so it can be adjusted
//! without touching code: the topic vocabulary, both similarity thresholds,
//! the summary prefix length, how many stories are kept, the display offset,
//! and the HTTP behaviour of the scrapers.
//!
//! Configuration is read from an optional YAML file; missing fields fall back
//! to [`Config::default`]. Selected fields can then be overridden from the
//! command line (see [`crate::cli::Cli`]).
//!
//! ```yaml
//! keywords: [pakistan, shelling, ceasefire]
//! headline_threshold: 80
//! body_threshold: 70
//! utc_offset: "+05:30"
//! sources: [ndtv, toi]
//! ```

use crate::cli::Cli;
use crate::relevance::Scorer;
use crate::scrapers::SourceKind;
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, instrument};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid UTC offset {0:?} (expected e.g. \"+05:30\")")]
    Offset(String),

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// A fixed UTC offset that (de)serializes as `"+05:30"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcOffset(pub FixedOffset);

impl FromStr for UtcOffset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if matches!(trimmed, "Z" | "UTC" | "utc" | "GMT") {
            return Ok(UtcOffset(Utc.fix()));
        }
        trimmed
            .parse::<FixedOffset>()
            .map(UtcOffset)
            .map_err(|_| ConfigError::Offset(s.to_string()))
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for UtcOffset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UtcOffset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Upper bound for `http.max_retries`.
pub const MAX_RETRIES: usize = 10;

/// HTTP behaviour shared by all scrapers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after the first failed attempt.
    pub max_retries: usize,
    /// Initial backoff delay in milliseconds (doubles per attempt).
    pub base_delay_ms: u64,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 2,
            base_delay_ms: 500,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36".to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Topic vocabulary matched against headline and body tokens.
    pub keywords: Vec<String>,
    /// Minimum headline score (exclusive, 0-100).
    pub headline_threshold: f64,
    /// Minimum body-prefix score (exclusive, 0-100).
    pub body_threshold: f64,
    /// Characters of body used for the summary, fingerprint and body check.
    pub summary_len: usize,
    /// Stories retained per refresh.
    pub max_stories: usize,
    /// Offset every timestamp is normalized to.
    pub utc_offset: UtcOffset,
    /// Similarity function used by the relevance filter.
    pub scorer: Scorer,
    /// Seconds between background refreshes.
    pub refresh_interval_secs: u64,
    /// Enabled news sources, fetched in this order.
    pub sources: Vec<SourceKind>,
    /// Cheap substring pre-filter some scrapers apply before returning an article.
    pub source_keywords: Vec<String>,
    /// Scraper HTTP settings.
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            keywords: [
                "pakistan",
                "shelling",
                "blackout",
                "drones",
                "ceasefire",
                "war",
                "conflict",
                "pak",
                "jammu",
                "kashmir",
                "army",
                "forces",
                "attack",
                "sindoor",
                "terror",
                "terrorist",
                "china",
                "indo-pak",
                "border",
                "pok",
                "retaliation",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            headline_threshold: 80.0,
            body_threshold: 70.0,
            summary_len: 300,
            max_stories: 20,
            utc_offset: UtcOffset(FixedOffset::east_opt(5 * 3600 + 30 * 60).expect("IST is a valid offset")),
            scorer: Scorer::default(),
            refresh_interval_secs: 300,
            sources: vec![SourceKind::IndianExpress, SourceKind::Ndtv, SourceKind::Toi],
            source_keywords: ["india", "pakistan", "war", "conflict"]
                .into_iter()
                .map(String::from)
                .collect(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML for
    /// this schema, or contains out-of-range values.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        info!(
            keywords = config.keywords.len(),
            sources = config.sources.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Load from `path` when given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides on top of the file/default values.
    pub fn apply_cli(&mut self, cli: &Cli) -> Result<(), ConfigError> {
        if let Some(secs) = cli.refresh_secs {
            self.refresh_interval_secs = secs;
        }
        if let Some(max) = cli.max_stories {
            self.max_stories = max;
        }
        if let Some(t) = cli.headline_threshold {
            self.headline_threshold = t;
        }
        if let Some(t) = cli.body_threshold {
            self.body_threshold = t;
        }
        if let Some(ref offset) = cli.utc_offset {
            self.utc_offset = offset.parse()?;
        }
        self.validate()
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("headline_threshold", self.headline_threshold),
            ("body_threshold", self.body_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is outside 0..=100"),
                });
            }
        }
        if self.summary_len == 0 {
            return Err(ConfigError::Invalid {
                field: "summary_len",
                reason: "must be positive".to_string(),
            });
        }
        if self.http.max_retries > MAX_RETRIES {
            return Err(ConfigError::Invalid {
                field: "http.max_retries",
                reason: format!("{} exceeds the limit of {MAX_RETRIES}", self.http.max_retries),
            });
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "refresh_interval_secs",
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// The configured display offset.
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.keywords.len(), 21);
        assert_eq!(config.headline_threshold, 80.0);
        assert_eq!(config.body_threshold, 70.0);
        assert_eq!(config.summary_len, 300);
        assert_eq!(config.max_stories, 20);
        assert_eq!(config.offset().local_minus_utc(), 19800);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "keywords: [ukraine, russia]\nheadline_threshold: 85\nutc_offset: \"-04:00\"\nsources: [ndtv]"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.keywords, vec!["ukraine", "russia"]);
        assert_eq!(config.headline_threshold, 85.0);
        assert_eq!(config.body_threshold, 70.0);
        assert_eq!(config.offset().local_minus_utc(), -4 * 3600);
        assert_eq!(config.sources, vec![SourceKind::Ndtv]);
        assert_eq!(config.max_stories, 20);
    }

    #[test]
    fn test_invalid_offset_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "utc_offset: \"somewhere\"").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Yaml { .. })
        ));
        assert!(matches!(
            "nope".parse::<UtcOffset>(),
            Err(ConfigError::Offset(_))
        ));
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "body_threshold: 140").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Invalid { field: "body_threshold", .. })
        ));
    }

    #[test]
    fn test_excessive_retries_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "http:\n  max_retries: 40").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Invalid { field: "http.max_retries", .. })
        ));

        let mut config = Config::default();
        config.http.max_retries = MAX_RETRIES;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Config::load("/definitely/not/here.yaml"),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "conflict_news",
            "--max-stories",
            "5",
            "--headline-threshold",
            "90",
            "--utc-offset",
            "UTC",
        ]);
        let mut config = Config::default();
        config.apply_cli(&cli).unwrap();
        assert_eq!(config.max_stories, 5);
        assert_eq!(config.headline_threshold, 90.0);
        assert_eq!(config.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_offset_round_trips_through_yaml() {
        let config = Config::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("+05:30"));
        let back: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, config);
    }
}
