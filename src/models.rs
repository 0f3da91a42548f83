//! Data models for raw scraped articles, grouped stories and published snapshots.
//!
//! This module defines the core data structures used throughout the application:
//! - [`RawArticle`]: One article as returned by a news source fetcher
//! - [`RawTime`]: The publication time in whatever shape the source exposed it
//! - [`Story`]: A cluster of articles that share the same content fingerprint
//! - [`PublishedStory`]: A finalized story ready for rendering
//! - [`Snapshot`]: The complete, immutable output of one pipeline run

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use indexmap::IndexSet;
use serde::Serialize;

/// Publication time as exposed by a news source.
///
/// Sites are inconsistent: some expose a machine-readable timestamp, some a
/// free-form "Updated: May 10, 2025, 14:32 IST" label, and some nothing at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTime {
    /// The source did not expose a publication time.
    Unknown,
    /// Free-form text scraped from the page.
    Text(String),
    /// A structured timestamp without zone information.
    Naive(NaiveDateTime),
    /// A structured timestamp carrying its own offset.
    Aware(DateTime<FixedOffset>),
}

/// A raw news article as scraped from a news source.
///
/// # Fields
///
/// * `headline` - The headline shown on the listing page
/// * `body` - The article text (or its description when only that is available)
/// * `published_at` - The publication time, in whatever shape the site exposed it
/// * `source` - Display name of the outlet, e.g. `"NDTV"`
/// * `url` - Canonical article URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawArticle {
    /// The article headline.
    pub headline: String,
    /// The article text.
    pub body: String,
    /// The publication time as scraped.
    pub published_at: RawTime,
    /// The outlet display name.
    pub source: String,
    /// The canonical article URL.
    pub url: String,
}

/// A deduplicated cluster of articles judged to report the same event.
///
/// `headlines`, `sources` and `urls` only grow by appending; duplicates are
/// kept until the story is finalized into a [`PublishedStory`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    /// First headline ever observed for this story.
    pub display_headline: String,
    /// Body prefix of the first article observed.
    pub summary: String,
    /// Every headline observed, in arrival order.
    pub headlines: Vec<String>,
    /// Every source observed, in arrival order.
    pub sources: Vec<String>,
    /// Every URL observed, in arrival order.
    pub urls: Vec<String>,
    /// Latest publication time among contributing articles.
    pub latest_time: DateTime<FixedOffset>,
}

impl Story {
    /// Seed a story from its first article.
    pub fn seed(article: &RawArticle, summary: String, time: DateTime<FixedOffset>) -> Self {
        Self {
            display_headline: article.headline.clone(),
            summary,
            headlines: vec![article.headline.clone()],
            sources: vec![article.source.clone()],
            urls: vec![article.url.clone()],
            latest_time: time,
        }
    }

    /// Record another article with the same fingerprint.
    pub fn absorb(&mut self, article: &RawArticle, time: DateTime<FixedOffset>) {
        self.headlines.push(article.headline.clone());
        self.urls.push(article.url.clone());
        self.sources.push(article.source.clone());
        if time > self.latest_time {
            self.latest_time = time;
        }
    }
}

/// A story finalized for presentation.
///
/// `sources` and `urls` are deduplicated sets (first-seen order retained) and
/// `time` is rendered as `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedStory {
    /// The display headline.
    pub headline: String,
    /// Body prefix of the first article.
    pub summary: String,
    /// Every headline observed for the story.
    pub headlines: Vec<String>,
    /// Deduplicated outlet names.
    pub sources: IndexSet<String>,
    /// Deduplicated article URLs.
    pub urls: IndexSet<String>,
    /// Formatted latest publication time.
    pub time: String,
    /// Latest publication time, kept for ordering checks and API consumers.
    pub latest_time: DateTime<FixedOffset>,
}

impl PublishedStory {
    /// Pair sources with URLs for display.
    ///
    /// The two sets are zipped positionally; the shorter one bounds the result.
    pub fn source_links(&self) -> Vec<(&str, &str)> {
        self.sources
            .iter()
            .zip(self.urls.iter())
            .map(|(s, u)| (s.as_str(), u.as_str()))
            .collect()
    }
}

/// One complete pipeline run's output, published atomically to readers.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// When the run that produced this snapshot completed.
    pub refreshed_at: DateTime<FixedOffset>,
    /// Ranked stories, most recent first.
    pub stories: Vec<PublishedStory>,
}

impl Snapshot {
    /// An empty snapshot, served until the first refresh completes.
    pub fn empty(refreshed_at: DateTime<FixedOffset>) -> Self {
        Self {
            refreshed_at,
            stories: Vec::new(),
        }
    }

    /// The refresh stamp rendered as `YYYY-MM-DD HH:MM:SS`.
    pub fn refreshed_label(&self) -> String {
        self.refreshed_at.format(crate::ranking::TIME_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(headline: &str, source: &str, url: &str) -> RawArticle {
        RawArticle {
            headline: headline.to_string(),
            body: "body".to_string(),
            published_at: RawTime::Unknown,
            source: source.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_story_absorb_keeps_duplicates_and_max_time() {
        let ist = FixedOffset::east_opt(19800).unwrap();
        let t1 = ist.with_ymd_and_hms(2025, 5, 10, 14, 0, 0).unwrap();
        let t0 = ist.with_ymd_and_hms(2025, 5, 10, 9, 0, 0).unwrap();

        let first = article("Shelling resumes", "NDTV", "https://ndtv.com/a");
        let mut story = Story::seed(&first, "body".to_string(), t1);
        story.absorb(&article("Border shelling", "NDTV", "https://ndtv.com/a"), t0);

        assert_eq!(story.display_headline, "Shelling resumes");
        assert_eq!(story.headlines.len(), 2);
        assert_eq!(story.sources, vec!["NDTV", "NDTV"]);
        assert_eq!(story.latest_time, t1);
    }

    #[test]
    fn test_source_links_zip() {
        let ist = FixedOffset::east_opt(19800).unwrap();
        let story = PublishedStory {
            headline: "h".to_string(),
            summary: String::new(),
            headlines: vec!["h".to_string()],
            sources: ["NDTV", "TOI"].into_iter().map(String::from).collect(),
            urls: ["https://a", "https://b"].into_iter().map(String::from).collect(),
            time: "2025-05-10 00:00:00".to_string(),
            latest_time: ist.with_ymd_and_hms(2025, 5, 10, 0, 0, 0).unwrap(),
        };
        assert_eq!(
            story.source_links(),
            vec![("NDTV", "https://a"), ("TOI", "https://b")]
        );
    }
}
