//! News source scrapers for fetching conflict coverage from Indian outlets.
//!
//! Each scraper follows a consistent two-phase pattern:
//!
//! 1. **Indexing**: Discover article links (and headlines) from a listing page
//! 2. **Fetching**: Download each article and extract its text and publish time
//!
//! # Supported Sources
//!
//! | Source | Module | Listing | Body | Pre-filter |
//! |--------|--------|---------|------|------------|
//! | NDTV | [`ndtv`] | Operation Sindoor special | meta description | source keywords |
//! | Times of India | [`toi`] | Operation Sindoor topic page | paragraphs | none |
//! | Indian Express | [`indianexpress`] | Latest news | paragraphs | source keywords |
//!
//! HTML parsing happens in synchronous helpers so parsed documents never
//! live across an `.await`. Failed article fetches are logged and skipped;
//! only a failed listing page fails the whole source.

use crate::config::Config;
use crate::error::FetchError;
use crate::http::PageClient;
use crate::models::RawTime;
use crate::pipeline::Fetcher;
use chrono::{DateTime, NaiveDateTime};
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod indianexpress;
pub mod ndtv;
pub mod toi;

/// The news sources this application knows how to scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Ndtv,
    Toi,
    IndianExpress,
}

/// Build one fetcher per configured source, in configuration order.
pub fn build_fetchers(config: &Config, client: Arc<PageClient>) -> Vec<Box<dyn Fetcher>> {
    config
        .sources
        .iter()
        .map(|kind| -> Box<dyn Fetcher> {
            match kind {
                SourceKind::Ndtv => Box::new(ndtv::NdtvScraper::new(
                    Arc::clone(&client),
                    config.source_keywords.clone(),
                )),
                SourceKind::Toi => Box::new(toi::ToiScraper::new(Arc::clone(&client))),
                SourceKind::IndianExpress => Box::new(indianexpress::IndianExpressScraper::new(
                    Arc::clone(&client),
                    config.source_keywords.clone(),
                )),
            }
        })
        .collect()
}

/// Parse a CSS selector, mapping the error into a [`FetchError`].
pub(crate) fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Selector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// Visible text of an element with whitespace-only fragments dropped.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// All `<p>` text of a document joined with spaces.
pub(crate) fn paragraph_text(document: &Html) -> Result<String, FetchError> {
    let p = selector("p")?;
    Ok(document
        .select(&p)
        .map(|el| el.text().collect::<String>())
        .collect::<Vec<_>>()
        .join(" "))
}

/// Machine-readable timestamp from a meta tag or `datetime` attribute.
///
/// RFC 3339 values become [`RawTime::Aware`], zone-less ISO values become
/// [`RawTime::Naive`]; anything else is handed over as text.
pub(crate) fn structured_time(value: &str) -> RawTime {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return RawTime::Aware(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return RawTime::Naive(naive);
        }
    }
    RawTime::Text(value.to_string())
}

/// Best-effort publish time from common article markup.
///
/// Checked in order: the `article:published_time` meta tag, a `<time>`
/// element's `datetime` attribute or text, then any `span`/`div` whose class
/// mentions date, time or publish.
pub(crate) fn extract_publish_time(document: &Html) -> Result<RawTime, FetchError> {
    let meta = selector(r#"meta[property="article:published_time"]"#)?;
    if let Some(content) = document
        .select(&meta)
        .next()
        .and_then(|el| el.value().attr("content"))
        .filter(|c| !c.trim().is_empty())
    {
        return Ok(structured_time(content));
    }

    let time = selector("time")?;
    if let Some(el) = document.select(&time).next() {
        if let Some(dt) = el.value().attr("datetime") {
            return Ok(structured_time(dt));
        }
        return Ok(RawTime::Text(element_text(el)));
    }

    let candidates = selector("span, div")?;
    for el in document.select(&candidates) {
        let class = el.value().classes().collect::<Vec<_>>().join(" ").to_lowercase();
        if ["date", "time", "publish"].iter().any(|k| class.contains(k)) {
            return Ok(RawTime::Text(element_text(el)));
        }
    }

    Ok(RawTime::Unknown)
}

/// Case-insensitive substring check against any keyword.
pub(crate) fn mentions_any(text: &str, keywords: &[String]) -> bool {
    let lower = text.to_lowercase();
    keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
}
