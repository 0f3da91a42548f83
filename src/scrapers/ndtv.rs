//! NDTV Operation Sindoor scraper.
//!
//! The special coverage page groups stories into widget boxes, each holding
//! one or more headline links. NDTV article pages are heavy, so the body is
//! taken from the `description` meta tag rather than the full text.
//!
//! Publish times come from the `publish-date` meta tag or, on older
//! templates, the byline date block. Values that carry an `IST` suffix are
//! cut to their first 18 characters (`"May 10, 2025 14:32"`).

use super::{element_text, mentions_any, selector, structured_time};
use crate::error::FetchError;
use crate::http::{FetchPage, PageClient};
use crate::models::{RawArticle, RawTime};
use crate::pipeline::Fetcher;
use crate::utils::char_prefix;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use scraper::Html;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

const LISTING_URL: &str = "https://special.ndtv.com/operation-sindoor-200/news";
const SOURCE: &str = "NDTV";

#[derive(Debug)]
pub struct NdtvScraper {
    client: Arc<PageClient>,
    keywords: Vec<String>,
}

impl NdtvScraper {
    pub fn new(client: Arc<PageClient>, keywords: Vec<String>) -> Self {
        Self { client, keywords }
    }

    /// Fetch the listing page and return `(headline, url)` pairs.
    #[instrument(level = "info", skip_all)]
    pub async fn index_articles(&self) -> Result<Vec<(String, String)>, FetchError> {
        let html = self.client.get(LISTING_URL).await?;
        let links = parse_listing(&html, &Url::parse(LISTING_URL)?)?;
        if links.is_empty() {
            return Err(FetchError::EmptyPage {
                url: LISTING_URL.to_string(),
            });
        }
        info!(count = links.len(), source = LISTING_URL, "Indexed NDTV article URLs");
        debug!(links = ?links, "NDTV links");
        Ok(links)
    }

    /// Fetch a single NDTV article.
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch_article(&self, headline: String, url: String) -> Result<Option<RawArticle>, FetchError> {
        let html = self.client.get(&url).await?;
        let (description, date) = parse_article(&html)?;

        if description.is_empty() || !mentions_any(&description, &self.keywords) {
            debug!("NDTV article skipped by source keyword check");
            return Ok(None);
        }

        Ok(Some(RawArticle {
            headline,
            body: description,
            published_at: date.as_deref().map_or(RawTime::Unknown, structured_time),
            source: SOURCE.to_string(),
            url,
        }))
    }
}

#[async_trait]
impl Fetcher for NdtvScraper {
    fn source(&self) -> &str {
        SOURCE
    }

    async fn fetch(&self) -> Result<Vec<RawArticle>, FetchError> {
        let links = self.index_articles().await?;
        let articles: Vec<RawArticle> = stream::iter(links)
            .then(|(headline, url)| async move {
                match self.fetch_article(headline, url.clone()).await {
                    Ok(Some(article)) => Some(article),
                    Ok(None) => None,
                    Err(e) => {
                        error!(error = %e, %url, "NDTV fetch failed");
                        None
                    }
                }
            })
            .filter_map(|opt| async move { opt })
            .collect()
            .await;

        if articles.is_empty() {
            warn!("NDTV produced no articles");
        }
        info!(count = articles.len(), "Fetched NDTV article contents");
        Ok(articles)
    }
}

/// Headline links from the widget boxes, deduplicated by headline.
///
/// A headline listed twice keeps its first position and its last link.
fn parse_listing(html: &str, base: &Url) -> Result<Vec<(String, String)>, FetchError> {
    let document = Html::parse_document(html);
    let boxes = selector("div.nshp_widget_boxwrap")?;
    let titles = selector("h1.nshp_news_headline, div.nshp_news_headline")?;
    let anchor = selector("a[href]")?;

    let mut links: IndexMap<String, String> = IndexMap::new();
    for widget in document.select(&boxes) {
        for title in widget.select(&titles) {
            let Some(a) = title.select(&anchor).next() else {
                continue;
            };
            let Some(href) = a.value().attr("href") else {
                continue;
            };
            let headline = element_text(a);
            if let Ok(resolved) = base.join(href) {
                links.insert(headline, resolved.to_string());
            }
        }
    }
    Ok(links.into_iter().collect())
}

/// `(description, publish date)` from an article page.
fn parse_article(html: &str) -> Result<(String, Option<String>), FetchError> {
    let document = Html::parse_document(html);
    let description = selector(r#"meta[name="description"]"#)?;
    let publish_meta = selector(r#"meta[name="publish-date"]"#)?;
    let byline_date = selector("div.pst-by_lnk-dt")?;

    let desc = document
        .select(&description)
        .next()
        .and_then(|el| el.value().attr("content"))
        .unwrap_or_default()
        .trim()
        .to_string();

    let date = document
        .select(&publish_meta)
        .next()
        .or_else(|| document.select(&byline_date).next())
        .map(|el| match el.value().attr("content") {
            Some(content) => content.to_string(),
            None => element_text(el),
        })
        .map(|date| {
            if date.contains("IST") {
                char_prefix(&date, 18).to_string()
            } else {
                date
            }
        });

    Ok((desc, date))
}
