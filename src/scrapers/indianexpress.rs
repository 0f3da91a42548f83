//! Indian Express latest-news scraper.
//!
//! The latest-news page is not topic specific, so articles are only kept
//! when their text mentions one of the source keywords. Publish times are
//! found with the generic markup heuristics in [`super::extract_publish_time`].

use super::{element_text, extract_publish_time, mentions_any, paragraph_text, selector};
use crate::error::FetchError;
use crate::http::{FetchPage, PageClient};
use crate::models::{RawArticle, RawTime};
use crate::pipeline::Fetcher;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use scraper::Html;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use url::Url;

const LISTING_URL: &str = "https://indianexpress.com/latest-news/";
const SOURCE: &str = "Indian Express";

#[derive(Debug)]
pub struct IndianExpressScraper {
    client: Arc<PageClient>,
    keywords: Vec<String>,
}

impl IndianExpressScraper {
    pub fn new(client: Arc<PageClient>, keywords: Vec<String>) -> Self {
        Self { client, keywords }
    }

    /// Fetch the latest-news page and return `(headline, url)` pairs.
    #[instrument(level = "info", skip_all)]
    pub async fn index_articles(&self) -> Result<Vec<(String, String)>, FetchError> {
        let html = self.client.get(LISTING_URL).await?;
        let links = parse_listing(&html, &Url::parse(LISTING_URL)?)?;
        if links.is_empty() {
            return Err(FetchError::EmptyPage {
                url: LISTING_URL.to_string(),
            });
        }
        info!(count = links.len(), source = LISTING_URL, "Indexed Indian Express article URLs");
        Ok(links)
    }

    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch_article(&self, headline: String, url: String) -> Result<Option<RawArticle>, FetchError> {
        let html = self.client.get(&url).await?;
        let (body, published_at) = parse_article(&html)?;

        if body.trim().is_empty() || !mentions_any(&body, &self.keywords) {
            debug!("Indian Express article skipped by source keyword check");
            return Ok(None);
        }

        Ok(Some(RawArticle {
            headline,
            body,
            published_at,
            source: SOURCE.to_string(),
            url,
        }))
    }
}

#[async_trait]
impl Fetcher for IndianExpressScraper {
    fn source(&self) -> &str {
        SOURCE
    }

    async fn fetch(&self) -> Result<Vec<RawArticle>, FetchError> {
        let links = self.index_articles().await?;
        let articles: Vec<RawArticle> = stream::iter(links)
            .then(|(headline, url)| async move {
                match self.fetch_article(headline, url.clone()).await {
                    Ok(opt) => opt,
                    Err(e) => {
                        error!(error = %e, %url, "Indian Express fetch failed");
                        None
                    }
                }
            })
            .filter_map(|opt| async move { opt })
            .collect()
            .await;

        info!(count = articles.len(), "Fetched Indian Express article contents");
        Ok(articles)
    }
}

fn parse_listing(html: &str, base: &Url) -> Result<Vec<(String, String)>, FetchError> {
    let document = Html::parse_document(html);
    let anchors = selector(".articles a[href]")?;

    Ok(document
        .select(&anchors)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            let resolved = base.join(href).ok()?;
            Some((element_text(a), resolved.to_string()))
        })
        .collect())
}

fn parse_article(html: &str) -> Result<(String, RawTime), FetchError> {
    let document = Html::parse_document(html);
    Ok((paragraph_text(&document)?, extract_publish_time(&document)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_resolves_relative_links() {
        let html = r#"<div class="articles">
            <a href="/article/india/blackout-in-amritsar-123/">Blackout in Amritsar</a>
            <a href="https://indianexpress.com/article/sports/ipl-456/"> IPL suspended </a>
        </div><a href="/outside">Outside</a>"#;
        let links = parse_listing(html, &Url::parse(LISTING_URL).unwrap()).unwrap();
        assert_eq!(
            links,
            vec![
                (
                    "Blackout in Amritsar".to_string(),
                    "https://indianexpress.com/article/india/blackout-in-amritsar-123/".to_string()
                ),
                (
                    "IPL suspended".to_string(),
                    "https://indianexpress.com/article/sports/ipl-456/".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_parse_article() {
        let html = r#"<html><head>
            <meta property="article:published_time" content="2025-05-10T09:00:00+05:30">
        </head><body><p>Blackout ordered after drone sightings near the border.</p></body></html>"#;
        let (body, time) = parse_article(html).unwrap();
        assert_eq!(body, "Blackout ordered after drone sightings near the border.");
        assert_eq!(
            time,
            RawTime::Aware(chrono::DateTime::parse_from_rfc3339("2025-05-10T09:00:00+05:30").unwrap())
        );
    }
}
