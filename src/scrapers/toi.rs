//! Times of India Operation Sindoor scraper.
//!
//! The topic page links stories through card anchors whose `figcaption`
//! carries the headline. Article pages only expose their time as an
//! `"Updated: ..."` label inside a `<span>`; stories without one are skipped.

use super::{element_text, paragraph_text, selector};
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

const LISTING_URL: &str = "https://timesofindia.indiatimes.com/india/operation-sindoor";
const SOURCE: &str = "TOI";
const UPDATED_LABEL: &str = "Updated:";

#[derive(Debug)]
pub struct ToiScraper {
    client: Arc<PageClient>,
}

impl ToiScraper {
    pub fn new(client: Arc<PageClient>) -> Self {
        Self { client }
    }

    /// Fetch the topic page and return `(headline, url)` pairs.
    #[instrument(level = "info", skip_all)]
    pub async fn index_articles(&self) -> Result<Vec<(String, String)>, FetchError> {
        let html = self.client.get(LISTING_URL).await?;
        let links = parse_listing(&html, &Url::parse(LISTING_URL)?)?;
        if links.is_empty() {
            return Err(FetchError::EmptyPage {
                url: LISTING_URL.to_string(),
            });
        }
        info!(count = links.len(), source = LISTING_URL, "Indexed TOI article URLs");
        Ok(links)
    }

    /// Fetch a single TOI article.
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch_article(&self, headline: String, url: String) -> Result<Option<RawArticle>, FetchError> {
        let html = self.client.get(&url).await?;
        let (body, updated) = parse_article(&html)?;

        let Some(updated) = updated else {
            debug!("TOI article has no update label; skipping");
            return Ok(None);
        };

        Ok(Some(RawArticle {
            headline,
            body,
            published_at: RawTime::Text(updated),
            source: SOURCE.to_string(),
            url,
        }))
    }
}

#[async_trait]
impl Fetcher for ToiScraper {
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
                        error!(error = %e, %url, "TOI fetch failed");
                        None
                    }
                }
            })
            .filter_map(|opt| async move { opt })
            .collect()
            .await;

        info!(count = articles.len(), "Fetched TOI article contents");
        Ok(articles)
    }
}

/// Card links with their caption headline (`"NA"` when the card has none).
fn parse_listing(html: &str, base: &Url) -> Result<Vec<(String, String)>, FetchError> {
    let document = Html::parse_document(html);
    let cards = selector("a.Hn2z7")?;
    let caption = selector("figcaption")?;

    let mut links = Vec::new();
    for card in document.select(&cards) {
        let Some(href) = card.value().attr("href") else {
            continue;
        };
        let headline = card
            .select(&caption)
            .next()
            .map(element_text)
            .unwrap_or_else(|| "NA".to_string());
        if let Ok(resolved) = base.join(href) {
            links.push((headline, resolved.to_string()));
        }
    }
    Ok(links)
}

/// `(paragraph text, update label)` from an article page.
fn parse_article(html: &str) -> Result<(String, Option<String>), FetchError> {
    let document = Html::parse_document(html);
    let body = paragraph_text(&document)?;
    let span = selector("span")?;

    let updated = document.select(&span).find_map(|el| {
        let text = element_text(el);
        text.find(UPDATED_LABEL)
            .map(|idx| text[idx + UPDATED_LABEL.len()..].trim().to_string())
            .filter(|t| !t.is_empty())
    });

    Ok((body, updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing() {
        let html = r#"<div>
            <a class="Hn2z7" href="/india/drone-attack/articleshow/1.cms">
              <figure><figcaption class="sNF1c">Drone attack foiled in Jammu</figcaption></figure>
            </a>
            <a class="Hn2z7" href="https://timesofindia.indiatimes.com/india/2.cms"><img/></a>
            <a class="Hn2z7">no href</a>
            <a class="other" href="/skip">Skip</a>
        </div>"#;
        let links = parse_listing(html, &Url::parse(LISTING_URL).unwrap()).unwrap();
        assert_eq!(
            links,
            vec![
                (
                    "Drone attack foiled in Jammu".to_string(),
                    "https://timesofindia.indiatimes.com/india/drone-attack/articleshow/1.cms".to_string()
                ),
                (
                    "NA".to_string(),
                    "https://timesofindia.indiatimes.com/india/2.cms".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_parse_article_with_update_label() {
        let html = r#"<html><body>
            <span>TOI.in</span><span>Updated: May 10, 2025, 14:32 IST</span>
            <p>Army says drones were intercepted.</p><p>More follows.</p>
        </body></html>"#;
        let (body, updated) = parse_article(html).unwrap();
        assert_eq!(body, "Army says drones were intercepted. More follows.");
        assert_eq!(updated.as_deref(), Some("May 10, 2025, 14:32 IST"));
    }

    #[test]
    fn test_parse_article_without_label() {
        let (body, updated) = parse_article("<p>Only text</p><span>Share</span>").unwrap();
        assert_eq!(body, "Only text");
        assert!(updated.is_none());
    }
}
