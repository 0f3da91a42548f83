//! The aggregation pipeline: fetch → filter → group → rank.
//!
//! [`Pipeline::run`] is the single entry point the background refresher
//! calls. Each run starts from scratch; nothing is carried between runs.
//!
//! Sources are abstracted behind [`Fetcher`]. A fetcher may fail, but the
//! failure stops at this boundary: it is logged and the source contributes
//! no articles, so every run produces a well-formed (possibly empty) result.

use crate::config::Config;
use crate::error::FetchError;
use crate::grouping::Grouper;
use crate::models::{PublishedStory, RawArticle, Snapshot};
use crate::ranking::rank_and_trim;
use crate::relevance::RelevanceFilter;
use crate::time::TimeNormalizer;
use async_trait::async_trait;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// A news source that produces raw articles.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Display name of the source, e.g. `"NDTV"`.
    fn source(&self) -> &str;

    /// Fetch the source's current articles.
    async fn fetch(&self) -> Result<Vec<RawArticle>, FetchError>;
}

/// Filter, grouping and ranking settings plus the sources to pull from.
pub struct Pipeline {
    filter: RelevanceFilter,
    grouper: Grouper,
    normalizer: TimeNormalizer,
    max_stories: usize,
    fetchers: Vec<Box<dyn Fetcher>>,
}

impl Pipeline {
    pub fn new(config: &Config, fetchers: Vec<Box<dyn Fetcher>>) -> Self {
        let normalizer = TimeNormalizer::new(config.offset());
        Self {
            filter: RelevanceFilter::from_config(config),
            grouper: Grouper::new(normalizer, config.summary_len),
            normalizer,
            max_stories: config.max_stories,
            fetchers,
        }
    }

    /// Names of the configured sources, in fetch order.
    pub fn sources(&self) -> Vec<&str> {
        self.fetchers.iter().map(|f| f.source()).collect()
    }

    /// Invoke every fetcher in order and concatenate the results.
    ///
    /// A failing fetcher contributes nothing.
    #[instrument(level = "info", skip_all, fields(fetchers = self.fetchers.len()))]
    pub async fn collect(&self) -> Vec<RawArticle> {
        let mut all = Vec::new();
        for fetcher in &self.fetchers {
            match fetcher.fetch().await {
                Ok(articles) => {
                    info!(source = fetcher.source(), count = articles.len(), "Fetched articles");
                    all.extend(articles);
                }
                Err(e) => {
                    warn!(source = fetcher.source(), error = %e, "Fetcher failed; treating as empty");
                }
            }
        }
        info!(count = all.len(), "Total articles collected");
        all
    }

    /// Filter, group and rank an already-collected batch of articles.
    pub fn aggregate(&self, articles: Vec<RawArticle>) -> Vec<PublishedStory> {
        let relevant = self.filter.filter(articles);
        let grouped = self.grouper.group(&relevant);
        rank_and_trim(grouped, self.max_stories)
    }

    /// Run the whole pipeline once.
    #[instrument(level = "info", skip_all)]
    pub async fn run(&self) -> Vec<PublishedStory> {
        let t0 = Instant::now();
        let articles = self.collect().await;
        let stories = self.aggregate(articles);
        info!(
            stories = stories.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Pipeline run complete"
        );
        stories
    }

    /// Run the pipeline and stamp the result with the completion time.
    pub async fn snapshot(&self) -> Snapshot {
        let stories = self.run().await;
        Snapshot {
            refreshed_at: self.normalizer.now(),
            stories,
        }
    }
}
