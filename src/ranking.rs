//! Recency ranking and presentation finalization.

use crate::models::{PublishedStory, Story};
use indexmap::{IndexMap, IndexSet};
use tracing::{info, instrument};

/// Display format for story and refresh times.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Sort stories newest first, keep the first `limit`, and finalize them.
///
/// The sort is stable, so stories with equal times keep their grouping
/// order. Sources and URLs are deduplicated only here, after ranking.
#[instrument(level = "info", skip_all, fields(stories = stories.len(), limit = limit))]
pub fn rank_and_trim(stories: IndexMap<String, Story>, limit: usize) -> Vec<PublishedStory> {
    let mut ranked: Vec<(String, Story)> = stories.into_iter().collect();
    ranked.sort_by(|a, b| b.1.latest_time.cmp(&a.1.latest_time));
    ranked.truncate(limit);

    let published: Vec<PublishedStory> = ranked
        .into_iter()
        .map(|(headline, story)| finalize(headline, story))
        .collect();
    info!(published = published.len(), "Ranked stories");
    published
}

fn finalize(headline: String, story: Story) -> PublishedStory {
    PublishedStory {
        headline,
        summary: story.summary,
        headlines: story.headlines,
        sources: story.sources.into_iter().collect::<IndexSet<_>>(),
        urls: story.urls.into_iter().collect::<IndexSet<_>>(),
        time: story.latest_time.format(TIME_FORMAT).to_string(),
        latest_time: story.latest_time,
    }
}
