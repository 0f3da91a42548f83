//! Content-based story grouping.
//!
//! The same wire story is often republished by several outlets under
//! different headlines. Grouping keys every article by a fingerprint of its
//! normalized body prefix, so those copies collapse into a single [`Story`]
//! regardless of source or headline.
//!
//! # Algorithm
//!
//! For each article, in input order:
//! 1. Take the first `summary_len` characters of the body as the summary
//! 2. Lowercase and collapse whitespace, then hash it into a [`Fingerprint`]
//! 3. Normalize the publication time
//! 4. Seed a new story, or append headline/url/source to the existing one and
//!    keep the latest time
//!
//! The display headline is the first headline seen for a fingerprint and
//! never changes. Unrelated stories whose prefixes hash equal are merged;
//! collisions are neither detected nor reported.

use crate::models::{RawArticle, Story};
use crate::time::TimeNormalizer;
use crate::utils::{char_prefix, normalize_whitespace};
use indexmap::IndexMap;
use indexmap::map::Entry;
use std::fmt;
use tracing::{debug, info, instrument};

/// Deterministic hash of a normalized summary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Fingerprint a summary: normalize it, then take its MD5 hex digest.
    pub fn of_summary(summary: &str) -> Self {
        let normalized = normalize_whitespace(summary);
        Fingerprint(format!("{:x}", md5::compute(normalized.as_bytes())))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Groups articles into stories by content fingerprint.
#[derive(Debug, Clone, Copy)]
pub struct Grouper {
    normalizer: TimeNormalizer,
    summary_len: usize,
}

impl Grouper {
    pub fn new(normalizer: TimeNormalizer, summary_len: usize) -> Self {
        Self {
            normalizer,
            summary_len,
        }
    }

    /// Partition articles by fingerprint, in first-seen order.
    #[instrument(level = "info", skip_all, fields(input = articles.len()))]
    pub fn group_by_fingerprint(&self, articles: &[RawArticle]) -> IndexMap<Fingerprint, Story> {
        let mut groups: IndexMap<Fingerprint, Story> = IndexMap::new();

        for article in articles {
            let summary = char_prefix(&article.body, self.summary_len);
            let key = Fingerprint::of_summary(summary);
            let time = self.normalizer.normalize(&article.published_at);

            match groups.entry(key) {
                Entry::Occupied(mut entry) => {
                    debug!(
                        fingerprint = %entry.key(),
                        headline = %article.headline,
                        source = %article.source,
                        "Merging article into existing story"
                    );
                    entry.get_mut().absorb(article, time);
                }
                Entry::Vacant(entry) => {
                    entry.insert(Story::seed(article, summary.to_string(), time));
                }
            }
        }

        info!(stories = groups.len(), "Grouped articles into stories");
        groups
    }

    /// Group articles and key the stories by display headline.
    ///
    /// See [`key_by_headline`] for how equal display headlines are resolved.
    pub fn group(&self, articles: &[RawArticle]) -> IndexMap<String, Story> {
        key_by_headline(self.group_by_fingerprint(articles))
    }
}

/// Re-key stories by their display headline.
///
/// When two stories share a display headline, the later one replaces the
/// earlier's value but keeps the earlier's position.
pub fn key_by_headline(groups: IndexMap<Fingerprint, Story>) -> IndexMap<String, Story> {
    let mut out = IndexMap::with_capacity(groups.len());
    for story in groups.into_values() {
        if let Some(replaced) = out.insert(story.display_headline.clone(), story) {
            debug!(headline = %replaced.display_headline, "Display headline shared by two stories; keeping the later");
        }
    }
    out
}
