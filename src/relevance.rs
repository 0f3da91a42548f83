//! Topical relevance filtering.
//!
//! An article is kept when its headline, or failing that the start of its
//! body, contains a word that approximately matches one of the configured
//! topic keywords. Headlines are short and curated, so they are held to a
//! stricter threshold than body prose.
//!
//! Matching is per token: the text is lowercased and split into `\w+` words,
//! and every keyword is scored against every word. Scores are on a 0-100
//! scale and must be strictly greater than the threshold to count.

use crate::config::Config;
use crate::models::RawArticle;
use crate::utils::{char_prefix, truncate_for_log};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w+\b").unwrap());

/// Approximate string similarity used to compare keywords with words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scorer {
    /// Normalized Indel similarity: `2 * LCS / (|a| + |b|)`.
    #[default]
    Ratio,
    /// Normalized Levenshtein similarity.
    Levenshtein,
    /// Jaro-Winkler similarity.
    JaroWinkler,
}

impl Scorer {
    /// Similarity between `a` and `b` on a 0-100 scale.
    pub fn score(self, a: &str, b: &str) -> f64 {
        match self {
            Scorer::Ratio => ratio(a, b),
            Scorer::Levenshtein => strsim::normalized_levenshtein(a, b) * 100.0,
            Scorer::JaroWinkler => strsim::jaro_winkler(a, b) * 100.0,
        }
    }
}

/// Indel-based similarity ratio, 0-100.
///
/// Two empty strings are identical (100).
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    let lcs = lcs_len(&a, &b);
    100.0 * (2 * lcs) as f64 / total as f64
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                cur[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// Lowercase `text` and split it into word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD.find_iter(&lower).map(|m| m.as_str().to_string()).collect()
}

/// Keyword-based relevance filter.
#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    keywords: Vec<String>,
    headline_threshold: f64,
    body_threshold: f64,
    prefix_len: usize,
    scorer: Scorer,
}

impl RelevanceFilter {
    /// Build a filter from explicit settings. Keywords are lowercased.
    pub fn new(
        keywords: impl IntoIterator<Item = impl AsRef<str>>,
        headline_threshold: f64,
        body_threshold: f64,
        prefix_len: usize,
        scorer: Scorer,
    ) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            headline_threshold,
            body_threshold,
            prefix_len,
            scorer,
        }
    }

    /// Build a filter from the application configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.keywords,
            config.headline_threshold,
            config.body_threshold,
            config.summary_len,
            config.scorer,
        )
    }

    /// Best `(keyword, score)` over all keyword/token pairs in `text`.
    ///
    /// Returns `None` when the text has no tokens or no keywords are configured.
    pub fn best_match(&self, text: &str) -> Option<(&str, f64)> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return None;
        }
        self.keywords
            .iter()
            .map(|kw| {
                let best = tokens
                    .iter()
                    .map(|t| self.scorer.score(kw, t))
                    .fold(0.0_f64, f64::max);
                (kw.as_str(), best)
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// True when some keyword scores strictly above `threshold` against `text`.
    pub fn matches(&self, text: &str, threshold: f64) -> bool {
        self.best_match(text).is_some_and(|(_, score)| score > threshold)
    }

    /// Headline check at the strict threshold, else body-prefix check at the loose one.
    pub fn is_relevant(&self, headline: &str, body: &str) -> bool {
        self.matches(headline, self.headline_threshold)
            || self.matches(char_prefix(body, self.prefix_len), self.body_threshold)
    }

    /// Keep only relevant articles, preserving order.
    #[instrument(level = "info", skip_all, fields(input = articles.len()))]
    pub fn filter(&self, articles: Vec<RawArticle>) -> Vec<RawArticle> {
        let total = articles.len();
        let kept: Vec<RawArticle> = articles
            .into_iter()
            .filter(|a| {
                let keep = self.is_relevant(&a.headline, &a.body);
                if !keep {
                    debug!(
                        headline = %truncate_for_log(&a.headline, 120),
                        source = %a.source,
                        "Dropped irrelevant article"
                    );
                }
                keep
            })
            .collect();
        info!(kept = kept.len(), dropped = total - kept.len(), "Relevance filter applied");
        kept
    }
}
