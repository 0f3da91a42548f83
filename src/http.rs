//! Page fetching with exponential backoff retry logic.
//!
//! Scrapers download listing and article pages through the [`FetchPage`]
//! trait. The production stack is a [`RetryFetch`] decorator wrapped around
//! an [`HttpPage`] client, so transient network failures and 5xx responses do
//! not immediately empty a source for the whole refresh cycle.
//!
//! # Retry Strategy
//!
//! - Configurable number of retries after the first attempt
//! - Exponential backoff starting at the configured base delay
//! - Maximum delay capped at 10 seconds
//! - Random jitter (0-250ms) added to every delay

use crate::config::HttpConfig;
use crate::error::FetchError;
use rand::{Rng, rng};
use std::fmt;
use std::future::Future;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Something that can download a page as text.
pub trait FetchPage {
    /// Fetch `url` and return the response body.
    fn get(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Plain `reqwest` client with the configured user agent and timeout.
#[derive(Debug, Clone)]
pub struct HttpPage {
    client: reqwest::Client,
}

impl HttpPage {
    /// Build the underlying HTTP client.
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(StdDuration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

impl FetchPage for HttpPage {
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!(%url, bytes = body.len(), elapsed_ms = t0.elapsed().as_millis() as u64, "Fetched page");
        Ok(body)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`FetchPage`] implementation.
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    /// The underlying page fetcher to wrap.
    inner: T,
    /// Maximum number of retry attempts before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: FetchPage,
{
    /// Create a new retry wrapper around an existing [`FetchPage`] implementation.
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(10),
        }
    }
}

impl<T> RetryFetch<T> {
    /// Delay before retry number `attempt` (1-based), without jitter.
    fn backoff(&self, attempt: usize) -> StdDuration {
        let factor = u32::try_from(attempt.saturating_sub(1))
            .ok()
            .and_then(|shift| 1u32.checked_shl(shift))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> FetchPage for RetryFetch<T>
where
    T: FetchPage + Sync,
{
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get(&self, url: &str) -> Result<String, FetchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.get(url).await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    attempt += 1;
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_dt.as_millis() as u64,
                            error = %e,
                            "get() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.backoff(attempt);
                    let jitter_ms: u64 = rng().random_range(0..=250);
                    let delay = delay + StdDuration::from_millis(jitter_ms);

                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_total = total_dt.as_millis() as u64,
                        ?delay,
                        error = %e,
                        "get() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// The page client every scraper shares.
pub type PageClient = RetryFetch<HttpPage>;

/// Build the shared page client from configuration.
pub fn page_client(config: &HttpConfig) -> Result<PageClient, FetchError> {
    Ok(RetryFetch::new(
        HttpPage::new(config)?,
        config.max_retries,
        StdDuration::from_millis(config.base_delay_ms),
    ))
}
