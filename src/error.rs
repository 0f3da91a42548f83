use thiserror::Error;

/// Failure while fetching or parsing a news source.
///
/// These never reach the aggregation pipeline: the orchestrator logs them
/// and treats the source as having returned no articles.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("{url} returned no usable content")]
    EmptyPage { url: String },
}
