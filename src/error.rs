use thiserror::Error;

/// Failure to retrieve the search-results page. Aborts the run before any
/// state mutation, so the next scheduled run retries cleanly.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Failure to deliver a single notification. Missing fields on a listing are
/// never an error; they degrade to absent values instead.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("telegram request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("telegram api returned {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}
