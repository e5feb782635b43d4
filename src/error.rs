use reqwest::{StatusCode, Url};
use thiserror::Error;

/// Everything that can end a search run. None of these are retried.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("{0}")]
    Config(String),

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {code} {url}", code = .status.as_u16())]
    Status { status: StatusCode, url: Url },

    #[error("malformed response from {url}: {source}")]
    Decode {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to encode results: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SearchError>;
