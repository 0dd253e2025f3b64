use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to build http client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),

    #[error("server url {0} cannot carry path segments")]
    BaseUrl(Url),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: Url, status: StatusCode },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
