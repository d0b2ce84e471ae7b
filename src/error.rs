use std::path::PathBuf;

use actix_web::http::StatusCode;
use thiserror::Error;

/// Everything that can fail while looking up the owners of a pull request.
///
/// Every variant is fatal to the page being rendered; nothing here is retried
/// and there is no fallback endpoint.
#[derive(Debug, Error)]
pub enum OwnersError {
    /// The plugin configuration file couldn't be read.
    #[error("failed to read plugin configuration {path:?}: {source}")]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The plugin configuration file isn't valid YAML, or has the wrong shape.
    #[error("failed to parse plugin configuration {path:?}: {source}")]
    ConfigMalformed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    /// An entry of the plugin configuration has no usable owners endpoint.
    #[error("invalid plugin configuration {path:?}: ti-community-lgtm entry {index}: {reason}")]
    ConfigInvalid {
        path: PathBuf,
        index: usize,
        reason: String,
    },
    /// The outbound HTTP client couldn't be set up.
    #[error("failed to build the owners HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// Neither a plugin configuration nor a static base URL was configured.
    #[error("no owners upstream is configured")]
    MissingUpstream,
    /// No routing entry matches the repository.
    #[error("can not find the owners endpoint of {org}/{repo}")]
    EndpointNotFound { org: String, repo: String },
    /// The configured endpoint isn't an absolute URL.
    #[error("invalid owners endpoint \"{endpoint}\": {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    /// The owners service couldn't be reached, or answered with garbage.
    #[error("failed to fetch owners from {url}: {source}")]
    UpstreamFetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The owners service answered with a non-success status.
    #[error("owners service at {url} responded with status {status}")]
    UpstreamStatus { url: String, status: u16 },
    /// The source has no owners for this pull request.
    #[error("no owners found for {0}")]
    PullNotFound(String),
}

impl OwnersError {
    /// Status code of the error page shown for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::EndpointNotFound { .. } | Self::PullNotFound(_) => StatusCode::NOT_FOUND,
            Self::UpstreamFetchFailed { .. } | Self::UpstreamStatus { .. } => {
                StatusCode::BAD_GATEWAY
            }
            Self::ConfigUnreadable { .. }
            | Self::ConfigMalformed { .. }
            | Self::ConfigInvalid { .. }
            | Self::MissingUpstream
            | Self::HttpClient(_)
            | Self::InvalidEndpoint { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
