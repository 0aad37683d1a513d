//! Error handling in [`svcat`][crate]
use thiserror::Error;

pub use kube::core::ErrorResponse;

/// Possible errors when working with the service catalog
#[derive(Error, Debug)]
pub enum Error {
    /// Error from the underlying client, including error responses of the apiserver
    #[error("{0}")]
    Kube(#[from] kube::Error),

    /// Failed to infer a config from the environment
    #[error("failed to infer config: {0}")]
    InferConfig(#[from] kube::config::InferConfigError),

    /// Failed to parse the group version a client is built for
    #[error("{0}")]
    ParseGroupVersion(#[from] kube::core::gvk::ParseGroupVersionError),

    /// The default user agent is not a valid header value
    #[error("invalid user agent: {0}")]
    InvalidUserAgent(#[source] http::header::InvalidHeaderValue),

    /// Failed to build a request
    #[error("failed to build request: {0}")]
    BuildRequest(#[source] http::Error),

    /// Failed to serialize a request body
    #[error("failed to serialize body: {0}")]
    SerializeBody(#[source] serde_json::Error),
}

impl Error {
    /// The error response of the apiserver, if that is what failed
    pub fn api_response(&self) -> Option<&ErrorResponse> {
        match self {
            Error::Kube(kube::Error::Api(response)) => Some(response),
            _ => None,
        }
    }
}
