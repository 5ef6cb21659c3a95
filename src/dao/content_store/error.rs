//! Error types shared by the REST content-store implementation.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`RestDaoError`] failures.
pub type RestResult<T> = Result<T, RestDaoError>;

/// Failures that can occur while talking to the content store's REST surface.
#[derive(Debug, Error)]
pub enum RestDaoError {
    /// Required environment variable is missing.
    #[error("missing content store environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build content store client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request to a table or storage endpoint could not be sent.
    #[error("failed to send content store request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The store returned an unexpected status code.
    #[error("unexpected content store response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be parsed into the expected JSON shape.
    #[error("failed to decode content store response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The blob service accepted an upload but returned no usable URL.
    #[error("blob upload for `{path}` returned no URL")]
    BlobMissingUrl { path: String },
}
