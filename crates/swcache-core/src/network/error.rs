use thiserror::Error;

/// A network attempt that did not produce a response.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// libcurl reported a transport failure (DNS, connect, timeout, empty reply).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    #[error("invalid request url {0}")]
    InvalidUrl(String),
    /// The blocking transfer task panicked or was cancelled.
    #[error("network worker failed: {0}")]
    Worker(String),
    #[error("network unreachable")]
    Offline,
}
