//! The network leg of every interception.
//!
//! `Network` is the seam the installer and interceptor fetch through;
//! `CurlNetwork` is the libcurl implementation. A response with any HTTP
//! status is a successful attempt; only transport failures are errors.

mod classify;
mod error;
mod parse;
mod transfer;

pub use classify::{classify, FailureKind};
pub use error::NetworkError;
pub use transfer::CurlNetwork;

use crate::http::{Request, Response};
use async_trait::async_trait;

#[async_trait]
pub trait Network: Send + Sync {
    /// Send the request unmodified and return whatever the server answered.
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError>;
}
