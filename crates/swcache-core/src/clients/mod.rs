//! Client contexts: the pages a shared file is delivered to, and the set
//! of open clients an activating version claims.

mod message;
mod registry;

pub use message::{ClientMessage, SharedFile};
pub use registry::{ClientReceiver, ClientRegistry};

use crate::http::Request;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Opaque client context identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The client context closed before the message could be delivered.
#[derive(Debug, Error)]
#[error("client {0} is gone")]
pub struct ClientGone(pub ClientId);

#[async_trait]
pub trait ClientContext: Send + Sync {
    fn id(&self) -> &ClientId;

    /// One-shot delivery. A closed context yields `ClientGone`, never a panic.
    async fn post_message(&self, message: ClientMessage) -> Result<(), ClientGone>;
}

#[async_trait]
pub trait Clients: Send + Sync {
    /// The context that the navigation caused by `request` lands in, if it exists.
    async fn resolve_originating(&self, request: &Request) -> Option<Arc<dyn ClientContext>>;

    /// Make `controller` the controller of every open client.
    /// Returns how many clients changed controller.
    async fn claim(&self, controller: &str) -> usize;
}
