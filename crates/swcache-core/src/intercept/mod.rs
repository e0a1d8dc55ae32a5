//! Interceptor: classify every request and resolve it.
//!
//! Share submissions (`POST` to a URL containing the share path) are
//! answered with an immediate redirect while the shared file is delivered
//! in a background task. Everything else goes network-first with the
//! active cache generation as fallback.

mod fetch;
mod share;
mod task;

pub use share::share_request;
pub use task::{BackgroundTask, BoxFuture, Handled};

use crate::cache::{CacheStorage, StoreError};
use crate::clients::Clients;
use crate::config::AgentConfig;
use crate::http::Request;
use crate::network::{Network, NetworkError};
use anyhow::{Context, Result};
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Which path a request took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    ShareTarget,
    NetworkFirst,
    /// Version not in control yet: network only, no cache fallback.
    Passthrough,
}

impl Route {
    pub fn as_str(self) -> &'static str {
        match self {
            Route::ShareTarget => "share-target",
            Route::NetworkFirst => "network-first",
            Route::Passthrough => "passthrough",
        }
    }
}

/// The request stays unresolved.
#[derive(Debug, Error)]
pub enum InterceptError {
    #[error("{url}: network failed and nothing is cached: {source}")]
    Unresolved {
        url: String,
        #[source]
        source: NetworkError,
    },
    #[error("{url}: network failed and cache lookup errored: {source}")]
    Cache {
        url: String,
        #[source]
        source: StoreError,
    },
}

/// Stateless per request; cheap to clone into the futures it returns.
#[derive(Clone)]
pub struct Interceptor {
    config: Arc<AgentConfig>,
    storage: CacheStorage,
    network: Arc<dyn Network>,
    clients: Arc<dyn Clients>,
    redirect: Url,
}

impl Interceptor {
    pub fn new(
        config: Arc<AgentConfig>,
        storage: CacheStorage,
        network: Arc<dyn Network>,
        clients: Arc<dyn Clients>,
    ) -> Result<Self> {
        let redirect = config
            .origin_url()?
            .join(&config.share_redirect)
            .with_context(|| format!("invalid share_redirect {:?}", config.share_redirect))?;
        Ok(Self {
            config,
            storage,
            network,
            clients,
            redirect,
        })
    }

    pub fn classify(&self, request: &Request) -> Route {
        if request.url.as_str().contains(&self.config.share_path) && request.method == "POST" {
            Route::ShareTarget
        } else {
            Route::NetworkFirst
        }
    }

    pub fn intercept(&self, request: Request) -> Handled {
        let route = self.classify(&request);
        tracing::debug!(
            route = route.as_str(),
            method = %request.method,
            url = %request.url,
            "intercepted"
        );
        match route {
            Route::ShareTarget => self.share_target(request),
            Route::NetworkFirst => self.network_first(request),
            Route::Passthrough => self.passthrough(request),
        }
    }
}
