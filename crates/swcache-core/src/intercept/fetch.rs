//! Network-first path with cache fallback.

use super::{Handled, InterceptError, Interceptor, Route};
use crate::http::{Request, Response};
use crate::network::classify;

impl Interceptor {
    pub(super) fn network_first(&self, request: Request) -> Handled {
        let this = self.clone();
        Handled {
            route: Route::NetworkFirst,
            response: Box::pin(async move { this.network_then_cache(request).await }),
            background: Vec::new(),
        }
    }

    /// Network only. Used while this version does not control the client.
    pub fn passthrough(&self, request: Request) -> Handled {
        let network = self.network.clone();
        Handled {
            route: Route::Passthrough,
            response: Box::pin(async move {
                network
                    .fetch(&request)
                    .await
                    .map_err(|source| InterceptError::Unresolved {
                        url: request.url.to_string(),
                        source,
                    })
            }),
            background: Vec::new(),
        }
    }

    /// The network attempt settles fully before the cache is consulted.
    async fn network_then_cache(&self, request: Request) -> Result<Response, InterceptError> {
        let network_err = match self.network.fetch(&request).await {
            Ok(response) => return Ok(response),
            Err(e) => e,
        };
        let url = request.url.to_string();
        tracing::debug!(
            url = %url,
            kind = classify(&network_err).as_str(),
            "network failed, trying cache"
        );

        let active = match self.storage.active_generation().await {
            Ok(active) => active,
            Err(source) => return Err(InterceptError::Cache { url, source }),
        };
        // A superseded version no longer serves from its generation.
        if active.as_deref() != Some(self.config.cache_name.as_str()) {
            tracing::debug!(
                url = %url,
                generation = %self.config.cache_name,
                active = ?active,
                "not the active generation; no fallback"
            );
            return Err(InterceptError::Unresolved {
                url,
                source: network_err,
            });
        }

        match self
            .storage
            .match_request(&self.config.cache_name, &request.key())
            .await
        {
            Ok(Some(cached)) => {
                tracing::info!(url = %url, status = cached.status, "served from cache");
                Ok(cached)
            }
            Ok(None) => Err(InterceptError::Unresolved {
                url,
                source: network_err,
            }),
            Err(source) => Err(InterceptError::Cache { url, source }),
        }
    }
}
