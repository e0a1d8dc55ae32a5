//! Installer: populate this version's cache generation with the seed resources.

use crate::cache::{CacheStorage, GenerationState, StoreError};
use crate::config::AgentConfig;
use crate::http::{Request, RequestKey, Response};
use crate::lifecycle::WorkerState;
use crate::network::{classify, Network, NetworkError};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("cannot install from state {0}")]
    InvalidState(WorkerState),
    #[error("invalid origin: {0}")]
    Origin(String),
    #[error("invalid seed url {url:?}: {source}")]
    SeedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("seed {0} listed more than once")]
    DuplicateSeed(String),
    #[error("fetching seed {url} failed: {source}")]
    SeedFetch {
        url: String,
        #[source]
        source: NetworkError,
    },
    #[error("seed {url} returned HTTP {status}")]
    SeedStatus { url: String, status: u16 },
    #[error("seed fetch task failed: {0}")]
    Task(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct InstallReport {
    pub generation: String,
    pub entries: usize,
    /// Activate as soon as install succeeds instead of waiting for old clients to close.
    pub skip_waiting: bool,
}

pub struct Installer {
    config: Arc<AgentConfig>,
    storage: CacheStorage,
    network: Arc<dyn Network>,
}

impl Installer {
    pub fn new(config: Arc<AgentConfig>, storage: CacheStorage, network: Arc<dyn Network>) -> Self {
        Self {
            config,
            storage,
            network,
        }
    }

    /// All seeds become retrievable from the generation, or none do.
    pub async fn install(&self) -> Result<InstallReport, InstallError> {
        let name = self.config.cache_name.as_str();
        tracing::info!(generation = name, seeds = self.config.seed_urls.len(), "install started");

        let prior = self.storage.begin_generation(name).await?;
        let entries = match self.fetch_seeds().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(generation = name, "install failed: {}", e);
                if prior == GenerationState::Building {
                    if let Err(discard) = self.storage.discard_generation(name).await {
                        tracing::warn!(
                            generation = name,
                            "discarding failed generation: {}",
                            discard
                        );
                    }
                }
                return Err(e);
            }
        };

        self.storage.commit_generation(name, &entries).await?;
        tracing::info!(generation = name, entries = entries.len(), "install finished");
        Ok(InstallReport {
            generation: name.to_string(),
            entries: entries.len(),
            skip_waiting: true,
        })
    }

    fn seed_requests(&self) -> Result<Vec<Request>, InstallError> {
        let origin = self
            .config
            .origin_url()
            .map_err(|e| InstallError::Origin(format!("{:#}", e)))?;
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(self.config.seed_urls.len());
        for seed in &self.config.seed_urls {
            let request = Request::resolve("GET", seed, &origin).map_err(|source| {
                InstallError::SeedUrl {
                    url: seed.clone(),
                    source,
                }
            })?;
            if !seen.insert(request.key()) {
                return Err(InstallError::DuplicateSeed(request.url.to_string()));
            }
            out.push(request);
        }
        Ok(out)
    }

    /// Fetch every seed concurrently; the first failure aborts the rest.
    async fn fetch_seeds(&self) -> Result<Vec<(RequestKey, Response)>, InstallError> {
        let requests = self.seed_requests()?;
        let mut slots: Vec<Option<(RequestKey, Response)>> =
            (0..requests.len()).map(|_| None).collect();

        let mut set = JoinSet::new();
        for (idx, request) in requests.into_iter().enumerate() {
            let network = Arc::clone(&self.network);
            set.spawn(async move {
                let result = network.fetch(&request).await;
                (idx, request, result)
            });
        }

        while let Some(joined) = set.join_next().await {
            let (idx, request, result) = joined.map_err(|e| InstallError::Task(e.to_string()))?;
            let url = request.url.to_string();
            let response = result.map_err(|source| {
                tracing::debug!(url = %url, kind = classify(&source).as_str(), "seed fetch failed");
                InstallError::SeedFetch {
                    url: url.clone(),
                    source,
                }
            })?;
            if !response.is_ok() {
                return Err(InstallError::SeedStatus {
                    url,
                    status: response.status,
                });
            }
            tracing::debug!(url = %url, bytes = response.body.len(), "seed fetched");
            slots[idx] = Some((request.key(), response));
        }

        Ok(slots.into_iter().flatten().collect())
    }
}
