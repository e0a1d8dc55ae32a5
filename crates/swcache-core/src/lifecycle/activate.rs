//! Activator: make this version's generation the active one and claim open clients.

use crate::cache::{CacheStorage, StoreError};
use crate::clients::Clients;
use crate::config::AgentConfig;
use crate::lifecycle::WorkerState;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActivateError {
    #[error("cannot activate a version in state {state}")]
    NotInstalled { state: WorkerState },
    #[error("cache generation {generation:?} is not installed")]
    NotReady { generation: String },
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ActivateError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotReady(generation) | StoreError::UnknownGeneration(generation) => {
                ActivateError::NotReady { generation }
            }
            other => ActivateError::Store(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActivationReport {
    pub generation: String,
    /// False when this generation already was the active one.
    pub newly_active: bool,
    /// Open clients that switched to this version.
    pub claimed: usize,
}

pub struct Activator {
    config: Arc<AgentConfig>,
    storage: CacheStorage,
    clients: Arc<dyn Clients>,
}

impl Activator {
    pub fn new(config: Arc<AgentConfig>, storage: CacheStorage, clients: Arc<dyn Clients>) -> Self {
        Self {
            config,
            storage,
            clients,
        }
    }

    /// Idempotent: a second call changes nothing that the first already changed.
    pub async fn activate(&self) -> Result<ActivationReport, ActivateError> {
        let name = self.config.cache_name.as_str();
        let newly_active = self.storage.set_active(name).await?;
        let claimed = self.clients.claim(name).await;
        tracing::info!(generation = name, newly_active, claimed, "activated");
        Ok(ActivationReport {
            generation: name.to_string(),
            newly_active,
            claimed,
        })
    }
}
