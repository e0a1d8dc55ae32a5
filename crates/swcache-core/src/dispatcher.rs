//! The three lifecycle handlers a hosting runtime registers for one version.
//!
//! `Lifecycle` is the seam a host drives; `ServiceWorker` wires it to the
//! installer, activator and interceptor and tracks the version's state.

use crate::cache::CacheStorage;
use crate::clients::Clients;
use crate::config::AgentConfig;
use crate::http::Request;
use crate::intercept::{Handled, Interceptor};
use crate::lifecycle::{
    ActivateError, ActivationReport, Activator, InstallError, InstallReport, Installer, WorkerState,
};
use crate::network::Network;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

#[async_trait]
pub trait Lifecycle: Send + Sync {
    /// Version registration: seed the cache generation.
    async fn on_install(&self) -> Result<InstallReport, InstallError>;

    /// Take control of open clients.
    async fn on_activate(&self) -> Result<ActivationReport, ActivateError>;

    /// Classify and resolve one request. Never blocks; the work lives in `Handled`.
    fn on_intercept(&self, request: Request) -> Handled;

    fn state(&self) -> WorkerState;
}

/// One deployed version.
pub struct ServiceWorker {
    config: Arc<AgentConfig>,
    installer: Installer,
    activator: Activator,
    interceptor: Interceptor,
    state: Mutex<WorkerState>,
}

impl ServiceWorker {
    pub fn new(
        config: Arc<AgentConfig>,
        storage: CacheStorage,
        network: Arc<dyn Network>,
        clients: Arc<dyn Clients>,
    ) -> Result<Self> {
        config.validate()?;
        let interceptor = Interceptor::new(
            Arc::clone(&config),
            storage.clone(),
            Arc::clone(&network),
            Arc::clone(&clients),
        )?;
        Ok(Self {
            installer: Installer::new(Arc::clone(&config), storage.clone(), network),
            activator: Activator::new(Arc::clone(&config), storage, clients),
            interceptor,
            config,
            state: Mutex::new(WorkerState::Parsed),
        })
    }

    /// Resume a version whose generation is already the active one (e.g. a new
    /// process after a previous `install` + `activate`).
    pub fn resume_activated(self) -> Self {
        self.set_state(WorkerState::Activated);
        self
    }

    /// Resume a version whose generation is committed but not yet active.
    pub fn resume_installed(self) -> Self {
        self.set_state(WorkerState::Installed);
        self
    }

    pub fn generation(&self) -> &str {
        &self.config.cache_name
    }

    fn set_state(&self, state: WorkerState) {
        let mut current = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!(
            generation = %self.config.cache_name,
            from = current.as_str(),
            to = state.as_str(),
            "state change"
        );
        *current = state;
    }
}

#[async_trait]
impl Lifecycle for ServiceWorker {
    async fn on_install(&self) -> Result<InstallReport, InstallError> {
        let state = self.state();
        if !state.can_install() {
            return Err(InstallError::InvalidState(state));
        }
        self.set_state(WorkerState::Installing);
        match self.installer.install().await {
            Ok(report) => {
                self.set_state(WorkerState::Installed);
                Ok(report)
            }
            Err(e) => {
                self.set_state(WorkerState::Redundant);
                Err(e)
            }
        }
    }

    async fn on_activate(&self) -> Result<ActivationReport, ActivateError> {
        let before = self.state();
        match before {
            WorkerState::Installed => self.set_state(WorkerState::Activating),
            WorkerState::Activated => {}
            state => return Err(ActivateError::NotInstalled { state }),
        }
        match self.activator.activate().await {
            Ok(report) => {
                self.set_state(WorkerState::Activated);
                Ok(report)
            }
            Err(e) => {
                self.set_state(before);
                Err(e)
            }
        }
    }

    fn on_intercept(&self, request: Request) -> Handled {
        if self.state() == WorkerState::Activated {
            self.interceptor.intercept(request)
        } else {
            self.interceptor.passthrough(request)
        }
    }

    fn state(&self) -> WorkerState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
