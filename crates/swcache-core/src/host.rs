//! Runtime stand-in: drives registration and dispatches requests, keeping
//! each event's background work alive until `settle()`.

use crate::dispatcher::Lifecycle;
use crate::http::{Request, Response};
use crate::intercept::InterceptError;
use crate::lifecycle::{ActivateError, ActivationReport, InstallError, InstallReport};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tokio::task::JoinSet;

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("install failed: {0}")]
    Install(#[from] InstallError),
    #[error("activation failed: {0}")]
    Activate(#[from] ActivateError),
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub install: InstallReport,
    /// None when the version waits for older clients before activating.
    pub activation: Option<ActivationReport>,
}

pub struct Host<L: Lifecycle> {
    worker: L,
    background: Mutex<JoinSet<()>>,
}

impl<L: Lifecycle> Host<L> {
    pub fn new(worker: L) -> Self {
        Self {
            worker,
            background: Mutex::new(JoinSet::new()),
        }
    }

    pub fn worker(&self) -> &L {
        &self.worker
    }

    /// Install, then activate right away if the install asked to skip waiting.
    pub async fn register(&self) -> Result<Registration, RegisterError> {
        let install = self.worker.on_install().await?;
        let activation = if install.skip_waiting {
            Some(self.worker.on_activate().await?)
        } else {
            tracing::info!(
                generation = %install.generation,
                "installed; waiting for older clients"
            );
            None
        };
        Ok(Registration { install, activation })
    }

    /// Resolve one request. Background work is spawned before the response is
    /// awaited so that it never delays the response.
    pub async fn dispatch(&self, request: Request) -> Result<Response, InterceptError> {
        let handled = self.worker.on_intercept(request);
        if !handled.background.is_empty() {
            // Spawning needs a runtime; the guard is dropped before any await.
            let mut set = self.background.lock().unwrap_or_else(PoisonError::into_inner);
            for task in handled.background {
                tracing::debug!(task = task.label(), "background task spawned");
                set.spawn(task.into_future());
            }
        }
        handled.response.await
    }

    /// Wait for every outstanding background task. Returns how many finished.
    pub async fn settle(&self) -> usize {
        let mut set = std::mem::take(
            &mut *self.background.lock().unwrap_or_else(PoisonError::into_inner),
        );
        let mut finished = 0;
        while let Some(joined) = set.join_next().await {
            if let Err(e) = joined {
                tracing::warn!("background task did not complete: {}", e);
            }
            finished += 1;
        }
        finished
    }
}
