//! What a handler hands back to the host: a response future plus the
//! background work the host must still await.

use super::{InterceptError, Route};
use crate::http::Response;
use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Work that continues after the response is produced.
pub struct BackgroundTask {
    label: &'static str,
    future: BoxFuture<()>,
}

impl BackgroundTask {
    pub fn new(label: &'static str, future: impl Future<Output = ()> + Send + 'static) -> Self {
        Self {
            label,
            future: Box::pin(future),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn into_future(self) -> BoxFuture<()> {
        self.future
    }
}

impl std::fmt::Debug for BackgroundTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundTask")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Outcome of one interception.
pub struct Handled {
    pub route: Route,
    pub response: BoxFuture<Result<Response, InterceptError>>,
    pub background: Vec<BackgroundTask>,
}

impl Handled {
    /// Await the response, then every background task, in order.
    pub async fn settle(self) -> Result<Response, InterceptError> {
        let response = self.response.await;
        for task in self.background {
            task.into_future().await;
        }
        response
    }
}
