//! Stubs shared by unit tests.

use crate::config::AgentConfig;
use crate::http::{Request, Response};
use crate::network::{Network, NetworkError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

pub const ORIGIN: &str = "http://127.0.0.1:5000/";

pub fn config_with_seeds(seeds: &[&str]) -> Arc<AgentConfig> {
    Arc::new(AgentConfig {
        origin: ORIGIN.trim_end_matches('/').to_string(),
        seed_urls: seeds.iter().map(|s| s.to_string()).collect(),
        ..AgentConfig::default()
    })
}

pub fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}

pub fn html(body: &str) -> Response {
    Response::new(
        200,
        vec![("Content-Type".to_string(), "text/html".to_string())],
        body.as_bytes().to_vec(),
    )
}

/// In-process network: answers from a URL map, 404 otherwise, or fails when offline.
#[derive(Default)]
pub struct StubNetwork {
    responses: Mutex<HashMap<String, Response>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl StubNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, path: &str, response: Response) {
        self.responses
            .lock()
            .unwrap()
            .insert(url(path).to_string(), response);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(NetworkError::Offline);
        }
        let found = self
            .responses
            .lock()
            .unwrap()
            .get(request.url.as_str())
            .cloned();
        Ok(found.unwrap_or_else(|| Response::new(404, Vec::new(), b"not found".to_vec())))
    }
}
