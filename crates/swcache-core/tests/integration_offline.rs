//! Integration tests: real curl network against a local origin, on-disk cache.
//!
//! Registers a version (install + activate), then checks network-first
//! serving, offline fallback, share delivery and restart durability.

mod common;

use std::sync::Arc;
use swcache_core::cache::{CacheStorage, GenerationState};
use swcache_core::clients::{ClientId, ClientMessage, ClientRegistry, SharedFile};
use swcache_core::config::AgentConfig;
use swcache_core::dispatcher::{Lifecycle, ServiceWorker};
use swcache_core::host::{Host, RegisterError};
use swcache_core::http::Request;
use swcache_core::intercept::{share_request, InterceptError};
use swcache_core::lifecycle::WorkerState;
use swcache_core::network::CurlNetwork;
use tempfile::tempdir;
use url::Url;

const ROOT: &[u8] = b"<html><body>medlist</body></html>";
const MANIFEST: &[u8] = b"{\"name\":\"medlist\",\"share_target\":{\"action\":\"/share\"}}";

fn config(origin: &str, cache_name: &str, seeds: &[&str]) -> Arc<AgentConfig> {
    let mut cfg = AgentConfig::default();
    cfg.origin = origin.to_string();
    cfg.cache_name = cache_name.to_string();
    cfg.seed_urls = seeds.iter().map(|s| s.to_string()).collect();
    cfg.network.connect_timeout_secs = 2;
    cfg.network.timeout_secs = 5;
    Arc::new(cfg)
}

fn host(
    cfg: Arc<AgentConfig>,
    storage: CacheStorage,
    clients: Arc<ClientRegistry>,
) -> Host<ServiceWorker> {
    let network = Arc::new(CurlNetwork::new(&cfg.network));
    Host::new(ServiceWorker::new(cfg, storage, network, clients).unwrap())
}

fn get(origin: &str, path: &str) -> Request {
    Request::get(Url::parse(origin).unwrap().join(path).unwrap())
}

fn routes() -> Vec<(&'static str, &'static str, &'static [u8])> {
    vec![
        ("/", "text/html", ROOT),
        ("/static/manifest.json", "application/json", MANIFEST),
        ("/search", "text/html", b"<p>search</p>"),
    ]
}

#[tokio::test]
async fn network_first_then_offline_fallback() {
    let server = common::origin_server::start(&routes());
    let state = tempdir().unwrap();
    let storage = CacheStorage::open_at(state.path().join("cache.db")).await.unwrap();
    let cfg = config(&server.origin, "medlist-v6", &["/", "/static/manifest.json"]);
    let host = host(cfg, storage.clone(), Arc::new(ClientRegistry::new()));

    let reg = host.register().await.expect("register");
    assert_eq!(reg.install.entries, 2);
    assert!(reg.activation.is_some());

    // Online: the network answers, including paths that were never seeded.
    let live = host.dispatch(get(&server.origin, "/search")).await.unwrap();
    assert_eq!(live.status, 200);
    assert_eq!(live.body, b"<p>search</p>");
    assert_eq!(live.header("content-type"), Some("text/html"));

    server.set_offline(true);
    let root = host.dispatch(get(&server.origin, "/")).await.unwrap();
    assert_eq!(root.body, ROOT);
    let manifest = host
        .dispatch(get(&server.origin, "/static/manifest.json"))
        .await
        .unwrap();
    assert_eq!(manifest.body, MANIFEST);
    assert_eq!(manifest.header("content-type"), Some("application/json"));

    let err = host.dispatch(get(&server.origin, "/search")).await.unwrap_err();
    assert!(matches!(err, InterceptError::Unresolved { .. }));
}

#[tokio::test]
async fn missing_seed_fails_registration() {
    let server = common::origin_server::start(&routes());
    let storage = CacheStorage::open_in_memory().await.unwrap();
    let cfg = config(&server.origin, "medlist-v6", &["/", "/static/gone.png"]);
    let host = host(cfg, storage.clone(), Arc::new(ClientRegistry::new()));

    let err = host.register().await.unwrap_err();
    assert!(matches!(err, RegisterError::Install(_)));
    assert_eq!(host.worker().state(), WorkerState::Redundant);
    assert!(storage.generation_state("medlist-v6").await.unwrap().is_none());
    assert!(storage.active_generation().await.unwrap().is_none());
}

#[tokio::test]
async fn share_submission_redirects_and_reaches_the_page() {
    let server = common::origin_server::start(&routes());
    let storage = CacheStorage::open_in_memory().await.unwrap();
    let clients = Arc::new(ClientRegistry::new());
    let cfg = config(&server.origin, "medlist-v6", &["/"]);
    let host = host(Arc::clone(&cfg), storage, Arc::clone(&clients));
    host.register().await.unwrap();
    let hits_before = server.hits();

    let mut page = clients.open(ClientId::new("page-1"));
    let file = SharedFile {
        name: Some("stock.htm".to_string()),
        content_type: Some("text/html".to_string()),
        data: b"<table><tr><td>Panadol</td></tr></table>".to_vec(),
    };
    let origin = cfg.origin_url().unwrap();
    let req = share_request(&cfg, &origin, &file, ClientId::new("page-1")).unwrap();

    let resp = host.dispatch(req).await.unwrap();
    assert_eq!(resp.status, 302);
    assert_eq!(
        resp.header("location"),
        Some(format!("{}/?shared=true", server.origin).as_str())
    );
    host.settle().await;

    assert_eq!(page.recv().await, Some(ClientMessage::SharedFile { file }));
    assert_eq!(server.hits(), hits_before);
}

#[tokio::test]
async fn cache_survives_restart() {
    let server = common::origin_server::start(&routes());
    let state = tempdir().unwrap();
    let db_path = state.path().join("cache.db");
    let cfg = config(&server.origin, "medlist-v6", &["/"]);
    {
        let storage = CacheStorage::open_at(&db_path).await.unwrap();
        host(Arc::clone(&cfg), storage, Arc::new(ClientRegistry::new()))
            .register()
            .await
            .unwrap();
    }

    server.set_offline(true);
    let storage = CacheStorage::open_at(&db_path).await.unwrap();
    assert_eq!(
        storage.active_generation().await.unwrap().as_deref(),
        Some("medlist-v6")
    );
    let network = Arc::new(CurlNetwork::new(&cfg.network));
    let sw = ServiceWorker::new(cfg, storage, network, Arc::new(ClientRegistry::new()))
        .unwrap()
        .resume_activated();
    let host = Host::new(sw);
    let root = host.dispatch(get(&server.origin, "/")).await.unwrap();
    assert_eq!(root.body, ROOT);
}

#[tokio::test]
async fn bumped_version_supersedes_previous_generation() {
    let server = common::origin_server::start(&routes());
    let storage = CacheStorage::open_in_memory().await.unwrap();
    let clients = Arc::new(ClientRegistry::new());
    let _page = clients.open(ClientId::new("page"));

    host(
        config(&server.origin, "medlist-v6", &["/"]),
        storage.clone(),
        Arc::clone(&clients),
    )
    .register()
    .await
    .unwrap();
    let reg = host(
        config(&server.origin, "medlist-v7", &["/", "/static/manifest.json"]),
        storage.clone(),
        Arc::clone(&clients),
    )
    .register()
    .await
    .unwrap();

    assert_eq!(reg.activation.unwrap().claimed, 1);
    assert_eq!(clients.controller_of(&ClientId::new("page")).as_deref(), Some("medlist-v7"));
    assert_eq!(
        storage.active_generation().await.unwrap().as_deref(),
        Some("medlist-v7")
    );
    let gens = storage.list_generations().await.unwrap();
    assert_eq!(gens.len(), 2);
    assert!(gens.iter().all(|g| g.state == GenerationState::Ready));
    assert_eq!(gens.iter().filter(|g| g.active).count(), 1);
}
