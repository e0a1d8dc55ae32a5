//! `swcache share <path>` – submit a file to the share target.
//!
//! A local client context stands in for the page that the share opens.

use anyhow::{Context, Result};
use std::path::Path;
use swcache_core::clients::{ClientId, ClientMessage, ClientRegistry, SharedFile};
use swcache_core::config::AgentConfig;
use swcache_core::dispatcher::ServiceWorker;
use swcache_core::host::Host;
use swcache_core::intercept::share_request;

const PAGE_CLIENT: &str = "swcache-cli";

pub async fn run_share(
    host: &Host<ServiceWorker>,
    clients: &ClientRegistry,
    cfg: &AgentConfig,
    path: &Path,
    mime: Option<String>,
) -> Result<()> {
    let data = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let file = SharedFile {
        name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
        content_type: mime.or_else(|| guess_mime(path).map(str::to_string)),
        data,
    };

    let page = ClientId::new(PAGE_CLIENT);
    let mut inbox = clients.open(page.clone());
    let origin = cfg.origin_url()?;
    let request = share_request(cfg, &origin, &file, page.clone())
        .with_context(|| format!("invalid share_path {:?}", cfg.share_path))?;

    let response = host.dispatch(request).await?;
    match response.header("location") {
        Some(location) => println!("{} -> {}", response.status, location),
        None => println!("{}", response.status),
    }

    host.settle().await;
    match inbox.try_recv() {
        Some(ClientMessage::SharedFile { file }) => println!(
            "Delivered {} ({}, {} bytes, sha256 {})",
            file.name.as_deref().unwrap_or("-"),
            file.content_type.as_deref().unwrap_or("-"),
            file.size(),
            file.sha256()
        ),
        None => println!("No file delivered (is the generation active?)"),
    }
    clients.close(&page);
    Ok(())
}

/// Media type for common shared-document extensions.
pub fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "htm" | "html" => "text/html",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => return None,
    })
}
