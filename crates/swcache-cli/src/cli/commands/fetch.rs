//! `swcache fetch <url>` – resolve one request the way a page load would.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use swcache_core::config::AgentConfig;
use swcache_core::dispatcher::ServiceWorker;
use swcache_core::host::Host;
use swcache_core::http::Request;

/// Status and headers go to stderr so stdout carries only the body.
pub async fn run_fetch(
    host: &Host<ServiceWorker>,
    cfg: &AgentConfig,
    url: &str,
    method: &str,
    output: Option<&Path>,
) -> Result<()> {
    let origin = cfg.origin_url()?;
    let request =
        Request::resolve(method, url, &origin).with_context(|| format!("invalid url {:?}", url))?;
    tracing::debug!(method = %request.method, url = %request.url, "fetch");
    let response = host.dispatch(request).await?;
    host.settle().await;

    eprintln!("{}", response.status);
    for (name, value) in &response.headers {
        eprintln!("{}: {}", name, value);
    }
    match output {
        Some(path) => {
            std::fs::write(path, &response.body)
                .with_context(|| format!("write {}", path.display()))?;
            eprintln!("{} bytes written to {}", response.body.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&response.body)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
