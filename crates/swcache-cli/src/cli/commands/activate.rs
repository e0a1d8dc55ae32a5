//! `swcache activate` – make the configured generation the active one.

use anyhow::{Context, Result};
use swcache_core::dispatcher::{Lifecycle, ServiceWorker};

pub async fn run_activate(worker: &ServiceWorker) -> Result<()> {
    let report = worker
        .on_activate()
        .await
        .with_context(|| format!("run `swcache install` for {} first", worker.generation()))?;
    if report.newly_active {
        println!("Activated generation {}", report.generation);
    } else {
        println!("Generation {} is already active", report.generation);
    }
    Ok(())
}
