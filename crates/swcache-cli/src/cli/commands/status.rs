//! `swcache status` – list cache generations.

use anyhow::Result;
use swcache_core::cache::CacheStorage;
use swcache_core::config::AgentConfig;

pub async fn run_status(storage: &CacheStorage, cfg: &AgentConfig) -> Result<()> {
    println!("Configured generation: {} (origin {})", cfg.cache_name, cfg.origin);
    let generations = storage.list_generations().await?;
    if generations.is_empty() {
        println!("No cache generations.");
        return Ok(());
    }
    println!("{:<2} {:<24} {:<10} {}", "", "GENERATION", "STATE", "ENTRIES");
    for g in generations {
        println!(
            "{:<2} {:<24} {:<10} {}",
            if g.active { "*" } else { "" },
            g.name,
            g.state.as_str(),
            g.entries
        );
    }
    Ok(())
}
