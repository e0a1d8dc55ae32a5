//! `swcache install` – precache the seed URLs, then take over right away.

use anyhow::Result;
use swcache_core::dispatcher::ServiceWorker;
use swcache_core::host::Host;

pub async fn run_install(host: &Host<ServiceWorker>) -> Result<()> {
    let registration = host.register().await?;
    let install = &registration.install;
    println!(
        "Installed generation {} ({} entries)",
        install.generation, install.entries
    );
    match &registration.activation {
        Some(a) if a.newly_active => println!(
            "Activated generation {} ({} clients claimed)",
            a.generation, a.claimed
        ),
        Some(a) => println!("Generation {} is already active", a.generation),
        None => println!(
            "Generation {} waits for older clients before activating",
            install.generation
        ),
    }
    Ok(())
}
