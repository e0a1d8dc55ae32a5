//! CLI for the swcache interception agent.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::sync::Arc;
use swcache_core::cache::{CacheStorage, GenerationState};
use swcache_core::clients::{ClientRegistry, Clients};
use swcache_core::config::{self, AgentConfig};
use swcache_core::dispatcher::ServiceWorker;
use swcache_core::host::Host;
use swcache_core::network::CurlNetwork;

use commands::{run_activate, run_completions, run_fetch, run_install, run_share, run_status};

/// Top-level CLI for the swcache agent.
#[derive(Debug, Parser)]
#[command(name = "swcache")]
#[command(about = "swcache: offline fallback cache and share target", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch the seed URLs and store them as the configured generation.
    Install,

    /// Make the configured generation active and claim open clients.
    Activate,

    /// Route one request through the interceptor.
    Fetch {
        /// Absolute URL, or a path resolved against the configured origin.
        url: String,
        /// HTTP method.
        #[arg(long, short = 'X', default_value = "GET", value_name = "METHOD")]
        method: String,
        /// Write the body to FILE instead of stdout.
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Submit a file to the share target, as an OS share sheet would.
    Share {
        /// File to share.
        path: PathBuf,
        /// Media type of the file (guessed from the extension if omitted).
        #[arg(long, value_name = "TYPE")]
        mime: Option<String>,
    },

    /// List cache generations and mark the active one.
    Status,

    /// Print shell completions.
    Completions {
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        match cli.command {
            CliCommand::Completions { shell } => run_completions(shell),
            command => command.run().await,
        }
    }

    async fn run(self) -> Result<()> {
        let cfg = Arc::new(config::load_or_init()?);
        tracing::debug!("loaded config: {:?}", cfg);
        let storage = CacheStorage::open_default().await?;
        let clients = Arc::new(ClientRegistry::new());

        match self {
            CliCommand::Install => {
                // A fresh version every time, so install always runs.
                let host = Host::new(build_worker(&cfg, &storage, &clients)?);
                run_install(&host).await?;
            }
            CliCommand::Activate => {
                let worker = resume_worker(&cfg, &storage, &clients).await?;
                run_activate(&worker).await?;
            }
            CliCommand::Fetch {
                url,
                method,
                output,
            } => {
                let host = Host::new(resume_worker(&cfg, &storage, &clients).await?);
                run_fetch(&host, &cfg, &url, &method, output.as_deref()).await?;
            }
            CliCommand::Share { path, mime } => {
                let host = Host::new(resume_worker(&cfg, &storage, &clients).await?);
                run_share(&host, &clients, &cfg, &path, mime).await?;
            }
            CliCommand::Status => run_status(&storage, &cfg).await?,
            CliCommand::Completions { shell } => run_completions(shell)?,
        }

        Ok(())
    }
}

fn build_worker(
    cfg: &Arc<AgentConfig>,
    storage: &CacheStorage,
    clients: &Arc<ClientRegistry>,
) -> Result<ServiceWorker> {
    let network = Arc::new(CurlNetwork::new(&cfg.network));
    let clients: Arc<dyn Clients> = clients.clone();
    ServiceWorker::new(Arc::clone(cfg), storage.clone(), network, clients)
}

/// Build the configured version in whatever state the store already records
/// for it: active, committed, or not installed.
async fn resume_worker(
    cfg: &Arc<AgentConfig>,
    storage: &CacheStorage,
    clients: &Arc<ClientRegistry>,
) -> Result<ServiceWorker> {
    let worker = build_worker(cfg, storage, clients)?;
    if storage.active_generation().await?.as_deref() == Some(cfg.cache_name.as_str()) {
        return Ok(worker.resume_activated());
    }
    Ok(match storage.generation_state(&cfg.cache_name).await? {
        Some(GenerationState::Ready) => worker.resume_installed(),
        _ => worker,
    })
}

#[cfg(test)]
mod tests;
