//! Agent configuration, loaded once from `~/.config/swcache/config.toml`.
//!
//! The loaded value is handed to every component by `Arc<AgentConfig>`;
//! nothing in the engine reads configuration from globals.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Timeouts for a single network attempt (there are no retries).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 30,
        }
    }
}

impl NetworkConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Global configuration for one deployed version of the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Origin that relative URLs (seed resources, share redirect) resolve against.
    pub origin: String,
    /// Version-tagged cache generation name. Bumping it supersedes the previous generation.
    pub cache_name: String,
    /// Resources that must be cached before this version may activate.
    pub seed_urls: Vec<String>,
    /// Literal substring marking a share-target URL.
    #[serde(default = "default_share_path")]
    pub share_path: String,
    /// Where share submissions are redirected.
    #[serde(default = "default_share_redirect")]
    pub share_redirect: String,
    /// Multipart field that carries the shared file.
    #[serde(default = "default_share_field")]
    pub share_field: String,
    /// Share bodies larger than this are not parsed.
    #[serde(default = "default_max_share_bytes")]
    pub max_share_bytes: u64,
    #[serde(default)]
    pub network: NetworkConfig,
}

fn default_share_path() -> String {
    "/share".to_string()
}

fn default_share_redirect() -> String {
    "/?shared=true".to_string()
}

fn default_share_field() -> String {
    "file".to_string()
}

fn default_max_share_bytes() -> u64 {
    16 * 1024 * 1024
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:5000".to_string(),
            cache_name: "medlist-v6".to_string(),
            seed_urls: vec!["/".to_string(), "/static/manifest.json".to_string()],
            share_path: default_share_path(),
            share_redirect: default_share_redirect(),
            share_field: default_share_field(),
            max_share_bytes: default_max_share_bytes(),
            network: NetworkConfig::default(),
        }
    }
}

impl AgentConfig {
    /// Parsed origin URL. Only valid after `validate()` succeeded.
    pub fn origin_url(&self) -> Result<Url> {
        let url = Url::parse(&self.origin)
            .with_context(|| format!("invalid origin {:?}", self.origin))?;
        if url.cannot_be_a_base() {
            anyhow::bail!("origin {:?} cannot be a base URL", self.origin);
        }
        Ok(url)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache_name.trim().is_empty() {
            anyhow::bail!("cache_name must not be empty");
        }
        if self.share_path.is_empty() {
            anyhow::bail!("share_path must not be empty");
        }
        let origin = self.origin_url()?;
        for seed in &self.seed_urls {
            origin
                .join(seed)
                .with_context(|| format!("invalid seed url {:?}", seed))?;
        }
        origin
            .join(&self.share_redirect)
            .with_context(|| format!("invalid share_redirect {:?}", self.share_redirect))?;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("swcache")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load and validate configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<AgentConfig> {
    let data = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: AgentConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid configuration at {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<AgentConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AgentConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = AgentConfig::default();
        assert_eq!(cfg.cache_name, "medlist-v6");
        assert_eq!(cfg.seed_urls, vec!["/", "/static/manifest.json"]);
        assert_eq!(cfg.share_path, "/share");
        assert_eq!(cfg.share_redirect, "/?shared=true");
        assert_eq!(cfg.share_field, "file");
        assert_eq!(cfg.network.connect_timeout_secs, 15);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_toml_minimal_uses_share_defaults() {
        let toml = r#"
            origin = "https://meds.example"
            cache_name = "medlist-v7"
            seed_urls = ["/", "/static/app.js"]
        "#;
        let cfg: AgentConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.cache_name, "medlist-v7");
        assert_eq!(cfg.seed_urls.len(), 2);
        assert_eq!(cfg.share_path, "/share");
        assert_eq!(cfg.max_share_bytes, 16 * 1024 * 1024);
        assert_eq!(cfg.network, NetworkConfig::default());
    }

    #[test]
    fn config_toml_network_section() {
        let toml = r#"
            origin = "http://localhost:8080"
            cache_name = "v1"
            seed_urls = []

            [network]
            connect_timeout_secs = 2
            timeout_secs = 5
        "#;
        let cfg: AgentConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.network.connect_timeout(), Duration::from_secs(2));
        assert_eq!(cfg.network.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut cfg = AgentConfig::default();
        cfg.cache_name = "  ".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = AgentConfig::default();
        cfg.origin = "not a url".to_string();
        assert!(cfg.validate().is_err());

        let mut cfg = AgentConfig::default();
        cfg.origin = "mailto:someone@example.com".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let toml = toml::to_string_pretty(&AgentConfig::default()).unwrap();
        fs::write(&path, toml).unwrap();
        let cfg = load_from_path(&path).unwrap();
        assert_eq!(cfg.cache_name, "medlist-v6");
    }
}
