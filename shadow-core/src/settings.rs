//! User-level settings: `~/.shadow/config.yaml`.
//!
//! Every field is optional; a missing file yields [`Settings::default`].
//! Resolution order for the backend and RPC endpoints is
//! file → environment (`SHADOW_BACKEND_URL`, `SHADOW_RPC_URL`) → CLI flags,
//! the last applied by the caller.
//!
//! Like the manifest API, each loader has an `_at(home)` form for tests.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::types::Network;

pub const BACKEND_URL_ENV: &str = "SHADOW_BACKEND_URL";
pub const RPC_URL_ENV: &str = "SHADOW_RPC_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend_url: String,
    pub rpc: RpcEndpoints,
    pub toolchain: ToolchainCommands,
    pub http_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcEndpoints {
    pub devnet: String,
    pub mainnet: String,
}

/// Executable names (or absolute paths) of the external toolchains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainCommands {
    pub anchor: String,
    pub spl_token: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8080".to_string(),
            rpc: RpcEndpoints::default(),
            toolchain: ToolchainCommands::default(),
            http_timeout_secs: 30,
        }
    }
}

impl Default for RpcEndpoints {
    fn default() -> Self {
        Self {
            devnet: "https://api.devnet.solana.com".to_string(),
            mainnet: "https://api.mainnet-beta.solana.com".to_string(),
        }
    }
}

impl Default for ToolchainCommands {
    fn default() -> Self {
        Self {
            anchor: "anchor".to_string(),
            spl_token: "spl-token".to_string(),
        }
    }
}

impl Settings {
    pub fn rpc_url(&self, network: Network) -> &str {
        match network {
            Network::Devnet => &self.rpc.devnet,
            Network::Mainnet => &self.rpc.mainnet,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Apply `SHADOW_BACKEND_URL` / `SHADOW_RPC_URL` through `lookup`.
    ///
    /// `SHADOW_RPC_URL` overrides the endpoint of `network` only.
    pub fn apply_env_with<F>(&mut self, network: Network, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|u| !u.is_empty()) {
            self.backend_url = url;
        }
        if let Some(url) = lookup(RPC_URL_ENV).filter(|u| !u.is_empty()) {
            match network {
                Network::Devnet => self.rpc.devnet = url,
                Network::Mainnet => self.rpc.mainnet = url,
            }
        }
    }

    /// [`Settings::apply_env_with`] against the process environment.
    pub fn apply_env(&mut self, network: Network) {
        self.apply_env_with(network, |key| std::env::var(key).ok());
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// `<home>/.shadow/config.yaml`: pure, no I/O.
pub fn settings_path_at(home: &Path) -> PathBuf {
    home.join(".shadow").join("config.yaml")
}

/// Load settings rooted at `home`; defaults when the file is absent.
pub fn load_at(home: &Path) -> Result<Settings, SettingsError> {
    let path = settings_path_at(home);
    if !path.exists() {
        return Ok(Settings::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| SettingsError::Io {
        path: path.clone(),
        source: e,
    })?;
    if contents.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| SettingsError::Parse { path, source: e })
}

/// `load_at` convenience wrapper using `dirs::home_dir()`.
pub fn load() -> Result<Settings, SettingsError> {
    let home = dirs::home_dir().ok_or(SettingsError::HomeNotFound)?;
    load_at(&home)
}
