//! `shadow deploy`: run the deployment pipeline for an initialized project.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use shadow_core::{Network, StorageKind};
use shadow_deploy::{DeployOptions, DomainRequest, Pipeline};

use super::{finish, load_manifest, load_settings, Collaborators};

/// Arguments for `shadow deploy`.
#[derive(Args, Debug)]
pub struct DeployArgs {
    /// Project directory (must contain shadow.json).
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Override the manifest's network.
    #[arg(long, short = 'n')]
    pub network: Option<Network>,

    /// Override the manifest's storage backend.
    #[arg(long, short = 's')]
    pub storage: Option<StorageKind>,

    /// Register this domain for the deployed program.
    #[arg(long)]
    pub domain: Option<String>,

    /// Mint a single-unit ownership token.
    #[arg(long)]
    pub mint_token: bool,

    /// Backend base URL (overrides config and SHADOW_BACKEND_URL).
    #[arg(long, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Emit the deployment report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl DeployArgs {
    pub fn run(self) -> Result<()> {
        let manifest = load_manifest(&self.path)?;
        let network = self.network.unwrap_or(manifest.network);
        let storage = self.storage.unwrap_or(manifest.storage);
        let settings = load_settings(network, self.backend_url.as_deref())?;

        let mut options = DeployOptions::deploy(network, storage);
        options.mint_token = self.mint_token;
        if let Some(domain) = self.domain {
            options.domain = DomainRequest::Explicit(domain);
        }

        let collaborators = Collaborators::new(&settings, network);
        let result = Pipeline::new(&self.path, options, collaborators.stages()).run(manifest);
        finish(result, self.json)?;
        Ok(())
    }
}
