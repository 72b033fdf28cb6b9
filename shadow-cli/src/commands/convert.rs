//! `shadow convert [PATH]`: publish an existing static site.
//!
//! The site is addressed by the project identity rather than a deployed
//! program. A token is minted by default and names the derived domain.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use shadow_core::{manifest, Manifest, Network, StorageKind};
use shadow_deploy::{resume, DeployOptions, DomainRequest, Pipeline};
use shadow_scaffold::{write_integration, IntegrationContext, Scaffold};

use super::{finish, load_settings, print_addresses, Collaborators};

/// Arguments for `shadow convert`.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Site directory to convert.
    #[arg(default_value = ".")]
    pub path: PathBuf,

    #[arg(long, short = 'n', default_value_t = Network::Devnet)]
    pub network: Network,

    #[arg(long, short = 's', default_value_t = StorageKind::Ipfs)]
    pub storage: StorageKind,

    /// Skip the ownership token (and the domain derived from it).
    #[arg(long)]
    pub no_mint: bool,

    /// Register this domain instead of the token-derived one.
    #[arg(long)]
    pub domain: Option<String>,

    /// Backend base URL (overrides config and SHADOW_BACKEND_URL).
    #[arg(long, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Emit the deployment report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl ConvertArgs {
    pub fn run(self) -> Result<()> {
        let dir = self
            .path
            .canonicalize()
            .with_context(|| format!("cannot resolve path '{}'", self.path.display()))?;
        let options = self.options();

        let manifest = match manifest::load_optional(&dir)
            .with_context(|| format!("failed to read the manifest in {}", dir.display()))?
        {
            Some(existing) if existing.converted && resume(&existing, &options).is_some() => {
                println!("Resuming conversion of '{}'", existing.name);
                existing
            }
            Some(existing) => {
                println!(
                    "'{}' is already a shadow project; nothing to convert.",
                    existing.name
                );
                print_addresses(&existing);
                return Ok(());
            }
            None => {
                let name = dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "site".to_string());
                let mut fresh = Manifest::new(name, self.network, self.storage);
                fresh.converted = true;
                manifest::save(&dir, &fresh)
                    .with_context(|| format!("failed to write shadow.json in {}", dir.display()))?;
                fresh
            }
        };

        let settings = load_settings(self.network, self.backend_url.as_deref())?;
        let collaborators = Collaborators::new(&settings, self.network);
        let result = Pipeline::new(&dir, options, collaborators.stages()).run(manifest);
        let report = finish(result, self.json)?;

        let ctx = IntegrationContext::from_manifest(&report.manifest)?;
        let contents = Scaffold::new()?.render_integration(&ctx)?;
        let path = write_integration(&dir, &contents)?;
        if !self.json {
            println!("{} wrote {}", "✓".green().bold(), path.display());
        }
        Ok(())
    }

    fn options(&self) -> DeployOptions {
        let mut options = DeployOptions::convert(self.network, self.storage);
        if self.no_mint {
            options.mint_token = false;
            options.domain = DomainRequest::None;
        }
        if let Some(domain) = &self.domain {
            options.domain = DomainRequest::Explicit(domain.clone());
        }
        options
    }
}
