//! `shadow init <name> [--network ..] [--storage ..]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use shadow_core::{manifest, Manifest, Network, StorageKind};
use shadow_scaffold::{write_new_project, ProjectContext, Scaffold};

/// Create a new project directory.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project name; also the directory created under the current one.
    pub name: String,

    /// Target cluster: devnet | mainnet.
    #[arg(long, short = 'n', default_value_t = Network::Devnet)]
    pub network: Network,

    /// Storage backend: ipfs | arweave.
    #[arg(long, short = 's', default_value_t = StorageKind::Ipfs)]
    pub storage: StorageKind,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let ctx = ProjectContext::new(&self.name, self.network, self.storage)?;
        let files = Scaffold::new()?
            .render_project(&ctx)
            .context("failed to render project templates")?;

        let dir = PathBuf::from(&self.name);
        write_new_project(&dir, &files)
            .with_context(|| format!("failed to create project '{}'", self.name))?;
        manifest::save(&dir, &Manifest::new(&self.name, self.network, self.storage))
            .with_context(|| format!("failed to write {}/shadow.json", self.name))?;

        println!(
            "{} Created '{}' ({}, {})",
            "✓".green().bold(),
            self.name,
            self.network,
            self.storage
        );
        println!("  {}", manifest::MANIFEST_FILE);
        for (path, _) in &files {
            println!("  {}", path.display());
        }
        println!();
        println!("Next: cd {} && shadow deploy", self.name);
        Ok(())
    }
}
