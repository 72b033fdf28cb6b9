//! `shadow status`: recorded deployment state, next stage, chain check.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use shadow_client::RpcClient;
use shadow_core::{identity, Address, Manifest};
use shadow_deploy::{resume, DeployOptions, Stage};

use super::{load_manifest, load_settings, print_json};

/// Arguments for `shadow status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Project directory.
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    /// Query the RPC node for the recorded program account.
    #[arg(long)]
    pub check_chain: bool,
}

#[derive(Serialize)]
struct StatusJson<'a> {
    manifest: &'a Manifest,
    identity: bool,
    next_stage: Option<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chain: Option<ChainStatus>,
}

#[derive(Debug, Serialize)]
struct ChainStatus {
    rpc_url: String,
    exists: bool,
    executable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lamports: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "field")]
    field: &'static str,
    #[tabled(rename = "value")]
    value: String,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let manifest = load_manifest(&self.path)?;
        let next = resume(&manifest, &default_options(&manifest));
        let has_identity = identity::wallet_path(&self.path).is_file();

        let chain = match (&manifest.program_address, self.check_chain) {
            (Some(address), true) => Some(check_chain(&manifest, address)?),
            _ => None,
        };

        if self.json {
            return print_json(&StatusJson {
                manifest: &manifest,
                identity: has_identity,
                next_stage: next,
                chain,
            });
        }

        print_table(&manifest, has_identity, next, chain.as_ref());
        Ok(())
    }
}

/// The options a plain re-run would use. Flags such as `--mint-token` are
/// not recorded, so optional stages only show up for converted sites.
fn default_options(manifest: &Manifest) -> DeployOptions {
    if manifest.converted {
        DeployOptions::convert(manifest.network, manifest.storage)
    } else {
        DeployOptions::deploy(manifest.network, manifest.storage)
    }
}

fn check_chain(manifest: &Manifest, address: &Address) -> Result<ChainStatus> {
    let settings = load_settings(manifest.network, None)?;
    let rpc = RpcClient::for_network(&settings, manifest.network);
    let status = match rpc.account_info(address) {
        Ok(Some(info)) => ChainStatus {
            rpc_url: rpc.url().to_string(),
            exists: true,
            executable: info.executable,
            owner: Some(info.owner),
            lamports: Some(info.lamports),
            error: None,
        },
        Ok(None) => ChainStatus {
            rpc_url: rpc.url().to_string(),
            exists: false,
            executable: false,
            owner: None,
            lamports: None,
            error: None,
        },
        Err(e) => ChainStatus {
            rpc_url: rpc.url().to_string(),
            exists: false,
            executable: false,
            owner: None,
            lamports: None,
            error: Some(e.to_string()),
        },
    };
    Ok(status)
}

fn print_table(
    manifest: &Manifest,
    has_identity: bool,
    next: Option<Stage>,
    chain: Option<&ChainStatus>,
) {
    let opt = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
    let mut rows = vec![
        FieldRow {
            field: "network",
            value: manifest.network.to_string(),
        },
        FieldRow {
            field: "storage",
            value: manifest.storage.to_string(),
        },
        FieldRow {
            field: "owner",
            value: opt(manifest.owner.as_ref().map(ToString::to_string)),
        },
        FieldRow {
            field: "content",
            value: opt(manifest.storage_cid.as_ref().map(ToString::to_string)),
        },
        FieldRow {
            field: "program",
            value: opt(manifest.program_address.as_ref().map(ToString::to_string)),
        },
        FieldRow {
            field: "token",
            value: opt(manifest.token_mint.as_ref().map(ToString::to_string)),
        },
        FieldRow {
            field: "domain",
            value: opt(manifest.domain.clone()),
        },
        FieldRow {
            field: "updated",
            value: format_age(manifest.updated_at),
        },
    ];
    if let Some(chain) = chain {
        rows.push(FieldRow {
            field: "on chain",
            value: chain_label(chain),
        });
    }

    println!(
        "{} {}{}",
        manifest.name.bold(),
        if manifest.converted { "(converted) " } else { "" },
        format!("shadow v{}", env!("CARGO_PKG_VERSION")).bright_black()
    );
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if !has_identity {
        println!("{}", "No identity yet; one is generated on the first deploy.".yellow());
    }
    match next {
        Some(stage) => println!(
            "Next stage: {}. Run 'shadow deploy' to continue.",
            stage.name().yellow().bold()
        ),
        None => println!("{}", "All stages complete.".green()),
    }
}

fn chain_label(chain: &ChainStatus) -> String {
    match (&chain.error, chain.exists, chain.executable) {
        (Some(err), _, _) => format!("unknown ({err})"),
        (None, false, _) => "account not found".to_string(),
        (None, true, true) => "executable program".to_string(),
        (None, true, false) => "account exists (not executable)".to_string(),
    }
}

fn format_age(at: DateTime<Utc>) -> String {
    let secs = (Utc::now() - at).num_seconds().max(0);
    match secs {
        0..=59 => format!("{secs}s ago"),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}
