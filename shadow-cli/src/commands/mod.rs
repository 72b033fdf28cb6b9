//! Subcommands and the helpers they share: settings, collaborators, output.

pub mod convert;
pub mod deploy;
pub mod init;
pub mod status;

use std::path::Path;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde::Serialize;

use shadow_client::BackendClient;
use shadow_core::{manifest, settings, Manifest, ManifestError, Network, Settings};
use shadow_deploy::{DeployFailure, DeployReport, DeployState, Stage, StageStatus, Stages, Warning};
use shadow_toolchain::{AnchorDeployer, SplTokenMinter};

// ---------------------------------------------------------------------------
// Settings + manifest
// ---------------------------------------------------------------------------

/// `~/.shadow/config.yaml`, then environment, then `--backend-url`.
pub(crate) fn load_settings(network: Network, backend_url: Option<&str>) -> Result<Settings> {
    let mut settings = settings::load().context("failed to load ~/.shadow/config.yaml")?;
    settings.apply_env(network);
    if let Some(url) = backend_url {
        settings.backend_url = url.to_string();
    }
    Ok(settings)
}

pub(crate) fn load_manifest(dir: &Path) -> Result<Manifest> {
    match manifest::load(dir) {
        Ok(m) => Ok(m),
        Err(ManifestError::NotFound { .. }) => bail!(
            "{} is not a shadow project (no shadow.json); run `shadow init` first",
            dir.display()
        ),
        Err(e) => {
            Err(e).with_context(|| format!("failed to read the manifest in {}", dir.display()))
        }
    }
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// The real stage implementations, configured from settings.
pub(crate) struct Collaborators {
    backend: BackendClient,
    anchor: AnchorDeployer,
    spl_token: SplTokenMinter,
}

impl Collaborators {
    pub(crate) fn new(settings: &Settings, network: Network) -> Self {
        Self {
            backend: BackendClient::from_settings(settings),
            anchor: AnchorDeployer::system(settings.toolchain.anchor.clone()),
            spl_token: SplTokenMinter::system(
                settings.toolchain.spl_token.clone(),
                settings.rpc_url(network),
            ),
        }
    }

    pub(crate) fn stages(&self) -> Stages<'_> {
        Stages {
            uploader: &self.backend,
            deployer: &self.anchor,
            minter: &self.spl_token,
            registrar: &self.backend,
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct FailureJson<'a> {
    state: DeployState,
    stage: Stage,
    reached: DeployState,
    error: String,
    guidance: Option<&'static str>,
    manifest: &'a Manifest,
    warnings: &'a [Warning],
}

/// Print a pipeline result. Warnings always go to stderr, whatever the log
/// level or output format. A failure becomes the command's error.
pub(crate) fn finish(
    result: Result<DeployReport, DeployFailure>,
    json: bool,
) -> Result<DeployReport> {
    match result {
        Ok(report) => {
            print_warnings(&report.warnings);
            if json {
                print_json(&report)?;
            } else {
                print_report(&report);
            }
            Ok(report)
        }
        Err(failure) => {
            print_warnings(&failure.warnings);
            if json {
                print_json(&FailureJson {
                    state: failure.state(),
                    stage: failure.stage,
                    reached: failure.reached,
                    error: failure.error.to_string(),
                    guidance: failure.error.guidance(),
                    manifest: &failure.manifest,
                    warnings: &failure.warnings,
                })?;
            } else if let Some(hint) = failure.error.guidance() {
                eprintln!("{} {hint}", "hint:".cyan().bold());
            }
            Err(anyhow::Error::new(failure))
        }
    }
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("failed to serialize JSON")?
    );
    Ok(())
}

pub(crate) fn print_warnings(warnings: &[Warning]) {
    for w in warnings {
        eprintln!("{} {}: {}", "warning:".yellow().bold(), w.stage, w.message);
        if let Some(guidance) = &w.guidance {
            eprintln!("  {} {guidance}", "hint:".cyan());
        }
    }
}

fn print_report(report: &DeployReport) {
    let m = &report.manifest;
    println!(
        "{} '{}' deployed ({}, {})",
        "✓".green().bold(),
        m.name,
        m.network,
        m.storage
    );
    for outcome in &report.outcomes {
        let mark = match outcome.status {
            StageStatus::Ran => "✓".green(),
            StageStatus::Skipped => "–".bright_black(),
            StageStatus::Failed => "✗".red(),
        };
        println!("  {mark} {:<8} {}", outcome.stage.name(), outcome.detail);
    }
    println!();
    print_addresses(m);
}

/// Recorded addresses, one per line, `-` for unset.
pub(crate) fn print_addresses(m: &Manifest) {
    let rows = [
        ("owner", m.owner.as_ref().map(ToString::to_string)),
        ("content", m.storage_cid.as_ref().map(ToString::to_string)),
        ("program", m.program_address.as_ref().map(ToString::to_string)),
        ("token", m.token_mint.as_ref().map(ToString::to_string)),
        ("domain", m.domain.clone()),
    ];
    for (label, value) in rows {
        let value = value.unwrap_or_else(|| "-".bright_black().to_string());
        println!("  {label:<8} {value}");
    }
}
