//! Deployment orchestrator.
//!
//! ```text
//! Init → IdentityReady → AssetsUploaded → ProgramReady → [TokenMinted] → [DomainRegistered] → Complete
//!   └──────────────── any fatal stage error ──────────────→ Failed
//! ```
//!
//! Every stage result goes through one `settle` step, which applies the
//! stage's [`StagePolicy`] and checkpoints the manifest when the stage
//! changed it. Stages only write to the manifest on success, so after a fatal
//! error the file on disk already holds exactly the confirmed fields.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use shadow_client::{Coverage, RegistrationOutcome};
use shadow_core::{ensure_identity, manifest, EnsuredIdentity, Manifest, Network, StorageKind};
use shadow_discovery::{discover, DiscoveryRules};

use crate::error::{DeployFailure, StageError};
use crate::stages::{MintTarget, ProgramTarget, Stage, StagePolicy, Stages};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How the site's canonical address is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramMode {
    /// Build and deploy the Anchor workspace at `program_path`.
    #[default]
    Anchor,
    /// Address the site by the identity's public key. No subprocess.
    /// The token minted later never becomes the site address, so a derived
    /// domain points at the identity key rather than at the mint.
    Owner,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DomainRequest {
    #[default]
    None,
    Explicit(String),
    /// `<first 8 chars of the token mint>.shadow`.
    DerivedFromToken,
}

impl DomainRequest {
    /// The normalized domain to register, given what the manifest holds.
    /// `None` when nothing is requested or the token it derives from is
    /// missing.
    pub fn resolve(&self, manifest: &Manifest) -> Option<String> {
        match self {
            DomainRequest::None => None,
            DomainRequest::Explicit(domain) => Some(domain.trim().to_ascii_lowercase()),
            DomainRequest::DerivedFromToken => manifest
                .token_mint
                .as_ref()
                .map(|mint| format!("{}.shadow", mint.prefix(8).to_ascii_lowercase())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    pub network: Network,
    pub storage: StorageKind,
    pub program_mode: ProgramMode,
    pub mint_token: bool,
    pub domain: DomainRequest,
    pub rules: DiscoveryRules,
}

impl DeployOptions {
    /// `shadow deploy` defaults: Anchor program, no token, no domain.
    pub fn deploy(network: Network, storage: StorageKind) -> Self {
        Self {
            network,
            storage,
            program_mode: ProgramMode::Anchor,
            mint_token: false,
            domain: DomainRequest::None,
            rules: DiscoveryRules::deploy(),
        }
    }

    /// `shadow convert` defaults: owner-addressed, minted, token-derived domain.
    pub fn convert(network: Network, storage: StorageKind) -> Self {
        Self {
            network,
            storage,
            program_mode: ProgramMode::Owner,
            mint_token: true,
            domain: DomainRequest::DerivedFromToken,
            rules: DiscoveryRules::convert(),
        }
    }
}

// ---------------------------------------------------------------------------
// Run results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployState {
    Init,
    IdentityReady,
    AssetsUploaded,
    ProgramReady,
    TokenMinted,
    DomainRegistered,
    Complete,
    Failed,
}

impl DeployState {
    /// The state a successful `stage` moves the run into.
    pub fn after(stage: Stage) -> Self {
        match stage {
            Stage::Identity => DeployState::IdentityReady,
            Stage::Upload => DeployState::AssetsUploaded,
            Stage::Program => DeployState::ProgramReady,
            Stage::Mint => DeployState::TokenMinted,
            Stage::Domain => DeployState::DomainRegistered,
        }
    }
}

impl fmt::Display for DeployState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeployState::Init => "init",
            DeployState::IdentityReady => "identity ready",
            DeployState::AssetsUploaded => "assets uploaded",
            DeployState::ProgramReady => "program ready",
            DeployState::TokenMinted => "token minted",
            DeployState::DomainRegistered => "domain registered",
            DeployState::Complete => "complete",
            DeployState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Something the user must see even though the run went on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub stage: Stage,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
}

impl Warning {
    pub fn new(stage: Stage, message: impl Into<String>, guidance: Option<&str>) -> Self {
        Self {
            stage,
            message: message.into(),
            guidance: guidance.map(str::to_string),
        }
    }

    fn from_error(stage: Stage, error: &StageError) -> Self {
        Self::new(stage, error.to_string(), error.guidance())
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.message)?;
        if let Some(guidance) = &self.guidance {
            write!(f, " ({guidance})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Ran,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageOutcome {
    pub stage: Stage,
    pub status: StageStatus,
    pub detail: String,
}

/// A run that reached `Complete`, possibly with warnings.
#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    pub manifest: Manifest,
    pub state: DeployState,
    pub warnings: Vec<Warning>,
    pub outcomes: Vec<StageOutcome>,
}

impl DeployReport {
    pub fn outcome(&self, stage: Stage) -> Option<&StageOutcome> {
        self.outcomes.iter().find(|o| o.stage == stage)
    }
}

// ---------------------------------------------------------------------------
// resume
// ---------------------------------------------------------------------------

/// The first stage whose output `manifest` does not confirm for `options`.
/// `None` when a run would have nothing left to do.
///
/// A changed file set is only detected while running (the upload digest), so
/// `Some(Stage::Upload)` is never returned for a recorded upload to the same
/// backend.
pub fn resume(manifest: &Manifest, options: &DeployOptions) -> Option<Stage> {
    Stage::ALL
        .into_iter()
        .find(|stage| !confirmed(*stage, manifest, options))
}

fn confirmed(stage: Stage, manifest: &Manifest, options: &DeployOptions) -> bool {
    let same_network = manifest.network == options.network;
    match stage {
        Stage::Identity => manifest.owner.is_some(),
        Stage::Upload => manifest.storage_cid.is_some() && manifest.storage == options.storage,
        Stage::Program => manifest.program_address.is_some() && same_network,
        Stage::Mint => !options.mint_token || (manifest.token_mint.is_some() && same_network),
        Stage::Domain => match options.domain.resolve(manifest) {
            None => true,
            Some(domain) => same_network && manifest.domain.as_deref() == Some(domain.as_str()),
        },
    }
}

/// Point the manifest at the requested network and storage backend, dropping
/// results recorded for another target. Returns whether anything changed.
fn retarget(manifest: &mut Manifest, options: &DeployOptions) -> bool {
    let mut changed = false;
    if manifest.network != options.network {
        tracing::info!(
            "network changed {} -> {}; program, token and domain will be redone",
            manifest.network,
            options.network
        );
        manifest.network = options.network;
        manifest.program_address = None;
        manifest.token_mint = None;
        manifest.domain = None;
        changed = true;
    }
    if manifest.storage != options.storage {
        tracing::info!(
            "storage changed {} -> {}; content will be re-uploaded",
            manifest.storage,
            options.storage
        );
        manifest.storage = options.storage;
        manifest.storage_cid = None;
        manifest.content_digest = None;
        changed = true;
    }
    changed
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

enum Step {
    /// The stage did its work and changed the manifest.
    Ran(String),
    /// The manifest already holds this stage's output.
    Confirmed(String),
    /// Not requested for this run.
    Skipped(&'static str),
}

struct Run {
    manifest: Manifest,
    state: DeployState,
    warnings: Vec<Warning>,
    outcomes: Vec<StageOutcome>,
    dirty: bool,
}

impl Run {
    fn record(&mut self, stage: Stage, status: StageStatus, detail: impl Into<String>) {
        self.outcomes.push(StageOutcome {
            stage,
            status,
            detail: detail.into(),
        });
    }

    fn failure(&self, stage: Stage, error: StageError) -> DeployFailure {
        DeployFailure {
            stage,
            reached: self.state,
            error,
            manifest: self.manifest.clone(),
            warnings: self.warnings.clone(),
        }
    }
}

pub struct Pipeline<'a> {
    project_dir: &'a Path,
    options: DeployOptions,
    stages: Stages<'a>,
}

impl<'a> Pipeline<'a> {
    pub fn new(project_dir: &'a Path, options: DeployOptions, stages: Stages<'a>) -> Self {
        Self {
            project_dir,
            options,
            stages,
        }
    }

    pub fn options(&self) -> &DeployOptions {
        &self.options
    }

    /// Drive `manifest` through every stage.
    pub fn run(&self, manifest: Manifest) -> Result<DeployReport, DeployFailure> {
        let mut run = Run {
            manifest,
            state: DeployState::Init,
            warnings: Vec::new(),
            outcomes: Vec::new(),
            dirty: false,
        };
        run.dirty = retarget(&mut run.manifest, &self.options);
        if let Some(next) = resume(&run.manifest, &self.options) {
            tracing::debug!("first unconfirmed stage: {next}");
        }

        let identity = ensure_identity(self.project_dir)
            .map_err(|e| self.abort(&run, Stage::Identity, e.into()))?;
        for stage in Stage::ALL {
            let result = match stage {
                Stage::Identity => self.bind_owner(&mut run, &identity),
                Stage::Upload => self.upload(&mut run),
                Stage::Program => self.program(&mut run, &identity),
                Stage::Mint => self.mint(&mut run, &identity),
                Stage::Domain => self.domain(&mut run, &identity),
            };
            self.settle(&mut run, stage, result)?;
        }

        tracing::info!("deployment of '{}' complete", run.manifest.name);
        Ok(DeployReport {
            manifest: run.manifest,
            state: DeployState::Complete,
            warnings: run.warnings,
            outcomes: run.outcomes,
        })
    }

    /// Apply `stage`'s policy to `result` and checkpoint the manifest if it
    /// changed. The only place a stage failure is classified.
    fn settle(
        &self,
        run: &mut Run,
        stage: Stage,
        result: Result<Step, StageError>,
    ) -> Result<(), DeployFailure> {
        match result {
            Ok(Step::Ran(detail)) => {
                tracing::info!("{stage}: {detail}");
                run.state = DeployState::after(stage);
                run.record(stage, StageStatus::Ran, detail);
                run.dirty = true;
            }
            Ok(Step::Confirmed(detail)) => {
                tracing::debug!("{stage}: already done, {detail}");
                run.state = DeployState::after(stage);
                run.record(stage, StageStatus::Skipped, detail);
            }
            Ok(Step::Skipped(reason)) => {
                tracing::debug!("{stage}: skipped, {reason}");
                run.record(stage, StageStatus::Skipped, reason);
            }
            Err(error) => match stage.policy() {
                StagePolicy::Recoverable => {
                    let warning = Warning::from_error(stage, &error);
                    tracing::warn!("{warning}");
                    run.record(stage, StageStatus::Failed, error.to_string());
                    run.warnings.push(warning);
                }
                StagePolicy::Fatal => return Err(self.abort(run, stage, error)),
            },
        }

        if run.dirty {
            run.manifest.touch();
            manifest::save(self.project_dir, &run.manifest)
                .map_err(|e| run.failure(stage, StageError::Checkpoint(e)))?;
            run.dirty = false;
        }
        Ok(())
    }

    /// Identity loading runs before the loop and is fatal by policy, so it
    /// fails through here directly.
    fn abort(&self, run: &Run, stage: Stage, error: StageError) -> DeployFailure {
        tracing::error!("{stage} stage failed: {error}");
        run.failure(stage, error)
    }

    // -----------------------------------------------------------------------
    // Stages
    // -----------------------------------------------------------------------

    /// Bind the loaded identity to the manifest. Loading itself happens before
    /// the stage loop, since every later stage signs with it.
    fn bind_owner(&self, run: &mut Run, ensured: &EnsuredIdentity) -> Result<Step, StageError> {
        let key = ensured.identity.public_key();
        if ensured.created {
            run.warnings.push(Warning::new(
                Stage::Identity,
                format!(
                    "generated a new identity {key}; {} holds the only copy of its private key",
                    ensured.wallet_path.display()
                ),
                Some("back up the .shadow directory now"),
            ));
        }

        let step = match &run.manifest.owner {
            Some(recorded) if *recorded != key => {
                return Err(StageError::OwnerMismatch {
                    recorded: recorded.clone(),
                    actual: key,
                });
            }
            Some(_) => Step::Confirmed(format!("owner {key}")),
            None => {
                run.manifest.owner = Some(key.clone());
                Step::Ran(format!("owner {key}"))
            }
        };
        Ok(step)
    }

    fn upload(&self, run: &mut Run) -> Result<Step, StageError> {
        let files = discover(self.project_dir, &self.options.rules)?;
        let digest = files.digest();
        let manifest = &mut run.manifest;

        if let Some(cid) = &manifest.storage_cid {
            if manifest.content_digest.as_deref() == Some(digest.as_str()) {
                return Ok(Step::Confirmed(format!(
                    "{} file(s) unchanged at {cid}",
                    files.len()
                )));
            }
        }

        let storage = self.options.storage;
        let outcome = self.stages.uploader.upload(&files, storage)?;
        if let Coverage::Partial { published, omitted } = &outcome.coverage {
            run.warnings.push(Warning::new(
                Stage::Upload,
                format!(
                    "{storage} stores a single object: only {published} was published, \
                     {omitted} other file(s) were left out"
                ),
                Some("use --storage ipfs to publish every file"),
            ));
        }

        manifest.storage_cid = Some(outcome.content_id.clone());
        manifest.content_digest = Some(digest);
        Ok(Step::Ran(format!(
            "{} file(s) to {storage} as {}",
            files.len(),
            outcome.content_id
        )))
    }

    fn program(&self, run: &mut Run, identity: &EnsuredIdentity) -> Result<Step, StageError> {
        if let Some(address) = &run.manifest.program_address {
            return Ok(Step::Confirmed(format!("recorded program {address}")));
        }

        let (address, how) = match self.options.program_mode {
            ProgramMode::Owner => (identity.identity.public_key(), "owner address"),
            ProgramMode::Anchor => {
                let program_dir = self.project_dir.join(&run.manifest.program_path);
                let target = ProgramTarget {
                    program_dir: &program_dir,
                    network: self.options.network,
                    keypair: &identity.keypair_path,
                    program_name: &run.manifest.name,
                };
                (self.stages.deployer.deploy(&target)?, "deployed program")
            }
        };
        run.manifest.program_address = Some(address.clone());
        Ok(Step::Ran(format!("{how} {address}")))
    }

    fn mint(&self, run: &mut Run, identity: &EnsuredIdentity) -> Result<Step, StageError> {
        if !self.options.mint_token {
            return Ok(Step::Skipped("not requested"));
        }
        if let Some(mint) = &run.manifest.token_mint {
            return Ok(Step::Confirmed(format!("recorded mint {mint}")));
        }

        let owner = identity.identity.public_key();
        let target = MintTarget {
            keypair: &identity.keypair_path,
            owner: &owner,
            workdir: self.project_dir,
        };
        let mint = self.stages.minter.mint(&target)?;
        run.manifest.token_mint = Some(mint.clone());
        Ok(Step::Ran(format!("minted {mint}")))
    }

    fn domain(&self, run: &mut Run, identity: &EnsuredIdentity) -> Result<Step, StageError> {
        let Some(domain) = self.options.domain.resolve(&run.manifest) else {
            return Ok(Step::Skipped(match self.options.domain {
                DomainRequest::DerivedFromToken => "no token to derive a domain from",
                _ => "not requested",
            }));
        };
        let Some(program) = run.manifest.program_address.clone() else {
            return Ok(Step::Skipped("no program address"));
        };
        if run.manifest.domain.as_deref() == Some(domain.as_str()) {
            return Ok(Step::Confirmed(format!("recorded domain {domain}")));
        }

        let outcome = self
            .stages
            .registrar
            .register(&domain, &program, &identity.identity)?;
        let how = match outcome {
            RegistrationOutcome::Registered => "registered",
            RegistrationOutcome::Updated => "re-pointed",
            RegistrationOutcome::AlreadyRegistered => "already bound",
        };
        run.manifest.domain = Some(domain.clone());
        Ok(Step::Ran(format!("{domain} {how} to {program}")))
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
