//! Pipeline stages, their failure policy, and the collaborator traits each
//! stage calls into.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use shadow_client::{RegistrationError, RegistrationOutcome, UploadError, UploadOutcome};
use shadow_core::{Address, Identity, Network, StorageKind};
use shadow_discovery::FileSet;
use shadow_toolchain::{MintError, ToolchainError};

// ---------------------------------------------------------------------------
// Stage + policy
// ---------------------------------------------------------------------------

/// One step of a deployment, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Identity,
    Upload,
    Program,
    Mint,
    Domain,
}

/// What a stage failure does to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePolicy {
    /// Abort the run; the manifest keeps what earlier stages confirmed.
    Fatal,
    /// Record a warning and carry on with the next stage.
    Recoverable,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Identity,
        Stage::Upload,
        Stage::Program,
        Stage::Mint,
        Stage::Domain,
    ];

    /// Fixed per stage. Mint and domain are enhancements; everything before
    /// them is needed for the site to exist at all.
    pub fn policy(self) -> StagePolicy {
        match self {
            Stage::Identity | Stage::Upload | Stage::Program => StagePolicy::Fatal,
            Stage::Mint | Stage::Domain => StagePolicy::Recoverable,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Identity => "identity",
            Stage::Upload => "upload",
            Stage::Program => "program",
            Stage::Mint => "mint",
            Stage::Domain => "domain",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Collaborator traits
// ---------------------------------------------------------------------------

/// Publishes a file set to content-addressed storage. One attempt, no retry.
pub trait ContentUploader {
    fn upload(&self, files: &FileSet, storage: StorageKind) -> Result<UploadOutcome, UploadError>;
}

/// Everything a program deployer needs to know about the project.
#[derive(Debug, Clone, Copy)]
pub struct ProgramTarget<'a> {
    /// `<project>/<program_path>`.
    pub program_dir: &'a Path,
    pub network: Network,
    /// Keypair file handed to the toolchain as the fee payer.
    pub keypair: &'a Path,
    pub program_name: &'a str,
}

/// Builds and deploys the on-chain program, returning its address.
pub trait ProgramDeployer {
    fn deploy(&self, target: &ProgramTarget<'_>) -> Result<Address, ToolchainError>;
}

#[derive(Debug, Clone, Copy)]
pub struct MintTarget<'a> {
    pub keypair: &'a Path,
    pub owner: &'a Address,
    pub workdir: &'a Path,
}

/// Mints the single-unit ownership token, returning the mint address.
pub trait TokenMinter {
    fn mint(&self, target: &MintTarget<'_>) -> Result<Address, MintError>;
}

/// Binds a human-readable domain to a program address.
pub trait DomainRegistrar {
    fn register(
        &self,
        domain: &str,
        program: &Address,
        identity: &Identity,
    ) -> Result<RegistrationOutcome, RegistrationError>;
}

/// The collaborators a [`crate::Pipeline`] drives.
#[derive(Clone, Copy)]
pub struct Stages<'a> {
    pub uploader: &'a dyn ContentUploader,
    pub deployer: &'a dyn ProgramDeployer,
    pub minter: &'a dyn TokenMinter,
    pub registrar: &'a dyn DomainRegistrar,
}
