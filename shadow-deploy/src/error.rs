//! Error types for shadow-deploy.

use thiserror::Error;

use shadow_client::{RegistrationError, UploadError};
use shadow_core::{Address, IdentityError, Manifest, ManifestError};
use shadow_discovery::DiscoverError;
use shadow_toolchain::{MintError, ToolchainError};

use crate::pipeline::{DeployState, Warning};
use crate::stages::Stage;

/// Why a stage did not complete.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// The wallet on disk is not the key the manifest was deployed with.
    #[error("identity {actual} does not match the recorded owner {recorded}")]
    OwnerMismatch { recorded: Address, actual: Address },

    #[error(transparent)]
    Discover(#[from] DiscoverError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Program(#[from] ToolchainError),

    #[error(transparent)]
    Mint(#[from] MintError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// Saving the checkpoint failed. Fatal whatever the stage.
    #[error("failed to save manifest: {0}")]
    Checkpoint(#[from] ManifestError),
}

impl StageError {
    /// A short, actionable hint for the user, when there is one.
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            StageError::Identity(IdentityError::Corrupt { .. }) | StageError::OwnerMismatch { .. } => {
                Some("restore .shadow/wallet.json from your backup; a new key cannot manage existing deployments")
            }
            StageError::Discover(DiscoverError::Empty { .. }) => {
                Some("add site files (for example index.html) to the project")
            }
            StageError::Upload(_) => {
                Some("check the backend URL and retry; confirmed stages will be skipped")
            }
            StageError::Program(ToolchainError::ToolchainMissing { .. }) => {
                Some("install the missing tool and re-run the deploy")
            }
            StageError::Program(ToolchainError::DeploymentFailed { .. }) => {
                Some("check the network and that the wallet is funded")
            }
            StageError::Program(ToolchainError::NoProgramWorkspace { .. }) => {
                Some("create an Anchor workspace under the program path or run `shadow init`")
            }
            StageError::Mint(MintError::ToolchainMissing { .. }) => {
                Some("install the SPL token CLI to mint an ownership token")
            }
            StageError::Registration(RegistrationError::Conflict { .. }) => {
                Some("choose a different domain")
            }
            StageError::Registration(RegistrationError::InvalidDomain { .. }) => {
                Some("use letters, digits and hyphens, for example mysite.shadow")
            }
            _ => None,
        }
    }
}

/// A run that stopped at a fatal stage.
///
/// The manifest has already been saved with every field confirmed before
/// `stage`, so the next run picks up from there.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {error}")]
pub struct DeployFailure {
    pub stage: Stage,
    /// Last state reached before the failure.
    pub reached: DeployState,
    #[source]
    pub error: StageError,
    pub manifest: Manifest,
    pub warnings: Vec<Warning>,
}

impl DeployFailure {
    pub fn state(&self) -> DeployState {
        DeployState::Failed
    }
}
