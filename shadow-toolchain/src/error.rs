//! Error types for shadow-toolchain.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Program deployment failures. Each variant maps to a different fix for the
/// user: install the tool, fix the deploy, or inspect the output.
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("'{tool}' is not installed or not on PATH; {hint}")]
    ToolchainMissing { tool: String, hint: &'static str },

    #[error("`{step}` failed ({status}); check network and wallet funds:\n{stderr}")]
    DeploymentFailed {
        step: String,
        status: String,
        stderr: String,
    },

    #[error("could not determine program address: {reason}")]
    AddressExtraction { reason: String },

    #[error("no program workspace at {path} (Anchor.toml missing)")]
    NoProgramWorkspace { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The `spl-token` invocation a mint failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintStep {
    CreateToken,
    CreateAccount,
    Mint,
}

impl fmt::Display for MintStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MintStep::CreateToken => "create-token",
            MintStep::CreateAccount => "create-account",
            MintStep::Mint => "mint",
        })
    }
}

#[derive(Debug, Error)]
pub enum MintError {
    #[error("'{tool}' is not installed or not on PATH; install the Solana SPL token CLI")]
    ToolchainMissing { tool: String },

    #[error("spl-token {step} failed ({status}): {stderr}")]
    StepFailed {
        step: MintStep,
        status: String,
        stderr: String,
    },

    #[error("spl-token {step} could not be started: {source}")]
    Spawn {
        step: MintStep,
        #[source]
        source: std::io::Error,
    },

    #[error("no mint address in spl-token create-token output")]
    AddressExtraction,
}

impl MintError {
    pub fn step(&self) -> Option<MintStep> {
        match self {
            MintError::StepFailed { step, .. } | MintError::Spawn { step, .. } => Some(*step),
            MintError::AddressExtraction => Some(MintStep::CreateToken),
            MintError::ToolchainMissing { .. } => None,
        }
    }
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ToolchainError {
    ToolchainError::Io {
        path: path.into(),
        source,
    }
}
