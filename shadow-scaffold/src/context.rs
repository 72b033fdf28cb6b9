//! Template contexts: serializable payloads built from project inputs.

use serde::Serialize;
use shadow_core::{Manifest, Network, StorageKind};

use crate::error::ScaffoldError;

/// Program id written into a fresh workspace until the first deploy.
pub const PLACEHOLDER_PROGRAM_ID: &str = "11111111111111111111111111111111";

#[derive(Debug, Clone, Serialize)]
pub struct ProjectContext {
    pub name: String,
    /// `name` with `-` replaced by `_`, used for the program crate and module.
    pub crate_name: String,
    pub network: String,
    pub storage: String,
    pub program_id: String,
}

impl ProjectContext {
    pub fn new(name: &str, network: Network, storage: StorageKind) -> Result<Self, ScaffoldError> {
        validate_project_name(name)?;
        Ok(Self {
            name: name.to_string(),
            crate_name: name.replace('-', "_"),
            network: network.to_string(),
            storage: storage.to_string(),
            program_id: PLACEHOLDER_PROGRAM_ID.to_string(),
        })
    }

    pub(crate) fn to_tera_context(&self) -> Result<tera::Context, ScaffoldError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IntegrationContext {
    pub program_address: String,
    pub token_mint: String,
    pub domain: String,
    pub storage_cid: String,
    pub network: String,
}

impl IntegrationContext {
    /// Requires the program address and content id; mint and domain may be
    /// empty when those stages were skipped or degraded.
    pub fn from_manifest(manifest: &Manifest) -> Result<Self, ScaffoldError> {
        let program = manifest
            .program_address
            .as_ref()
            .ok_or(ScaffoldError::Incomplete {
                field: "programAddress",
            })?;
        let cid = manifest
            .storage_cid
            .as_ref()
            .ok_or(ScaffoldError::Incomplete { field: "storageCid" })?;
        Ok(Self {
            program_address: program.to_string(),
            token_mint: manifest
                .token_mint
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            domain: manifest.domain.clone().unwrap_or_default(),
            storage_cid: cid.to_string(),
            network: manifest.network.to_string(),
        })
    }

    pub(crate) fn to_tera_context(&self) -> Result<tera::Context, ScaffoldError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}

/// Project names become a directory, a crate and a Rust module: ASCII
/// letters, digits, `-` and `_`, starting with a letter.
pub fn validate_project_name(name: &str) -> Result<(), ScaffoldError> {
    let invalid = |reason| ScaffoldError::InvalidName {
        name: name.to_string(),
        reason,
    };
    let Some(first) = name.chars().next() else {
        return Err(invalid("name cannot be empty"));
    };
    if !first.is_ascii_alphabetic() {
        return Err(invalid("must start with a letter"));
    }
    if name.len() > 64 {
        return Err(invalid("must be at most 64 characters"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(invalid("use letters, digits, '-' and '_' only"));
    }
    Ok(())
}
