//! Domain types for shadow projects.
//!
//! All path fields use `PathBuf`; addresses are validated on construction.
//! The [`Manifest`] is the persisted record of deployment progress and is
//! serialized as pretty JSON (`shadow.json`).

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AddressError;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Target cluster for on-chain operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Devnet,
    #[serde(alias = "mainnet-beta")]
    Mainnet,
}

impl Network {
    /// Cluster name passed to the program toolchain (`--provider.cluster`).
    pub fn cluster(&self) -> &'static str {
        match self {
            Network::Devnet => "devnet",
            Network::Mainnet => "mainnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cluster())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "devnet" => Ok(Network::Devnet),
            "mainnet" | "mainnet-beta" => Ok(Network::Mainnet),
            other => Err(format!(
                "unknown network '{other}'; expected: devnet, mainnet"
            )),
        }
    }
}

/// Content-addressed storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Ipfs,
    Arweave,
}

impl StorageKind {
    /// Whether the backend can publish a multi-file set as one addressable unit.
    pub fn supports_directories(&self) -> bool {
        matches!(self, StorageKind::Ipfs)
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageKind::Ipfs => write!(f, "ipfs"),
            StorageKind::Arweave => write!(f, "arweave"),
        }
    }
}

impl FromStr for StorageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ipfs" => Ok(StorageKind::Ipfs),
            "arweave" => Ok(StorageKind::Arweave),
            other => Err(format!(
                "unknown storage backend '{other}'; expected: ipfs, arweave"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A base58-encoded 32-byte on-chain address (program, mint, or wallet).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Encode raw public key bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self(bs58::encode(bytes).into_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first `n` characters, used for derived domain names.
    pub fn prefix(&self, n: usize) -> &str {
        let end = self.0.len().min(n);
        &self.0[..end]
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|_| AddressError::Encoding(s.to_string()))?;
        if bytes.len() != 32 {
            return Err(AddressError::Length {
                value: s.to_string(),
                len: bytes.len(),
            });
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Opaque identifier returned by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(pub String);

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ContentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContentId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_program_path() -> PathBuf {
    PathBuf::from("programs")
}

/// Per-project deployment record, persisted as `<project>/shadow.json`.
///
/// Fields are filled in stage order: `owner`, then `storage_cid`, then
/// `program_address`, then the optional `token_mint` and `domain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub storage: StorageKind,
    /// Program workspace, relative to the project root.
    #[serde(default = "default_program_path")]
    pub program_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_cid: Option<ContentId>,
    /// SHA-256 of the file set that produced `storage_cid`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_mint: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default)]
    pub converted: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Manifest {
    /// A fresh manifest with no deployment progress recorded.
    pub fn new(name: impl Into<String>, network: Network, storage: StorageKind) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            version: default_version(),
            network,
            storage,
            program_path: default_program_path(),
            owner: None,
            storage_cid: None,
            content_digest: None,
            program_address: None,
            token_mint: None,
            domain: None,
            converted: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Bump `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
