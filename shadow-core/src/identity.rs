//! Project-scoped signing identity.
//!
//! # Storage layout
//!
//! ```text
//! <project>/.shadow/            (mode 0700)
//!   wallet.json                 {"publicKey": "<base58>", "secretKey": [64 bytes]}
//!   id.json                     [64 bytes]: Solana CLI keypair export for toolchains
//! ```
//!
//! `wallet.json` is the source of truth and is never regenerated once it
//! exists. `id.json` is derived from it and rewritten whenever it is missing
//! or holds a different key.

use std::fmt;
use std::path::{Path, PathBuf};

use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Serialize};

use crate::error::IdentityError;
use crate::types::Address;

pub const STATE_DIR: &str = ".shadow";
pub const WALLET_FILE: &str = "wallet.json";
pub const KEYPAIR_FILE: &str = "id.json";

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// An ed25519 key pair that signs backend requests and pays transaction fees.
pub struct Identity {
    key: ed25519_dalek::SigningKey,
}

impl Identity {
    /// Generate a new random key pair.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    /// Rebuild from the 64-byte `secret || public` layout. Fails if the public
    /// half does not match the secret half.
    pub fn from_keypair_bytes(bytes: &[u8; 64]) -> Result<Self, ed25519_dalek::SignatureError> {
        Ok(Self {
            key: ed25519_dalek::SigningKey::from_keypair_bytes(bytes)?,
        })
    }

    /// The 64-byte `secret || public` layout used by Solana tooling.
    pub fn to_keypair_bytes(&self) -> [u8; 64] {
        self.key.to_keypair_bytes()
    }

    pub fn public_key(&self) -> Address {
        Address::from_bytes(&self.key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.key.sign(message).to_bytes()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({}, <redacted>)", self.public_key())
    }
}

/// Check an ed25519 signature against a base58 public key.
pub fn verify_signature(public_key: &Address, message: &[u8], signature: &[u8]) -> bool {
    let Ok(pk_bytes) = bs58::decode(public_key.as_str()).into_vec() else {
        return false;
    };
    let Ok(pk_bytes) = <[u8; 32]>::try_from(pk_bytes.as_slice()) else {
        return false;
    };
    let Ok(sig_bytes) = <[u8; 64]>::try_from(signature) else {
        return false;
    };
    let Ok(vk) = ed25519_dalek::VerifyingKey::from_bytes(&pk_bytes) else {
        return false;
    };
    vk.verify(message, &ed25519_dalek::Signature::from_bytes(&sig_bytes))
        .is_ok()
}

/// Result of [`ensure_identity`].
#[derive(Debug)]
pub struct EnsuredIdentity {
    pub identity: Identity,
    /// `true` when the key pair was generated by this call. The caller must
    /// surface this to the user: the key file is the only copy.
    pub created: bool,
    pub wallet_path: PathBuf,
    /// Solana CLI keypair export, passed to toolchain subprocesses.
    pub keypair_path: PathBuf,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WalletFile {
    public_key: String,
    secret_key: Vec<u8>,
}

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<project>/.shadow/`
pub fn state_dir(project_dir: &Path) -> PathBuf {
    project_dir.join(STATE_DIR)
}

/// `<project>/.shadow/wallet.json`
pub fn wallet_path(project_dir: &Path) -> PathBuf {
    state_dir(project_dir).join(WALLET_FILE)
}

/// `<project>/.shadow/id.json`
pub fn keypair_path(project_dir: &Path) -> PathBuf {
    state_dir(project_dir).join(KEYPAIR_FILE)
}

// ---------------------------------------------------------------------------
// 2. Load / ensure
// ---------------------------------------------------------------------------

/// Load the persisted identity, or `Ok(None)` if none exists yet.
///
/// A wallet file that exists but cannot be read or decoded is an error.
pub fn load_identity(project_dir: &Path) -> Result<Option<Identity>, IdentityError> {
    let path = wallet_path(project_dir);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let wallet: WalletFile = serde_json::from_str(&contents).map_err(|e| corrupt(&path, e))?;

    let bytes: [u8; 64] = wallet.secret_key.as_slice().try_into().map_err(|_| {
        corrupt(
            &path,
            format!("secretKey has {} bytes, expected 64", wallet.secret_key.len()),
        )
    })?;
    let identity = Identity::from_keypair_bytes(&bytes).map_err(|e| corrupt(&path, e))?;
    if identity.public_key().as_str() != wallet.public_key {
        return Err(corrupt(&path, "publicKey does not match secretKey"));
    }
    Ok(Some(identity))
}

/// Load the project identity, generating and persisting one if absent.
pub fn ensure_identity(project_dir: &Path) -> Result<EnsuredIdentity, IdentityError> {
    let wallet = wallet_path(project_dir);
    let keypair = keypair_path(project_dir);

    let (identity, created) = match load_identity(project_dir)? {
        Some(identity) => (identity, false),
        None => {
            let identity = Identity::generate();
            save_wallet(project_dir, &identity)?;
            tracing::warn!(
                "generated new identity {} at {}; back this file up, it is the only copy",
                identity.public_key(),
                wallet.display()
            );
            (identity, true)
        }
    };

    if !keypair_matches(&keypair, &identity) {
        if keypair.exists() {
            tracing::warn!(
                "{} does not hold identity {}; rewriting it",
                keypair.display(),
                identity.public_key()
            );
        }
        export_keypair(project_dir, &identity)?;
    }

    Ok(EnsuredIdentity {
        identity,
        created,
        wallet_path: wallet,
        keypair_path: keypair,
    })
}

// ---------------------------------------------------------------------------
// 3. Save
// ---------------------------------------------------------------------------

fn save_wallet(project_dir: &Path, identity: &Identity) -> Result<(), IdentityError> {
    let wallet = WalletFile {
        public_key: identity.public_key().to_string(),
        secret_key: identity.to_keypair_bytes().to_vec(),
    };
    let json = serde_json::to_string_pretty(&wallet)?;
    write_private(project_dir, &wallet_path(project_dir), &json)
}

/// Whether the toolchain keypair at `path` is exactly `identity`'s key pair.
/// Unreadable or malformed exports count as a mismatch.
fn keypair_matches(path: &Path, identity: &Identity) -> bool {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|contents| serde_json::from_str::<Vec<u8>>(&contents).ok())
        .is_some_and(|bytes| bytes.as_slice() == identity.to_keypair_bytes().as_slice())
}

fn export_keypair(project_dir: &Path, identity: &Identity) -> Result<(), IdentityError> {
    let json = serde_json::to_string(&identity.to_keypair_bytes().to_vec())?;
    write_private(project_dir, &keypair_path(project_dir), &json)
}

/// Write via `.tmp` + rename inside `.shadow/`, with 0600 file permissions.
fn write_private(project_dir: &Path, path: &Path, contents: &str) -> Result<(), IdentityError> {
    let dir = state_dir(project_dir);
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        set_dir_permissions(&dir)?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, contents).map_err(|e| io_err(&tmp, e))?;
    set_file_permissions(&tmp)?;
    std::fs::rename(&tmp, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> IdentityError {
    IdentityError::Io {
        path: path.into(),
        source,
    }
}

fn corrupt(path: &Path, reason: impl fmt::Display) -> IdentityError {
    IdentityError::Corrupt {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), IdentityError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), IdentityError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), IdentityError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), IdentityError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
