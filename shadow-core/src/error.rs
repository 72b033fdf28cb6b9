//! Error types for shadow-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading or saving the project manifest (`shadow.json`).
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Underlying I/O failure, annotated with the path involved.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error (save path).
    #[error("manifest serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The manifest exists but could not be parsed.
    #[error("failed to parse manifest at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No manifest at the expected path. The project is not initialized yet.
    #[error("manifest not found at {path}")]
    NotFound { path: PathBuf },
}

/// Errors from the identity store.
///
/// Every variant is fatal to a deployment: a fresh key is never generated in
/// place of one that exists but cannot be read.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("identity file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("identity serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from user-level settings (`~/.shadow/config.yaml`).
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// A string that is not a valid 32-byte base58 address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("'{0}' is not valid base58")]
    Encoding(String),

    #[error("'{value}' decodes to {len} bytes, expected 32")]
    Length { value: String, len: usize },
}
