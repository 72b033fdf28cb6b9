//! Error types for shadow-client.

use shadow_core::StorageKind;
use thiserror::Error;

/// A failed backend or RPC call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status.
    #[error("{method} {url} returned HTTP {status}: {body}")]
    Status {
        method: String,
        url: String,
        status: u16,
        body: String,
    },

    /// Connection, DNS, TLS or timeout failure.
    #[error("{method} {url} failed: {message}")]
    Transport {
        method: String,
        url: String,
        message: String,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// A 2xx response that lacks the fields the caller needs.
    #[error("unexpected response from {url}: {reason}")]
    InvalidResponse { url: String, reason: String },

    /// JSON-RPC level error object.
    #[error("RPC error {code} from {url}: {message}")]
    Rpc {
        url: String,
        code: i64,
        message: String,
    },

    /// Rejected locally before any request was sent.
    #[error("invalid request: {0}")]
    InvalidInput(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// A failed content upload, with enough context to decide on a retry.
#[derive(Debug, Error)]
#[error("upload of {file_count} file(s) to {backend} failed: {cause}")]
pub struct UploadError {
    pub backend: StorageKind,
    pub file_count: usize,
    #[source]
    pub cause: ClientError,
}

/// Why a domain name was rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("domain name cannot be empty")]
    Empty,

    #[error("domain is {len} characters long (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("domain must have at least two labels (e.g. example.com or name.shadow)")]
    MissingTld,

    #[error("domain labels cannot be empty")]
    EmptyLabel,

    #[error("label '{0}' is longer than 63 characters")]
    LabelTooLong(String),

    #[error("'{0}' is not allowed; use letters, digits and hyphens")]
    InvalidChar(char),

    #[error("label '{0}' cannot start or end with a hyphen")]
    Hyphen(String),
}

/// Errors from the domain registration flow.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("invalid domain '{domain}': {reason}")]
    InvalidDomain {
        domain: String,
        #[source]
        reason: DomainError,
    },

    /// The domain is registered to another identity. Nothing was written.
    #[error("domain '{domain}' is already registered to {owner}")]
    Conflict { domain: String, owner: String },

    #[error(transparent)]
    Client(#[from] ClientError),
}
