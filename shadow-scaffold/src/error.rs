//! Error types for shadow-scaffold.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    #[error("context serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid project name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("{path} already exists")]
    AlreadyExists { path: PathBuf },

    /// Integration file requested before the pipeline recorded an address.
    #[error("manifest has no {field} yet; run the deployment first")]
    Incomplete { field: &'static str },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ScaffoldError {
    ScaffoldError::Io {
        path: path.into(),
        source,
    }
}
