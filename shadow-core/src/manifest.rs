//! Project manifest persistence.
//!
//! # Storage layout
//!
//! ```text
//! <project>/
//!   shadow.json        (manifest, pretty JSON)
//!   .shadow/           (identity material, mode 0700; see `identity`)
//! ```
//!
//! The manifest is the checkpoint state of a deployment. Every save goes
//! through `shadow.json.tmp` + `rename`, so a crash mid-write leaves either the
//! previous manifest or the new one on disk, never a truncated file.

use std::path::{Path, PathBuf};

use crate::error::ManifestError;
use crate::types::Manifest;

/// File name of the manifest inside a project directory.
pub const MANIFEST_FILE: &str = "shadow.json";

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<project>/shadow.json`: pure, no I/O.
pub fn manifest_path(project_dir: &Path) -> PathBuf {
    project_dir.join(MANIFEST_FILE)
}

/// Whether the project has been initialized.
pub fn exists(project_dir: &Path) -> bool {
    manifest_path(project_dir).is_file()
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load the manifest from `<project>/shadow.json`.
///
/// Returns `ManifestError::NotFound` if absent (a normal "not initialized"
/// outcome) and `ManifestError::Parse` with the path if the file is corrupt.
pub fn load(project_dir: &Path) -> Result<Manifest, ManifestError> {
    let path = manifest_path(project_dir);
    if !path.exists() {
        return Err(ManifestError::NotFound { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_json::from_str(&contents).map_err(|e| ManifestError::Parse { path, source: e })
}

/// Like [`load`], mapping `NotFound` to `Ok(None)`.
pub fn load_optional(project_dir: &Path) -> Result<Option<Manifest>, ManifestError> {
    match load(project_dir) {
        Ok(m) => Ok(Some(m)),
        Err(ManifestError::NotFound { .. }) => Ok(None),
        Err(e) => Err(e),
    }
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save the manifest to `<project>/shadow.json`.
///
/// Write flow: serialize → `shadow.json.tmp` sibling → `rename`. The tmp file
/// is removed if the rename fails.
pub fn save(project_dir: &Path, manifest: &Manifest) -> Result<(), ManifestError> {
    let path = manifest_path(project_dir);
    let tmp_path = path.with_file_name(format!("{MANIFEST_FILE}.tmp"));

    let mut json = serde_json::to_string_pretty(manifest)?;
    json.push('\n');
    std::fs::write(&tmp_path, json).map_err(|e| io_err(&tmp_path, e))?;
    if let Err(e) = std::fs::rename(&tmp_path, &path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(io_err(&path, e));
    }
    tracing::debug!("saved manifest: {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ManifestError {
    ManifestError::Io {
        path: path.into(),
        source,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address, ContentId, Network, StorageKind};
    use tempfile::TempDir;

    fn sample() -> Manifest {
        let mut m = Manifest::new("copnow-site", Network::Devnet, StorageKind::Ipfs);
        m.owner = Some(Address::from_bytes(&[3u8; 32]));
        m.storage_cid = Some(ContentId::from("bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi"));
        m.content_digest = Some("ab".repeat(32));
        m
    }

    #[test]
    fn manifest_path_is_correct() {
        let dir = TempDir::new().unwrap();
        assert!(manifest_path(dir.path()).ends_with("shadow.json"));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let m = sample();
        save(dir.path(), &m).expect("save");
        let loaded = load(dir.path()).expect("load");
        assert_eq!(loaded, m);
    }

    #[test]
    fn atomic_write_cleans_up_tmp() {
        let dir = TempDir::new().unwrap();
        save(dir.path(), &sample()).expect("save");
        let tmp = manifest_path(dir.path()).with_file_name("shadow.json.tmp");
        assert!(!tmp.exists(), ".tmp must be gone after successful save");
    }

    #[test]
    fn load_missing_returns_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load(dir.path()).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound { .. }));
        assert!(load_optional(dir.path()).unwrap().is_none());
    }

    #[test]
    fn corrupt_manifest_is_not_treated_as_missing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(manifest_path(dir.path()), "{ \"name\": ").unwrap();
        let err = load_optional(dir.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
    }
}
