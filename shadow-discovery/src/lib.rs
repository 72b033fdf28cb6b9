//! Content discovery for `shadow-discovery`.
//!
//! `discover(project_dir, rules)` walks a project, keeps the files whose
//! relative path matches an include pattern and no exclude pattern, and reads
//! them into memory. The result is ordered by relative path so the same tree
//! always yields the same [`FileSet`] and the same [`FileSet::digest`].

mod rules;

use std::path::{Path, PathBuf};
use std::thread;

use sha2::{Digest, Sha256};
use thiserror::Error;
use walkdir::WalkDir;

pub use rules::{expand_braces, DiscoveryRules};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One discovered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteFile {
    /// Path relative to the project root, `/`-separated.
    pub path: String,
    pub contents: Vec<u8>,
}

/// The deployable file set: non-empty by construction, sorted by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSet {
    files: Vec<SiteFile>,
}

/// Errors from discovery.
#[derive(Debug, Error)]
pub enum DiscoverError {
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("no deployable files found under {path}")]
    Empty { path: PathBuf },
}

impl FileSet {
    pub fn files(&self) -> &[SiteFile] {
        &self.files
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SiteFile> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Always `false`; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.contents.len() as u64).sum()
    }

    /// `index.html` at the root if present, otherwise the first file.
    pub fn primary(&self) -> &SiteFile {
        self.files
            .iter()
            .find(|f| f.path == "index.html")
            .unwrap_or(&self.files[0])
    }

    /// SHA-256 over every file's path, length and bytes, in order; hex encoded.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for file in &self.files {
            hasher.update(file.path.as_bytes());
            hasher.update([0u8]);
            hasher.update((file.contents.len() as u64).to_le_bytes());
            hasher.update(&file.contents);
        }
        hex::encode(hasher.finalize())
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a SiteFile;
    type IntoIter = std::slice::Iter<'a, SiteFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Discover the deployable files under `project_dir`.
///
/// Returns `DiscoverError::Empty` when nothing matches; an empty set is never
/// handed to an upload.
pub fn discover(project_dir: &Path, rules: &DiscoveryRules) -> Result<FileSet, DiscoverError> {
    let compiled = rules.compile()?;
    let paths = collect_paths(project_dir, &compiled)?;
    if paths.is_empty() {
        return Err(DiscoverError::Empty {
            path: project_dir.to_path_buf(),
        });
    }

    let mut files = read_all(project_dir, paths)?;
    files.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(
        "discovered {} file(s) under {}",
        files.len(),
        project_dir.display()
    );
    Ok(FileSet { files })
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

fn collect_paths(
    root: &Path,
    rules: &rules::CompiledRules,
) -> Result<Vec<String>, DiscoverError> {
    let mut out = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 || !entry.file_type().is_dir() {
                return true;
            }
            match relative(root, entry.path()) {
                Some(rel) => !rules.prunes(&rel),
                None => true,
            }
        });

    for entry in walker {
        let entry = entry.map_err(|e| DiscoverError::Walk {
            root: root.to_path_buf(),
            source: e,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(rel) = relative(root, entry.path()) else {
            continue;
        };
        if rules.accepts(&rel) {
            out.push(rel);
        }
    }
    Ok(out)
}

/// `/`-separated path of `path` relative to `root`.
fn relative(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<_>>()?;
    Some(parts.join("/"))
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// Read every file, spreading the work over scoped threads.
fn read_all(root: &Path, paths: Vec<String>) -> Result<Vec<SiteFile>, DiscoverError> {
    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(paths.len())
        .max(1);
    let chunk = paths.len().div_ceil(workers);

    thread::scope(|scope| {
        let handles: Vec<_> = paths
            .chunks(chunk)
            .map(|batch| scope.spawn(move || read_batch(root, batch)))
            .collect();

        let mut files = Vec::with_capacity(paths.len());
        for handle in handles {
            let batch = handle.join().map_err(|_| DiscoverError::Io {
                path: root.to_path_buf(),
                source: std::io::Error::other("file reader thread panicked"),
            })??;
            files.extend(batch);
        }
        Ok(files)
    })
}

fn read_batch(root: &Path, batch: &[String]) -> Result<Vec<SiteFile>, DiscoverError> {
    batch
        .iter()
        .map(|rel| {
            let path = root.join(rel);
            let contents = std::fs::read(&path).map_err(|e| DiscoverError::Io { path, source: e })?;
            Ok(SiteFile {
                path: rel.clone(),
                contents,
            })
        })
        .collect()
}
