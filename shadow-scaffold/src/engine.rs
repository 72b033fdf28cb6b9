//! Tera engine with embedded templates, and the file maps they render to.
//!
//! | Template                     | Output (relative to the project root)        |
//! |------------------------------|----------------------------------------------|
//! | `index.html.tera`            | `assets/index.html`                          |
//! | `README.md.tera`             | `README.md`                                  |
//! | `gitignore.tera`             | `.gitignore`                                 |
//! | `Anchor.toml.tera`           | `programs/Anchor.toml`                       |
//! | `workspace.Cargo.toml.tera`  | `programs/Cargo.toml`                        |
//! | `program.Cargo.toml.tera`    | `programs/programs/<crate>/Cargo.toml`       |
//! | `lib.rs.tera`                | `programs/programs/<crate>/src/lib.rs`       |
//! | `shadow-integration.js.tera` | `shadow-integration.js` (`convert` only)     |

use std::path::{Path, PathBuf};

use tera::Tera;

use crate::context::{IntegrationContext, ProjectContext};
use crate::error::{io_err, ScaffoldError};

pub const INTEGRATION_FILE: &str = "shadow-integration.js";

const TPLS: &[(&str, &str)] = &[
    ("index.html.tera", include_str!("templates/index.html.tera")),
    ("README.md.tera", include_str!("templates/README.md.tera")),
    ("gitignore.tera", include_str!("templates/gitignore.tera")),
    ("Anchor.toml.tera", include_str!("templates/Anchor.toml.tera")),
    (
        "workspace.Cargo.toml.tera",
        include_str!("templates/workspace.Cargo.toml.tera"),
    ),
    (
        "program.Cargo.toml.tera",
        include_str!("templates/program.Cargo.toml.tera"),
    ),
    ("lib.rs.tera", include_str!("templates/lib.rs.tera")),
    (
        "shadow-integration.js.tera",
        include_str!("templates/shadow-integration.js.tera"),
    ),
];

/// A rendered file: path relative to the project root, and its contents.
pub type RenderedFile = (PathBuf, String);

pub struct Scaffold {
    tera: Tera,
}

impl Scaffold {
    pub fn new() -> Result<Self, ScaffoldError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TPLS.iter().copied())?;
        Ok(Self { tera })
    }

    /// Render every file of a new project, excluding `shadow.json`, which is
    /// written through the manifest store.
    pub fn render_project(&self, ctx: &ProjectContext) -> Result<Vec<RenderedFile>, ScaffoldError> {
        let tera_ctx = ctx.to_tera_context()?;
        let program_dir = Path::new("programs")
            .join("programs")
            .join(&ctx.crate_name);
        let outputs = [
            ("index.html.tera", Path::new("assets").join("index.html")),
            ("README.md.tera", PathBuf::from("README.md")),
            ("gitignore.tera", PathBuf::from(".gitignore")),
            ("Anchor.toml.tera", Path::new("programs").join("Anchor.toml")),
            (
                "workspace.Cargo.toml.tera",
                Path::new("programs").join("Cargo.toml"),
            ),
            ("program.Cargo.toml.tera", program_dir.join("Cargo.toml")),
            ("lib.rs.tera", program_dir.join("src").join("lib.rs")),
        ];

        outputs
            .into_iter()
            .map(|(name, path)| -> Result<RenderedFile, ScaffoldError> {
                Ok((path, self.tera.render(name, &tera_ctx)?))
            })
            .collect()
    }

    pub fn render_integration(&self, ctx: &IntegrationContext) -> Result<String, ScaffoldError> {
        Ok(self
            .tera
            .render("shadow-integration.js.tera", &ctx.to_tera_context()?)?)
    }
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Create `dir` and write `files` into it. Fails without writing anything if
/// `dir` already exists.
pub fn write_new_project(dir: &Path, files: &[RenderedFile]) -> Result<(), ScaffoldError> {
    if dir.exists() {
        return Err(ScaffoldError::AlreadyExists {
            path: dir.to_path_buf(),
        });
    }
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    for (rel, contents) in files {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        std::fs::write(&path, contents).map_err(|e| io_err(&path, e))?;
        tracing::debug!("wrote {}", path.display());
    }
    Ok(())
}

/// Write `shadow-integration.js` into `project_dir`, replacing any previous one.
pub fn write_integration(project_dir: &Path, contents: &str) -> Result<PathBuf, ScaffoldError> {
    let path = project_dir.join(INTEGRATION_FILE);
    let tmp = path.with_extension("js.tmp");
    std::fs::write(&tmp, contents).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(path)
}
