//! # shadow-scaffold
//!
//! Tera templates for the files `shadow init` creates and the
//! `shadow-integration.js` that `shadow convert` writes.
//!
//! ```rust,no_run
//! use shadow_core::{Network, StorageKind};
//! use shadow_scaffold::{ProjectContext, Scaffold};
//!
//! fn preview() -> Result<(), shadow_scaffold::ScaffoldError> {
//!     let ctx = ProjectContext::new("my-site", Network::Devnet, StorageKind::Ipfs)?;
//!     for (path, content) in Scaffold::new()?.render_project(&ctx)? {
//!         println!("{}: {} bytes", path.display(), content.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{validate_project_name, IntegrationContext, ProjectContext};
pub use engine::{write_integration, write_new_project, RenderedFile, Scaffold, INTEGRATION_FILE};
pub use error::ScaffoldError;
