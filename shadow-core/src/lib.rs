//! shadow core library: domain types, project state persistence, errors.
//!
//! - [`types`]: `Network`, `StorageKind`, `Address`, `ContentId`, `Manifest`
//! - [`manifest`]: atomic load / save of `shadow.json`
//! - [`identity`]: load-or-create the project signing key
//! - [`settings`]: user-level `~/.shadow/config.yaml`
//! - [`error`]: error enums for the above

pub mod error;
pub mod identity;
pub mod manifest;
pub mod settings;
pub mod types;

pub use error::{AddressError, IdentityError, ManifestError, SettingsError};
pub use identity::{ensure_identity, EnsuredIdentity, Identity};
pub use settings::Settings;
pub use types::{Address, ContentId, Manifest, Network, StorageKind};
