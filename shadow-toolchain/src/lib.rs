//! shadow toolchain adapters: external CLIs invoked as subprocesses.
//!
//! - [`anchor`]: build + deploy an on-chain program
//! - [`spl_token`]: mint the single-unit ownership token
//! - [`output`]: every pattern used to pull addresses out of tool output
//! - [`runner`]: the `CommandRunner` seam used to fake subprocesses in tests

pub mod anchor;
pub mod error;
pub mod output;
pub mod runner;
pub mod spl_token;

pub use anchor::AnchorDeployer;
pub use error::{MintError, MintStep, ToolchainError};
pub use runner::{CommandOutput, CommandRunner, RunError, SystemRunner};
pub use spl_token::SplTokenMinter;
