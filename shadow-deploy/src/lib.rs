//! # shadow-deploy
//!
//! Deployment orchestration: identity, upload, program, mint, domain.
//!
//! Build a [`Pipeline`] over a [`Stages`] bundle and call [`Pipeline::run`]
//! with the project's manifest. The manifest is checkpointed to disk after
//! every stage, and [`resume`] tells which stage a re-run would start at.

pub mod adapters;
pub mod error;
pub mod pipeline;
pub mod stages;

pub use error::{DeployFailure, StageError};
pub use pipeline::{
    resume, DeployOptions, DeployReport, DeployState, DomainRequest, Pipeline, ProgramMode,
    StageOutcome, StageStatus, Warning,
};
pub use stages::{
    ContentUploader, DomainRegistrar, MintTarget, ProgramDeployer, ProgramTarget, Stage,
    StagePolicy, Stages, TokenMinter,
};
