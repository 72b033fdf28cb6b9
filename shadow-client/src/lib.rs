//! shadow client library: the backend REST API and Solana RPC, over blocking
//! `ureq`.
//!
//! - [`backend`]: uploads, domain registration, site/profile/domain queries
//! - [`rpc`]: `getAccountInfo`
//! - [`auth`]: the signed `X-Shadow-Auth` header
//! - [`validate`]: domain and search-parameter checks done before any request

pub mod auth;
pub mod backend;
pub mod error;
mod http;
pub mod rpc;
pub mod upload;
pub mod validate;

pub use auth::AuthHeader;
pub use backend::{
    registration_action, BackendClient, DomainRecord, Profile, RegistrationOutcome, SiteRecord,
};
pub use error::{ClientError, DomainError, RegistrationError, UploadError};
pub use rpc::{AccountInfo, RpcClient};
pub use upload::{Coverage, UploadOutcome};
