//! `X-Shadow-Auth` request signing.
//!
//! Header value: `<wallet>:<unix_ts>:<base58 signature>`, where the signature
//! is ed25519 over `shadow-auth:<wallet>:<unix_ts>`. A header is built fresh
//! for every authenticated request and never stored.

use std::fmt;

use chrono::Utc;
use shadow_core::identity::verify_signature;
use shadow_core::{Address, Identity};

pub const HEADER_NAME: &str = "X-Shadow-Auth";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeader {
    pub wallet: Address,
    pub timestamp: i64,
    pub signature: String,
}

impl AuthHeader {
    /// Sign with the current time.
    pub fn sign(identity: &Identity) -> Self {
        Self::sign_at(identity, Utc::now().timestamp())
    }

    pub fn sign_at(identity: &Identity, timestamp: i64) -> Self {
        let wallet = identity.public_key();
        let signature = identity.sign(Self::message(&wallet, timestamp).as_bytes());
        Self {
            wallet,
            timestamp,
            signature: bs58::encode(signature).into_string(),
        }
    }

    /// The signed payload.
    pub fn message(wallet: &Address, timestamp: i64) -> String {
        format!("shadow-auth:{wallet}:{timestamp}")
    }

    pub fn value(&self) -> String {
        self.to_string()
    }

    /// Parse a header value. Returns `None` on any structural problem.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.trim().splitn(3, ':');
        let wallet = parts.next()?.parse().ok()?;
        let timestamp = parts.next()?.parse().ok()?;
        let signature = parts.next()?.to_string();
        Some(Self {
            wallet,
            timestamp,
            signature,
        })
    }

    pub fn verify(&self) -> bool {
        let Ok(sig) = bs58::decode(&self.signature).into_vec() else {
            return false;
        };
        verify_signature(
            &self.wallet,
            Self::message(&self.wallet, self.timestamp).as_bytes(),
            &sig,
        )
    }
}

impl fmt::Display for AuthHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.wallet, self.timestamp, self.signature)
    }
}
