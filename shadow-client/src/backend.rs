//! Typed client for the shadow backend REST API.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shadow_core::{Address, ContentId, Identity, Settings, StorageKind};
use shadow_discovery::FileSet;

use crate::auth::AuthHeader;
use crate::error::{ClientError, RegistrationError, UploadError};
use crate::http::{encode_segment, Http};
use crate::upload::{self, Coverage, UploadOutcome};
use crate::validate::{clamp_limit, validate_domain, validate_query};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub domain: String,
    pub owner_pubkey: String,
    pub program_address: String,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub program_address: String,
    pub owner_pubkey: String,
    pub storage_cid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A wallet's public profile; `exists` is false for unknown wallets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub wallet_pubkey: String,
    #[serde(default)]
    pub profile_cid: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub exists: bool,
}

/// What [`BackendClient::register_alias`] did, or is about to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The domain was free and is now bound to the program.
    Registered,
    /// The domain was ours and now points at a different program.
    Updated,
    /// The domain was already ours and bound to this program. Nothing written.
    AlreadyRegistered,
}

/// Decide how to bind `domain` given its current record.
///
/// A record held by another key is a conflict. Ours with the same program
/// needs no write, ours with another program is re-pointed (`PUT`), and a free
/// domain is registered (`POST`).
pub fn registration_action(
    domain: &str,
    existing: Option<&DomainRecord>,
    owner: &Address,
    program: &Address,
) -> Result<RegistrationOutcome, RegistrationError> {
    match existing {
        Some(rec) if rec.owner_pubkey != owner.as_str() => Err(RegistrationError::Conflict {
            domain: domain.to_string(),
            owner: rec.owner_pubkey.clone(),
        }),
        Some(rec) if rec.program_address == program.as_str() => {
            Ok(RegistrationOutcome::AlreadyRegistered)
        }
        Some(_) => Ok(RegistrationOutcome::Updated),
        None => Ok(RegistrationOutcome::Registered),
    }
}

#[derive(Deserialize)]
struct SiteRegistered {
    program_address: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Http,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            http: Http::new(base_url, timeout),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.backend_url, settings.http_timeout())
    }

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    // -----------------------------------------------------------------------
    // Upload
    // -----------------------------------------------------------------------

    /// Publish `files` to `kind` in a single request.
    ///
    /// IPFS bundles every file into one directory object. Arweave receives
    /// only [`FileSet::primary`] and the outcome says so. No retries.
    pub fn upload(&self, files: &FileSet, kind: StorageKind) -> Result<UploadOutcome, UploadError> {
        let path = upload::endpoint(kind, files.len());
        let wrap = |cause: ClientError| UploadError {
            backend: kind,
            file_count: files.len(),
            cause,
        };

        let (body, coverage): (Value, Coverage) = if kind.supports_directories() && files.len() > 1 {
            let (content_type, payload) = upload::encode_multipart(files);
            let body = self.http.post_bytes(path, &content_type, &payload).map_err(wrap)?;
            (body, Coverage::Full)
        } else {
            let file = files.primary();
            let content_type = match kind {
                StorageKind::Ipfs => upload::mime_type(file),
                StorageKind::Arweave => "application/octet-stream",
            };
            let body = self
                .http
                .post_bytes(path, content_type, &file.contents)
                .map_err(wrap)?;
            let coverage = if files.len() > 1 {
                Coverage::Partial {
                    published: file.path.clone(),
                    omitted: files.len() - 1,
                }
            } else {
                Coverage::Full
            };
            (body, coverage)
        };

        let content_id = upload::content_id_from_response(kind, &body).ok_or_else(|| {
            wrap(ClientError::InvalidResponse {
                url: self.http.url(path),
                reason: format!("no content id in {body}"),
            })
        })?;
        tracing::info!("uploaded {} file(s) to {kind}: {content_id}", files.len());
        Ok(UploadOutcome {
            content_id,
            coverage,
        })
    }

    // -----------------------------------------------------------------------
    // Domains
    // -----------------------------------------------------------------------

    /// Bind `domain` to `program` for `identity`.
    ///
    /// The domain is validated before any request. Ownership is checked with a
    /// lookup first; a domain held by another key is a [`RegistrationError::Conflict`]
    /// and nothing is written.
    pub fn register_alias(
        &self,
        domain: &str,
        program: &Address,
        identity: &Identity,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        let domain = validate_domain(domain).map_err(|reason| RegistrationError::InvalidDomain {
            domain: domain.to_string(),
            reason,
        })?;
        let owner = identity.public_key();

        let existing = self.get_domain(&domain)?;
        let outcome = registration_action(&domain, existing.as_ref(), &owner, program)?;
        match outcome {
            RegistrationOutcome::AlreadyRegistered => {
                tracing::debug!("domain {domain} already points at {program}");
            }
            RegistrationOutcome::Updated => {
                let _: Value = self.http.send_json(
                    "PUT",
                    &format!("/api/domains/{}", encode_segment(&domain)),
                    &domain_body(&domain, program, &owner),
                    Some(&AuthHeader::sign(identity)),
                )?;
            }
            RegistrationOutcome::Registered => {
                let _: Value = self.http.send_json(
                    "POST",
                    "/api/domains",
                    &domain_body(&domain, program, &owner),
                    Some(&AuthHeader::sign(identity)),
                )?;
            }
        }
        if outcome != RegistrationOutcome::AlreadyRegistered {
            tracing::info!("domain {domain} -> {program} ({outcome:?})");
        }
        Ok(outcome)
    }

    /// `None` when the domain is not registered.
    pub fn get_domain(&self, domain: &str) -> Result<Option<DomainRecord>, ClientError> {
        self.http
            .get_json_optional(&format!("/api/domains/{}", encode_segment(domain)))
    }

    pub fn search_domains(&self, query: &str, limit: Option<u32>) -> Result<Vec<DomainRecord>, ClientError> {
        let query = validate_query(query)?;
        let limit = clamp_limit(limit).to_string();
        self.http
            .get_json("/api/domains/search", &[("q", query), ("limit", limit.as_str())])
    }

    pub fn list_owner_domains(&self, wallet: &Address) -> Result<Vec<DomainRecord>, ClientError> {
        self.http.get_json(
            &format!("/api/domains/owner/{}", encode_segment(wallet.as_str())),
            &[],
        )
    }

    /// Ask the backend to mark `domain` verified. Returns the reported flag.
    pub fn verify_domain(&self, domain: &str, identity: &Identity) -> Result<bool, ClientError> {
        let body: Value = self.http.send_json(
            "POST",
            &format!("/api/domains/{}/verify", encode_segment(domain)),
            &json!({}),
            Some(&AuthHeader::sign(identity)),
        )?;
        Ok(body.get("verified").and_then(Value::as_bool).unwrap_or(false))
    }

    // -----------------------------------------------------------------------
    // Sites and profiles
    // -----------------------------------------------------------------------

    pub fn get_site(&self, program_address: &str) -> Result<Option<SiteRecord>, ClientError> {
        self.http
            .get_json_optional(&format!("/api/sites/{}", encode_segment(program_address)))
    }

    pub fn search_sites(&self, query: &str, limit: Option<u32>) -> Result<Vec<SiteRecord>, ClientError> {
        let query = validate_query(query)?;
        let limit = clamp_limit(limit).to_string();
        self.http
            .get_json("/api/sites/search", &[("q", query), ("limit", limit.as_str())])
    }

    /// Index a site under the identity's wallet. Returns the address the
    /// backend recorded it under.
    pub fn register_site(
        &self,
        identity: &Identity,
        storage_cid: &ContentId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<String, ClientError> {
        let body = json!({
            "owner_pubkey": identity.public_key().as_str(),
            "storage_cid": storage_cid.0,
            "name": name,
            "description": description,
        });
        let resp: SiteRegistered =
            self.http
                .send_json("POST", "/api/sites", &body, Some(&AuthHeader::sign(identity)))?;
        Ok(resp.program_address)
    }

    pub fn get_profile(&self, wallet: &Address) -> Result<Profile, ClientError> {
        self.http.get_json(
            &format!("/api/profiles/{}", encode_segment(wallet.as_str())),
            &[],
        )
    }
}

fn domain_body(domain: &str, program: &Address, owner: &Address) -> Value {
    json!({
        "domain": domain,
        "program_address": program.as_str(),
        "owner_pubkey": owner.as_str(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn domain_record_tolerates_missing_optional_fields() {
        let rec: DomainRecord = serde_json::from_value(json!({
            "domain": "a.shadow",
            "owner_pubkey": "o",
            "program_address": "p"
        }))
        .unwrap();
        assert!(!rec.verified);
        assert!(rec.expires_at.is_none());
    }

    #[test]
    fn profile_for_unknown_wallet() {
        let p: Profile = serde_json::from_value(json!({
            "wallet_pubkey": "w",
            "profile_cid": null,
            "is_public": false,
            "exists": false
        }))
        .unwrap();
        assert!(!p.exists);
    }

    #[test]
    fn domain_body_uses_backend_field_names() {
        let program = Address::from_bytes(&[1; 32]);
        let owner = Address::from_bytes(&[2; 32]);
        let body = domain_body("a.shadow", &program, &owner);
        assert_eq!(body["program_address"], program.as_str());
        assert_eq!(body["owner_pubkey"], owner.as_str());
    }

    fn record(owner: &Address, program: &Address) -> DomainRecord {
        DomainRecord {
            domain: "site.shadow".into(),
            owner_pubkey: owner.to_string(),
            program_address: program.to_string(),
            verified: false,
            created_at: None,
            updated_at: None,
            expires_at: None,
        }
    }

    #[rstest]
    #[case::free(None, Ok(RegistrationOutcome::Registered))]
    #[case::ours_same_program(Some((2, 1)), Ok(RegistrationOutcome::AlreadyRegistered))]
    #[case::ours_other_program(Some((2, 9)), Ok(RegistrationOutcome::Updated))]
    #[case::held_by_another_key(Some((7, 1)), Err(7))]
    fn registration_decision(
        #[case] existing: Option<(u8, u8)>,
        #[case] expected: Result<RegistrationOutcome, u8>,
    ) {
        let program = Address::from_bytes(&[1; 32]);
        let owner = Address::from_bytes(&[2; 32]);
        let existing = existing
            .map(|(o, p)| record(&Address::from_bytes(&[o; 32]), &Address::from_bytes(&[p; 32])));

        match (registration_action("site.shadow", existing.as_ref(), &owner, &program), expected) {
            (Ok(outcome), Ok(want)) => assert_eq!(outcome, want),
            (Err(RegistrationError::Conflict { domain, owner: holder }), Err(byte)) => {
                assert_eq!(domain, "site.shadow");
                assert_eq!(holder, Address::from_bytes(&[byte; 32]).to_string());
            }
            (got, want) => panic!("got {got:?}, expected {want:?}"),
        }
    }
}
