//! Address extraction from toolchain output.
//!
//! The toolchains only report addresses as text, so every pattern lives here.
//! All functions fail closed: nothing is ever defaulted to a placeholder.

use std::sync::OnceLock;

use regex::Regex;
use shadow_core::Address;

use crate::error::ToolchainError;

/// Id written into freshly scaffolded programs before the first deploy.
pub const PLACEHOLDER_PROGRAM_ID: &str = "11111111111111111111111111111111";

/// A whole base58 token. The trailing `\b` keeps an over-long token from
/// matching on its first 44 characters.
const BASE58: &str = r"[1-9A-HJ-NP-Za-km-z]{32,44}\b";

fn program_id_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"Program Id:\s*({BASE58})")).ok())
        .as_ref()
}

fn mint_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(&format!(r"(?m)(?:Creating token|^Address:)\s+({BASE58})")).ok())
        .as_ref()
}

/// Resolve the deployed program address.
///
/// Looks for `Program Id: <addr>` in the deploy output first, then falls back
/// to the `[programs.<cluster>]` table of `Anchor.toml`.
pub fn extract_program_address(
    deploy_output: &str,
    anchor_toml: Option<&str>,
    cluster: &str,
    program_name: &str,
) -> Result<Address, ToolchainError> {
    if let Some(found) = program_id_from_output(deploy_output) {
        return found;
    }
    match anchor_toml {
        Some(contents) => program_id_from_anchor_toml(contents, cluster, program_name),
        None => Err(ToolchainError::AddressExtraction {
            reason: "deploy output has no 'Program Id:' line and there is no Anchor.toml"
                .to_string(),
        }),
    }
}

/// `None` when the output has no `Program Id:` line at all.
pub fn program_id_from_output(output: &str) -> Option<Result<Address, ToolchainError>> {
    let caps = program_id_re()?.captures_iter(output).last()?;
    Some(checked(&caps[1], "deploy output"))
}

/// Read `[programs.<cluster>]`: the single entry, or the one named after the
/// program (`-` and `_` are interchangeable).
pub fn program_id_from_anchor_toml(
    contents: &str,
    cluster: &str,
    program_name: &str,
) -> Result<Address, ToolchainError> {
    let fail = |reason: String| ToolchainError::AddressExtraction { reason };
    let doc: toml::Table = contents
        .parse()
        .map_err(|e| fail(format!("Anchor.toml is not valid TOML: {e}")))?;
    let table = doc
        .get("programs")
        .and_then(|p| p.get(cluster))
        .and_then(toml::Value::as_table)
        .ok_or_else(|| fail(format!("Anchor.toml has no [programs.{cluster}] table")))?;

    let wanted = program_name.replace('-', "_");
    let value = if table.len() == 1 {
        table.values().next()
    } else {
        table
            .iter()
            .find(|(k, _)| k.replace('-', "_") == wanted)
            .map(|(_, v)| v)
    };
    let raw = value.and_then(toml::Value::as_str).ok_or_else(|| {
        fail(format!(
            "[programs.{cluster}] has no entry for '{program_name}'"
        ))
    })?;
    checked(raw, "Anchor.toml")
}

/// Mint address from `spl-token create-token` output.
pub fn extract_mint_address(output: &str) -> Option<Address> {
    mint_re()?
        .captures_iter(output)
        .find_map(|caps| caps[1].parse().ok())
}

fn checked(raw: &str, source: &str) -> Result<Address, ToolchainError> {
    if raw == PLACEHOLDER_PROGRAM_ID {
        return Err(ToolchainError::AddressExtraction {
            reason: format!("{source} still holds the placeholder id {PLACEHOLDER_PROGRAM_ID}"),
        });
    }
    raw.parse().map_err(|e| ToolchainError::AddressExtraction {
        reason: format!("{source}: {e}"),
    })
}
