//! Minimal Solana JSON-RPC client: account existence and executability.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use shadow_core::{Address, Network, Settings};

use crate::error::ClientError;
use crate::http::Http;

/// The parts of `getAccountInfo` the CLI reports.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountInfo {
    pub lamports: u64,
    pub owner: String,
    pub executable: bool,
    /// Data length in bytes; absent on older RPC nodes.
    #[serde(default)]
    pub space: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct RpcClient {
    http: Http,
}

impl RpcClient {
    pub fn new(url: &str, timeout: Duration) -> Self {
        Self {
            http: Http::new(url, timeout),
        }
    }

    pub fn for_network(settings: &Settings, network: Network) -> Self {
        Self::new(settings.rpc_url(network), settings.http_timeout())
    }

    pub fn url(&self) -> &str {
        self.http.base_url()
    }

    /// `None` when the account does not exist.
    pub fn account_info(&self, address: &Address) -> Result<Option<AccountInfo>, ClientError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getAccountInfo",
            "params": [address.as_str(), {"encoding": "base64"}],
        });
        let response: Value = self.http.send_json("POST", "", &request, None)?;
        parse_account_info(self.url(), response)
    }
}

/// Decode a `getAccountInfo` response envelope.
pub fn parse_account_info(url: &str, response: Value) -> Result<Option<AccountInfo>, ClientError> {
    if let Some(err) = response.get("error") {
        return Err(ClientError::Rpc {
            url: url.to_string(),
            code: err.get("code").and_then(Value::as_i64).unwrap_or_default(),
            message: err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        });
    }
    let value = response
        .get("result")
        .and_then(|r| r.get("value"))
        .ok_or_else(|| ClientError::InvalidResponse {
            url: url.to_string(),
            reason: "missing result.value".to_string(),
        })?;
    if value.is_null() {
        return Ok(None);
    }
    serde_json::from_value(value.clone())
        .map(Some)
        .map_err(|e| ClientError::InvalidResponse {
            url: url.to_string(),
            reason: e.to_string(),
        })
}
