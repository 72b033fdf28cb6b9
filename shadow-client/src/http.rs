//! Thin blocking HTTP layer over `ureq` shared by the backend and RPC clients.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::{AuthHeader, HEADER_NAME};
use crate::error::ClientError;

/// Longest response body carried into an error message.
const ERROR_BODY_MAX: usize = 512;

#[derive(Debug, Clone)]
pub(crate) struct Http {
    agent: ureq::Agent,
    base_url: String,
}

impl Http {
    pub(crate) fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub(crate) fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        let mut req = self.agent.get(&url);
        for (k, v) in query {
            req = req.query(k, v);
        }
        tracing::debug!("GET {url}");
        let resp = req.call().map_err(|e| call_error("GET", &url, e))?;
        decode(&url, resp)
    }

    /// Like [`Http::get_json`], mapping a 404 to `Ok(None)`.
    pub(crate) fn get_json_optional<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Option<T>, ClientError> {
        match self.get_json(path, &[]) {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub(crate) fn send_json<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: &B,
        auth: Option<&AuthHeader>,
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        let mut req = self.agent.request(method, &url);
        if let Some(auth) = auth {
            req = req.set(HEADER_NAME, &auth.value());
        }
        tracing::debug!("{method} {url}");
        let resp = req
            .send_json(body)
            .map_err(|e| call_error(method, &url, e))?;
        decode(&url, resp)
    }

    pub(crate) fn post_bytes<T: DeserializeOwned>(
        &self,
        path: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        tracing::debug!("POST {url} ({} bytes, {content_type})", bytes.len());
        let resp = self
            .agent
            .post(&url)
            .set("Content-Type", content_type)
            .send_bytes(bytes)
            .map_err(|e| call_error("POST", &url, e))?;
        decode(&url, resp)
    }
}

fn decode<T: DeserializeOwned>(url: &str, resp: ureq::Response) -> Result<T, ClientError> {
    resp.into_json().map_err(|e| ClientError::Decode {
        url: url.to_string(),
        source: e,
    })
}

fn call_error(method: &str, url: &str, err: ureq::Error) -> ClientError {
    match err {
        ureq::Error::Status(status, resp) => ClientError::Status {
            method: method.to_string(),
            url: url.to_string(),
            status,
            body: truncate(resp.into_string().unwrap_or_default()),
        },
        ureq::Error::Transport(t) => ClientError::Transport {
            method: method.to_string(),
            url: url.to_string(),
            message: t.to_string(),
        },
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > ERROR_BODY_MAX {
        let mut end = ERROR_BODY_MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
        body.push_str("...");
    }
    body
}

/// Percent-encode a single path segment.
pub(crate) fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for b in segment.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
