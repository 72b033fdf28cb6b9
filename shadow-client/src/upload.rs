//! Request encoding and response parsing for the upload endpoints.

use serde_json::Value;
use shadow_core::{ContentId, StorageKind};
use shadow_discovery::{FileSet, SiteFile};

/// How much of the file set the returned content id covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coverage {
    /// Every discovered file is reachable through the content id.
    Full,
    /// Only `published` was uploaded; `omitted` files were left out because
    /// the backend has no directory semantics.
    Partial { published: String, omitted: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub content_id: ContentId,
    pub coverage: Coverage,
}

/// Endpoint used for a given backend and file count.
pub fn endpoint(kind: StorageKind, file_count: usize) -> &'static str {
    match kind {
        StorageKind::Ipfs if file_count > 1 => "/api/upload/ipfs/directory",
        StorageKind::Ipfs => "/api/upload/ipfs",
        StorageKind::Arweave => "/api/upload/arweave",
    }
}

/// Extract the content id from an upload response body.
///
/// IPFS: `cid`, then `ipfs_hash`, then `IpfsHash` (as `ipfs://<hash>`).
/// Arweave: `tx_id`, then `id`.
pub fn content_id_from_response(kind: StorageKind, body: &Value) -> Option<ContentId> {
    let field = |name: &str| {
        body.get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };
    let id = match kind {
        StorageKind::Ipfs => field("cid")
            .or_else(|| field("ipfs_hash"))
            .map(str::to_owned)
            .or_else(|| field("IpfsHash").map(|h| format!("ipfs://{h}"))),
        StorageKind::Arweave => field("tx_id").or_else(|| field("id")).map(str::to_owned),
    };
    id.map(ContentId)
}

/// `multipart/form-data` body with one `files` part per file, named by its
/// relative path. Returns `(content_type, body)`.
pub fn encode_multipart(files: &FileSet) -> (String, Vec<u8>) {
    let boundary = format!("shadow-{}", &files.digest()[..32]);
    let mut body = Vec::with_capacity(files.total_bytes() as usize + files.len() * 160);
    for file in files {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n",
                escape_quotes(&file.path)
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime_type(file)).as_bytes());
        body.extend_from_slice(&file.contents);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Content type by extension; unknown extensions are sent as raw bytes.
pub fn mime_type(file: &SiteFile) -> &'static str {
    let ext = file.path.rsplit_once('.').map(|(_, e)| e).unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "jsx" => "text/javascript",
        "tsx" => "text/plain",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}
