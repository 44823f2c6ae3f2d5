//! Response payloads and headers shared across handlers.
//!
//! Records, lists and stats are returned bare (no envelope); these types
//! cover the remaining fixed shapes.

use bounce_store::BackendKind;
use serde::Serialize;

/// Set to `cache` when a list was served from the snapshot.
pub const CHECKS_SOURCE_HEADER: &str = "x-checks-source";

/// When the served snapshot was taken (RFC 3339).
pub const SNAPSHOT_TAKEN_AT_HEADER: &str = "x-snapshot-taken-at";

/// `{ "success": true }` body returned by deletes.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

impl DeleteResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Health check response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Whether the record store answered its probe.
    pub ok: bool,
    pub backend: BackendKind,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
