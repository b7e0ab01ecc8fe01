//! Core types and error definitions for mobgate.
//!
//! This crate provides the types shared by the compliance, client and CLI
//! crates: the error enum and the metadata that identifies an uploaded binary
//! across every MobSF API call.
//!
//! # Main types
//!
//! - [`MobgateError`]: Unified error enum for a run.
//! - [`MobgateResult`]: Convenience alias for `Result<T, MobgateError>`.
//! - [`UploadMetadata`]: Identity of an uploaded binary, as returned by MobSF.
//! - [`ScanRequest`], [`ReportRequest`], [`MasvsRequest`]: Request bodies.

/// Error types.
pub mod error;

pub use error::{MobgateError, MobgateResult};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// --- Upload metadata ---

/// Identity of an uploaded binary.
///
/// Produced by the upload call and passed unchanged to every later call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadMetadata {
    /// Service-assigned hash of the binary.
    pub hash: String,
    /// Scan type reported by the service (e.g. `apk`, `ipa`).
    pub scan_type: String,
    /// File name as stored by the service.
    pub file_name: String,
}

impl UploadMetadata {
    /// Keys every upload response must carry.
    pub const REQUIRED_KEYS: [&'static str; 3] = ["file_name", "hash", "scan_type"];

    /// Extracts the metadata from an upload response body.
    ///
    /// Fails with [`MobgateError::MalformedResponse`] when the body is not an
    /// object or lacks any required key. Missing keys are listed in sorted
    /// order. Non-string values are kept as their JSON text.
    pub fn from_response(body: &Value) -> MobgateResult<Self> {
        let obj = body.as_object().ok_or_else(|| {
            MobgateError::MalformedResponse(format!(
                "Upload response is not a JSON object: {body}"
            ))
        })?;

        let missing: Vec<&str> = Self::REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| !obj.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(MobgateError::MalformedResponse(format!(
                "Upload response missing keys: {}",
                missing.join(", ")
            )));
        }

        let field = |key: &str| match &obj[key] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        Ok(Self {
            hash: field("hash"),
            scan_type: field("scan_type"),
            file_name: field("file_name"),
        })
    }
}

// --- Request bodies ---

/// Body of `POST /api/v1/scan`.
#[derive(Debug, Clone, Serialize)]
pub struct ScanRequest<'a> {
    /// Scan type from the upload.
    pub scan_type: &'a str,
    /// File name from the upload.
    pub file_name: &'a str,
    /// Hash from the upload.
    pub hash: &'a str,
}

impl<'a> From<&'a UploadMetadata> for ScanRequest<'a> {
    fn from(meta: &'a UploadMetadata) -> Self {
        Self {
            scan_type: &meta.scan_type,
            file_name: &meta.file_name,
            hash: &meta.hash,
        }
    }
}

/// Body of `POST /api/v1/report_json`.
#[derive(Debug, Clone, Serialize)]
pub struct ReportRequest<'a> {
    /// Hash from the upload.
    pub hash: &'a str,
}

/// Body of `POST /api/v1/masvs`.
#[derive(Debug, Clone, Serialize)]
pub struct MasvsRequest<'a> {
    /// Scan type from the upload.
    pub scan_type: &'a str,
    /// File name from the upload.
    pub file_name: &'a str,
    /// Hash from the upload.
    pub hash: &'a str,
    /// Requested MASVS level (e.g. `L1`, `L2`).
    pub masvs_level: &'a str,
}

impl<'a> MasvsRequest<'a> {
    /// Builds the request for `meta` at the given level.
    pub fn new(meta: &'a UploadMetadata, level: &'a str) -> Self {
        Self {
            scan_type: &meta.scan_type,
            file_name: &meta.file_name,
            hash: &meta.hash,
            masvs_level: level,
        }
    }
}
