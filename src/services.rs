//! External collaborators: the detector and the document-mutation service.
//!
//! Both are opaque to the engine. Implementations live in the host (HTTP
//! clients, local models, test doubles); the engine only defines the seam.

use crate::error::{EngineError, EngineResult};
use crate::export::ExportRequest;
use crate::geometry::BBox;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How aggressively the detector should flag content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionLevel {
    /// Dates, names, phone numbers, emails, addresses, account numbers, ids.
    #[default]
    Low,
    /// Low plus amounts, company names, zip codes, SSNs, card numbers.
    Medium,
    /// Medium plus links, IPs, keys, coordinates.
    High,
}

impl fmt::Display for DetectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        f.write_str(name)
    }
}

/// One detector finding exactly as it arrives over the wire.
///
/// Nothing here is trusted yet; the detector adapter validates it before
/// any entity is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub page: i64,
    pub bbox: BBox,
    pub text: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// Parses a detector response body.
pub fn parse_detector_response(json: &str) -> EngineResult<Vec<RawDetection>> {
    serde_json::from_str(json).map_err(|e| EngineError::detector(format!("malformed response: {}", e)))
}

/// Service returning document-space boxes of sensitive content.
#[async_trait]
pub trait DetectorService: Send + Sync {
    /// Detects entities in the document.
    ///
    /// Returns findings in document space with 0-based page indices.
    async fn detect(
        &self,
        document: &[u8],
        level: DetectionLevel,
    ) -> EngineResult<Vec<RawDetection>>;

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}

/// Service that burns the projected rectangles into the document.
#[async_trait]
pub trait MutationService: Send + Sync {
    /// Returns the new document bytes.
    async fn apply(&self, request: &ExportRequest) -> EngineResult<Vec<u8>>;

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}
