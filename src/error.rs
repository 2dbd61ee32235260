//! Error types for the redaction engine.
//!
//! Errors are grouped by how a caller is expected to react: some are
//! deferred (retry once page geometry is known), some are silent no-ops,
//! some are retryable service failures, and the rest are host-level
//! problems that propagate out for user-facing reporting.

use crate::document::DocumentId;
use crate::domain::EntityId;
use thiserror::Error;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Error type for all engine operations.
///
/// Every mutating operation that returns an error leaves the entity store
/// exactly as it was before the call.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Render geometry for the page is not known yet (not laid out, scrolled
    /// away, or degenerate). Entity creation must be deferred.
    #[error("render geometry unavailable for page {page}")]
    GeometryUnavailable { page: usize },

    /// Selection was empty (no text, or a cancelled zero-size drag).
    #[error("selection is empty")]
    EmptySelection,

    /// The detector call failed or returned a payload that did not validate.
    #[error("detector failure: {reason}")]
    DetectorFailure { reason: String },

    /// The document-mutation service call failed.
    #[error("mutation service failure: {reason}")]
    MutationServiceFailure { reason: String },

    /// A service response arrived for a document that is no longer active.
    #[error("stale response for document {received} (active document is {expected})")]
    StaleResponse {
        expected: DocumentId,
        received: DocumentId,
    },

    /// The session is busy with an in-flight operation.
    #[error("session busy: {state}")]
    Busy { state: String },

    /// No entity with this id exists in the store.
    #[error("unknown entity {id}")]
    UnknownEntity { id: EntityId },

    /// Page index does not exist in the active document.
    #[error("page {page} out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },

    /// Invalid configuration or parameters.
    #[error("invalid input for '{parameter}': {reason}")]
    InvalidInput { parameter: String, reason: String },

    /// The document could not be parsed.
    #[error("malformed document: {reason}")]
    MalformedDocument { reason: String },

    /// JSON encoding or decoding failed.
    #[error("serialization error in {context}: {source}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl EngineError {
    /// Returns true for errors that callers drop without surfacing.
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::EmptySelection | Self::StaleResponse { .. })
    }

    /// Returns true for service failures the user may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::DetectorFailure { .. } | Self::MutationServiceFailure { .. }
        )
    }

    /// Returns true when the operation should be retried once geometry arrives.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::GeometryUnavailable { .. })
    }

    pub(crate) fn invalid(parameter: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            parameter: parameter.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn detector(reason: impl Into<String>) -> Self {
        Self::DetectorFailure {
            reason: reason.into(),
        }
    }
}

impl From<lopdf::Error> for EngineError {
    fn from(err: lopdf::Error) -> Self {
        Self::MalformedDocument {
            reason: err.to_string(),
        }
    }
}
