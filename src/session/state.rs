//! Busy-state machine guarding concurrent service calls.

use crate::document::DocumentId;
use crate::error::{EngineError, EngineResult};
use std::fmt;
use tracing::info;

/// What the session is waiting on.
///
/// ```text
/// Idle ──start_detection──▶ Detecting(doc) ──finish──▶ Idle
/// Idle ──start_export─────▶ Exporting(doc) ──finish──▶ Idle
/// any  ──reset (document swap)──────────────────────▶ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Detecting(DocumentId),
    Exporting(DocumentId),
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Detecting(doc) => write!(f, "detecting document {}", doc),
            Self::Exporting(doc) => write!(f, "exporting document {}", doc),
        }
    }
}

impl SessionState {
    fn busy(&self) -> EngineError {
        EngineError::Busy {
            state: self.to_string(),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_detecting(&self) -> bool {
        matches!(self, Self::Detecting(_))
    }

    /// Manual entity creation is blocked while detection is in flight.
    pub fn ensure_can_edit(&self) -> EngineResult<()> {
        if self.is_detecting() {
            Err(self.busy())
        } else {
            Ok(())
        }
    }

    pub fn start_detection(&mut self, document: DocumentId) -> EngineResult<()> {
        if !self.is_idle() {
            return Err(self.busy());
        }
        info!(%document, "detection started");
        *self = Self::Detecting(document);
        Ok(())
    }

    /// Leaves `Detecting(document)`. A mismatched document is a stale
    /// completion and leaves the state alone.
    pub fn finish_detection(&mut self, document: DocumentId) -> bool {
        if *self == Self::Detecting(document) {
            *self = Self::Idle;
            true
        } else {
            false
        }
    }

    pub fn start_export(&mut self, document: DocumentId) -> EngineResult<()> {
        if !self.is_idle() {
            return Err(self.busy());
        }
        info!(%document, "export started");
        *self = Self::Exporting(document);
        Ok(())
    }

    pub fn finish_export(&mut self, document: DocumentId) -> bool {
        if *self == Self::Exporting(document) {
            *self = Self::Idle;
            true
        } else {
            false
        }
    }

    /// Leaves `busy` for `Idle` when the state is still exactly `busy`.
    /// Used when a service call is abandoned without a response.
    pub fn release(&mut self, busy: SessionState) -> bool {
        if !busy.is_idle() && *self == busy {
            info!(state = %busy, "busy state released");
            *self = Self::Idle;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        *self = Self::Idle;
    }
}
