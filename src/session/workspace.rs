//! Async front end over [`RedactionSession`].
//!
//! The session lock is never held across a service call. Other events
//! (selections, toggles, a document swap) run while the detector or the
//! mutation service is working, and the session's document-id check
//! discards whatever comes back for a document that is no longer active.
//! A call whose future is dropped before completing (timeout, `select!`,
//! task abort) returns the session to `Idle` so it can be retried.

use super::{RedactionSession, SessionState};
use crate::config::EngineConfig;
use crate::document::Document;
use crate::domain::EntityId;
use crate::error::EngineResult;
use crate::services::{DetectorService, MutationService};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

/// Releases the busy state of a service call that never completed.
struct InFlight {
    session: Arc<Mutex<RedactionSession>>,
    busy: Option<SessionState>,
}

impl InFlight {
    fn new(session: &Arc<Mutex<RedactionSession>>, busy: SessionState) -> Self {
        Self {
            session: Arc::clone(session),
            busy: Some(busy),
        }
    }

    /// The response was handed to the session; nothing to release.
    fn completed(mut self) {
        self.busy = None;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let Some(busy) = self.busy.take() else {
            return;
        };
        warn!(state = %busy, "service call dropped before completion");

        if let Ok(mut session) = self.session.try_lock() {
            session.release(busy);
            return;
        }
        let session = Arc::clone(&self.session);
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    session.lock().await.release(busy);
                });
            }
            Err(_) => warn!(state = %busy, "no runtime to release busy state"),
        }
    }
}

/// Shared handle to the active session and its external services.
#[derive(Clone)]
pub struct Workspace {
    session: Arc<Mutex<RedactionSession>>,
    detector: Arc<dyn DetectorService>,
    mutation: Arc<dyn MutationService>,
}

impl Workspace {
    pub fn new(
        document: Document,
        config: EngineConfig,
        detector: Arc<dyn DetectorService>,
        mutation: Arc<dyn MutationService>,
    ) -> EngineResult<Self> {
        Ok(Self {
            session: Arc::new(Mutex::new(RedactionSession::new(document, config)?)),
            detector,
            mutation,
        })
    }

    /// Locks the session for synchronous event handling.
    pub async fn lock(&self) -> MutexGuard<'_, RedactionSession> {
        self.session.lock().await
    }

    /// Swaps the active document.
    pub async fn open_document(&self, document: Document) {
        self.session.lock().await.load_document(document);
    }

    /// Runs the detector on the active document and merges its findings.
    ///
    /// Fails with `Busy` while another detection or an export is running,
    /// `DetectorFailure` when the call or its payload fails (store
    /// untouched, retry allowed) and `StaleResponse` when the document was
    /// swapped before the response arrived. Dropping the future before it
    /// resolves abandons the detection and leaves the session idle.
    pub async fn detect(&self) -> EngineResult<Vec<EntityId>> {
        let ticket = self.session.lock().await.begin_detection()?;
        let in_flight = InFlight::new(&self.session, SessionState::Detecting(ticket.document_id()));
        debug!(detector = self.detector.name(), level = %ticket.level(), "calling detector");

        let response = self.detector.detect(ticket.document(), ticket.level()).await;
        if let Err(e) = &response {
            warn!(detector = self.detector.name(), error = %e, "detector call failed");
        }

        let mut session = self.session.lock().await;
        in_flight.completed();
        session.complete_detection(ticket, response)
    }

    /// Sends the projection to the mutation service and returns the new
    /// document bytes.
    pub async fn export(&self) -> EngineResult<Vec<u8>> {
        let ticket = self.session.lock().await.begin_export()?;
        let in_flight = InFlight::new(&self.session, SessionState::Exporting(ticket.document_id()));
        debug!(
            service = self.mutation.name(),
            rects = ticket.request().rects.len(),
            "calling mutation service"
        );

        let response = self.mutation.apply(ticket.request()).await;
        if let Err(e) = &response {
            warn!(service = self.mutation.name(), error = %e, "mutation service call failed");
        }

        let mut session = self.session.lock().await;
        in_flight.completed();
        session.complete_export(ticket, response)
    }
}
