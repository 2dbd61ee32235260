//! Redaction session for the active document.
//!
//! The session ties the pieces together: page layout, entity store, source
//! adapters, view synchronization, the busy-state machine and the export
//! projector. It is synchronous; [`Workspace`] wraps it for async service
//! calls. Hosts running their own event loop can drive the two-phase
//! `begin_*`/`complete_*` calls directly.

pub mod state;
pub mod view;
pub mod workspace;

pub use state::SessionState;
pub use view::ViewSync;
pub use workspace::Workspace;

use crate::adapters::{
    area_entity, detection_entity, text_selection_entity, validate_detections, AreaDrag,
    SearchResults, TextSelection, TextSpan,
};
use crate::config::EngineConfig;
use crate::document::{Document, DocumentId};
use crate::domain::{EntityFilter, EntityId, RedactionEntity, VisibilityIndex};
use crate::error::{EngineError, EngineResult};
use crate::export::{project, DrawInstruction, ExportRequest};
use crate::geometry::{DocumentLayout, Point, RenderSize};
use crate::services::{DetectionLevel, RawDetection};
use crate::store::EntityStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Proof that a detection was started for a specific document.
#[must_use = "a started detection must be completed"]
#[derive(Debug, Clone)]
pub struct DetectionTicket {
    document_id: DocumentId,
    level: DetectionLevel,
    document: Arc<[u8]>,
}

impl DetectionTicket {
    pub fn document_id(&self) -> DocumentId {
        self.document_id
    }

    pub fn level(&self) -> DetectionLevel {
        self.level
    }

    /// Document bytes to send to the detector.
    pub fn document(&self) -> &[u8] {
        &self.document
    }
}

/// Proof that an export was started, carrying the request to send.
#[must_use = "a started export must be completed"]
#[derive(Debug, Clone)]
pub struct ExportTicket {
    request: ExportRequest,
}

impl ExportTicket {
    pub fn document_id(&self) -> DocumentId {
        self.request.document_id
    }

    pub fn request(&self) -> &ExportRequest {
        &self.request
    }
}

/// All redaction state for one active document.
#[derive(Debug)]
pub struct RedactionSession {
    config: EngineConfig,
    document: Document,
    layout: DocumentLayout,
    store: EntityStore,
    view: ViewSync,
    state: SessionState,
    search: SearchResults,
    drag: Option<AreaDrag>,
}

impl RedactionSession {
    pub fn new(document: Document, config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;
        info!(document = %document.id(), name = document.name(), pages = document.page_count(), "session opened");
        Ok(Self {
            layout: DocumentLayout::new(document.pages()),
            view: ViewSync::new(document.page_count(), config.page_visibility_threshold),
            store: EntityStore::new(),
            state: SessionState::Idle,
            search: SearchResults::default(),
            drag: None,
            config,
            document,
        })
    }

    /// Makes `document` the active document.
    ///
    /// Clears every entity, the search list and any drag, and returns to
    /// `Idle`. Responses still in flight for the previous document become
    /// stale.
    pub fn load_document(&mut self, document: Document) {
        info!(
            previous = %self.document.id(),
            document = %document.id(),
            name = document.name(),
            "active document changed"
        );
        self.store.reset();
        self.layout = DocumentLayout::new(document.pages());
        self.view = ViewSync::new(document.page_count(), self.config.page_visibility_threshold);
        self.state.reset();
        self.search = SearchResults::default();
        self.drag = None;
        self.document = document;
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_id(&self) -> DocumentId {
        self.document.id()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn layout(&self) -> &DocumentLayout {
        &self.layout
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn view(&self) -> &ViewSync {
        &self.view
    }

    // ----- page geometry -------------------------------------------------

    /// Records a page's live render size and re-projects the render boxes
    /// of its entities, including detector entities still waiting for it.
    /// Pending search matches on the page follow the new scale too.
    pub fn set_render_size(&mut self, page: usize, size: RenderSize) -> EngineResult<usize> {
        self.layout.set_render_size(page, size)?;
        match self.layout.geometry(page) {
            Ok(geometry) => {
                self.search.reproject_page(page, &geometry)?;
                let count =
                    self.store
                        .reproject_page(page, &geometry, self.config.detector_render_padding)?;
                debug!(page, count, "render boxes re-projected");
                Ok(count)
            }
            Err(EngineError::GeometryUnavailable { .. }) => {
                self.store.unproject_page(page);
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    /// Lays the page out at `width`, keeping its aspect ratio.
    pub fn fit_page_to_width(&mut self, page: usize, width: f64) -> EngineResult<usize> {
        let size = self.layout.fit_width(page, width)?;
        self.set_render_size(page, size)
    }

    /// Forgets a page's render size (unmounted or scrolled away).
    pub fn clear_render_size(&mut self, page: usize) -> EngineResult<()> {
        self.layout.clear_render_size(page)?;
        self.store.unproject_page(page);
        Ok(())
    }

    // ----- view synchronization -----------------------------------------

    /// Reports page visibility from the host's intersection observer.
    pub fn observe_page_visibility(&mut self, page: usize, visible_ratio: f64) -> bool {
        self.view.observe(page, visible_ratio)
    }

    pub fn go_to_page(&mut self, page: usize) -> usize {
        self.view.go_to(page)
    }

    pub fn next_page(&mut self) -> usize {
        self.view.next_page()
    }

    pub fn previous_page(&mut self) -> usize {
        self.view.previous_page()
    }

    // ----- manual text selection ----------------------------------------

    /// Adds a `manual-text` entity for the selection.
    ///
    /// Returns `Ok(None)` without touching the store when the selection is
    /// blank or its page has no geometry.
    pub fn add_text_selection(&mut self, selection: &TextSelection) -> EngineResult<Option<EntityId>> {
        self.state.ensure_can_edit()?;
        match text_selection_entity(selection, &self.layout) {
            Ok(entity) => Ok(Some(self.store.add(entity))),
            Err(e) if e.is_silent() || e.is_deferred() => {
                debug!(page = selection.page, reason = %e, "text selection ignored");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // ----- area selection ------------------------------------------------

    /// Pointer down: starts a drag on the current page.
    pub fn begin_area_drag(&mut self, point: Point) -> EngineResult<()> {
        self.state.ensure_can_edit()?;
        self.drag = Some(AreaDrag::begin(self.view.current_page(), point));
        Ok(())
    }

    /// Pointer move. Ignored when no drag is active.
    pub fn update_area_drag(&mut self, point: Point) {
        if let Some(drag) = self.drag.as_mut() {
            drag.update(point);
        }
    }

    pub fn area_drag(&self) -> Option<&AreaDrag> {
        self.drag.as_ref()
    }

    /// Pointer release: adds a `manual-area` entity for the drag.
    ///
    /// Cancelled (too small) drags return `Ok(None)`.
    pub fn release_area_drag(&mut self) -> EngineResult<Option<EntityId>> {
        let Some(drag) = self.drag.take() else {
            return Ok(None);
        };
        self.state.ensure_can_edit()?;

        let rect = match drag.finish(self.config.min_selection_extent) {
            Ok(rect) => rect,
            Err(e) if e.is_silent() => {
                debug!(page = drag.page(), "cancelled drag ignored");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let entity = area_entity(drag.page(), rect, &self.layout)?;
        Ok(Some(self.store.add(entity)))
    }

    // ----- search --------------------------------------------------------

    /// Replaces the transient search list with the matches for `needle`.
    ///
    /// `spans` are measured at the pages' current render sizes.
    pub fn search(&mut self, needle: &str, spans: &[TextSpan]) -> EngineResult<usize> {
        self.search = SearchResults::search(needle, spans, &self.layout)?;
        debug!(needle, matches = self.search.len(), "search updated");
        Ok(self.search.len())
    }

    pub fn search_results(&self) -> &SearchResults {
        &self.search
    }

    /// Per-match toggles on the transient list.
    pub fn search_results_mut(&mut self) -> &mut SearchResults {
        &mut self.search
    }

    pub fn clear_search(&mut self) {
        self.search = SearchResults::default();
    }

    /// Merges the selected matches into the store and clears the list.
    ///
    /// All-or-nothing: on error the store and the list are unchanged.
    pub fn apply_search(&mut self) -> EngineResult<Vec<EntityId>> {
        self.state.ensure_can_edit()?;
        let entities = self.search.to_entities(&self.layout)?;
        let ids = self.store.add_all(entities);
        info!(needle = self.search.needle(), added = ids.len(), "search matches applied");
        self.search = SearchResults::default();
        Ok(ids)
    }

    // ----- store passthrough ---------------------------------------------

    pub fn remove(&mut self, id: EntityId) -> EngineResult<RedactionEntity> {
        self.store.remove(id)
    }

    pub fn set_visible(&mut self, id: EntityId, visible: bool) -> EngineResult<()> {
        self.store.set_visible(id, visible)
    }

    pub fn set_visible_by_category(&mut self, category: &str, visible: bool) -> usize {
        self.store.set_visible_by_category(category, visible)
    }

    pub fn set_visible_by_text(&mut self, text: &str, visible: bool) -> usize {
        self.store.set_visible_by_text(text, visible)
    }

    pub fn select_all(&mut self) -> usize {
        self.store.select_all()
    }

    pub fn unselect_all(&mut self) -> usize {
        self.store.unselect_all()
    }

    pub fn entities(&self, filter: Option<&EntityFilter>) -> Vec<&RedactionEntity> {
        self.store.list(filter)
    }

    pub fn index(&self) -> VisibilityIndex {
        self.store.index()
    }

    // ----- detection -----------------------------------------------------

    /// Enters `Detecting` for the active document.
    pub fn begin_detection(&mut self) -> EngineResult<DetectionTicket> {
        let document_id = self.document.id();
        self.state.start_detection(document_id)?;
        Ok(DetectionTicket {
            document_id,
            level: self.config.detection_level,
            document: self.document.shared_bytes(),
        })
    }

    fn check_fresh(&self, received: DocumentId) -> EngineResult<()> {
        let expected = self.document.id();
        if received == expected {
            Ok(())
        } else {
            warn!(%expected, %received, "discarding response for inactive document");
            Err(EngineError::StaleResponse { expected, received })
        }
    }

    /// Merges a detector response, or discards it when the document has
    /// changed since `begin_detection`.
    ///
    /// The response is validated as a whole before anything is added.
    /// Detections on pages without geometry are stored with no render box
    /// and projected once `set_render_size` reports the page.
    pub fn complete_detection(
        &mut self,
        ticket: DetectionTicket,
        response: EngineResult<Vec<RawDetection>>,
    ) -> EngineResult<Vec<EntityId>> {
        self.check_fresh(ticket.document_id)?;
        self.state.finish_detection(ticket.document_id);

        let raw = response.map_err(|e| match e {
            EngineError::DetectorFailure { .. } => e,
            other => EngineError::detector(other.to_string()),
        })?;
        let detections = validate_detections(&raw, self.document.page_count())?;
        let entities = detections
            .into_iter()
            .map(|d| detection_entity(d, &self.layout, self.config.detector_render_padding))
            .collect::<EngineResult<Vec<_>>>()?;

        let pending = entities.iter().filter(|e| e.render_bbox.is_none()).count();
        let ids = self.store.add_all(entities);
        info!(document = %ticket.document_id, added = ids.len(), pending, "detections merged");
        Ok(ids)
    }

    /// Gives up on a detection without a response. Returns to `Idle`
    /// unless the document changed since `begin_detection`.
    pub fn abort_detection(&mut self, ticket: DetectionTicket) -> bool {
        self.release(SessionState::Detecting(ticket.document_id))
    }

    pub(crate) fn release(&mut self, busy: SessionState) -> bool {
        self.state.release(busy)
    }

    // ----- export --------------------------------------------------------

    /// Current projection of visible entities.
    pub fn projection(&self) -> Vec<DrawInstruction> {
        project(self.store.iter())
    }

    /// Enters `Exporting` and builds the request for the mutation service.
    pub fn begin_export(&mut self) -> EngineResult<ExportTicket> {
        let document_id = self.document.id();
        self.state.start_export(document_id)?;
        Ok(ExportTicket {
            request: ExportRequest {
                document_id,
                document: self.document.shared_bytes(),
                rects: self.projection(),
            },
        })
    }

    /// Gives up on an export without a response.
    pub fn abort_export(&mut self, ticket: ExportTicket) -> bool {
        self.release(SessionState::Exporting(ticket.document_id()))
    }

    /// Finishes an export. The store is never touched.
    pub fn complete_export(
        &mut self,
        ticket: ExportTicket,
        response: EngineResult<Vec<u8>>,
    ) -> EngineResult<Vec<u8>> {
        self.check_fresh(ticket.document_id())?;
        self.state.finish_export(ticket.document_id());

        let bytes = response.map_err(|e| match e {
            EngineError::MutationServiceFailure { .. } => e,
            other => EngineError::MutationServiceFailure {
                reason: other.to_string(),
            },
        })?;
        info!(document = %ticket.document_id(), rects = ticket.request.rects.len(), bytes = bytes.len(), "export complete");
        Ok(bytes)
    }
}
