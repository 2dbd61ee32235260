//! Redaction entity store and coordinate mapping for multi-page documents.
//!
//! This library tracks every redaction mark placed on a document, converts
//! between the on-screen render space (scaled, top-left origin, y down) and
//! the document's native space (fixed units, bottom-left origin, y up), and
//! merges marks from four sources into one model that can be rendered and
//! exported.
//!
//! # Features
//!
//! - **Coordinate Transform**: one canonical render ↔ document mapping with
//!   the y-axis flip, used by every source
//! - **Entity Store**: stable ids, per-entity and bulk visibility, derived
//!   category/text index
//! - **Source Adapters**: manual text selection, drag rectangles, detector
//!   results (projected lazily once a page is laid out) and text search
//! - **Export Projection**: visible entities as document-space rectangles for
//!   a document-mutation service
//! - **Stale Response Guard**: late detector or export responses for a
//!   swapped-out document are discarded
//!
//! # Architecture
//!
//! - [`geometry`]: boxes, page geometry, the transform and the page layout
//! - [`domain`]: entities and the visibility index
//! - [`store`]: the canonical entity store
//! - [`adapters`]: the four ingestion paths
//! - [`session`]: the per-document session, busy state, view sync and the
//!   async [`Workspace`]
//! - [`export`]: the projector
//! - [`services`]: detector and mutation service seams
//! - [`error`]: error handling
//!
//! # Quick Start
//!
//! ```
//! use redactor_engine::{
//!     BBox, Document, DocumentSize, EngineConfig, RedactionSession, RenderSize, TextSelection,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let document = Document::new("letter.pdf", Vec::new(), vec![DocumentSize::new(612.0, 792.0)])?;
//! let mut session = RedactionSession::new(document, EngineConfig::default())?;
//!
//! // The host reports the page's on-screen size once it is laid out.
//! session.set_render_size(0, RenderSize::new(306.0, 396.0))?;
//!
//! let selection = TextSelection::page_relative(0, "John Doe", BBox::new(50.0, 20.0, 40.0, 6.0));
//! session.add_text_selection(&selection)?;
//!
//! let rects = session.projection();
//! assert_eq!(rects[0].bbox, BBox::new(100.0, 740.0, 80.0, 12.0));
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod config;
pub mod document;
pub mod domain;
pub mod error;
pub mod export;
pub mod geometry;
pub mod services;
pub mod session;
pub mod store;

// Re-exports for convenient access
pub use adapters::{SearchMatch, SearchResults, TextSelection, TextSpan};
pub use config::EngineConfig;
pub use document::{Document, DocumentId};
pub use domain::{EntityFilter, EntityId, RedactionEntity, Source, VisibilityIndex};
pub use error::{EngineError, EngineResult};
pub use export::{project, DrawInstruction, ExportRequest};
pub use geometry::{
    to_document_space, to_render_space, BBox, DocumentLayout, DocumentSize, PageGeometry, Point,
    RenderSize,
};
pub use services::{DetectionLevel, DetectorService, MutationService, RawDetection};
pub use session::{DetectionTicket, ExportTicket, RedactionSession, SessionState, Workspace};
pub use store::EntityStore;
