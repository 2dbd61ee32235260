//! Projection of visible entities into document-space draw instructions.
//!
//! Export reuses the stored document boxes verbatim. Nothing is
//! re-transformed here, so the output is exactly what the adapters
//! computed at creation time.

use crate::document::DocumentId;
use crate::domain::RedactionEntity;
use crate::geometry::BBox;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One rectangle to burn into one page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawInstruction {
    pub page: usize,
    pub bbox: BBox,
}

/// Request handed to the document-mutation service.
#[derive(Debug, Clone, Serialize)]
pub struct ExportRequest {
    pub document_id: DocumentId,
    #[serde(skip)]
    pub document: Arc<[u8]>,
    pub rects: Vec<DrawInstruction>,
}

/// Keeps visible entities and returns their document boxes, preserving
/// input order.
pub fn project<'a>(entities: impl IntoIterator<Item = &'a RedactionEntity>) -> Vec<DrawInstruction> {
    entities
        .into_iter()
        .filter(|e| e.is_visible())
        .map(|e| DrawInstruction {
            page: e.page(),
            bbox: e.document_bbox(),
        })
        .collect()
}
