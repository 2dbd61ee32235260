//! Render space ↔ document space conversion.
//!
//! This is the only place scale factors are applied to boxes. Adapters call
//! these functions; they never scale coordinates themselves.

use super::{BBox, PageGeometry};
use crate::error::{EngineError, EngineResult};

/// Tolerance used when comparing boxes after a round trip.
pub const EPSILON: f64 = 1e-6;

fn checked(geometry: &PageGeometry, page: usize) -> EngineResult<()> {
    if geometry.is_valid() {
        Ok(())
    } else {
        Err(EngineError::GeometryUnavailable { page })
    }
}

/// Converts a page-relative render box to document space.
///
/// The y axis flips: the render box's bottom edge becomes the document
/// box's origin, `y = documentHeight − top·inv − height·inv`. Both axes are
/// then shifted by the page box's lower-left corner.
///
/// `page` only labels the error when the geometry is degenerate.
pub fn to_document_space(
    render: &BBox,
    geometry: &PageGeometry,
    page: usize,
) -> EngineResult<BBox> {
    checked(geometry, page)?;
    let inv_x = geometry.inverse_scale_x();
    let inv_y = geometry.inverse_scale_y();
    let height = render.height * inv_y;
    Ok(BBox {
        x: geometry.document_origin_x + render.x * inv_x,
        y: geometry.document_origin_y + geometry.document_height - render.y * inv_y - height,
        width: render.width * inv_x,
        height,
    })
}

/// Converts a document box to page-relative render space.
pub fn to_render_space(
    document: &BBox,
    geometry: &PageGeometry,
    page: usize,
) -> EngineResult<BBox> {
    checked(geometry, page)?;
    let scale_x = geometry.scale_x();
    let scale_y = geometry.scale_y();
    Ok(BBox {
        x: (document.x - geometry.document_origin_x) * scale_x,
        y: (geometry.document_origin_y + geometry.document_height - document.y - document.height)
            * scale_y,
        width: document.width * scale_x,
        height: document.height * scale_y,
    })
}
