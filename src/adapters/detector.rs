//! Detector results.
//!
//! Detector findings arrive in document space with no render data. The
//! render box is filled in once the page has been laid out, with a fixed
//! cosmetic padding added to its width. The document box is never padded.

use crate::domain::{NewEntity, Source};
use crate::error::{EngineError, EngineResult};
use crate::geometry::{to_render_space, BBox, DocumentLayout};
use crate::services::RawDetection;
use tracing::debug;

/// A detector finding that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub page: usize,
    pub document_bbox: BBox,
    pub text: String,
    pub category: Option<String>,
}

fn validate(raw: &RawDetection, position: usize, page_count: usize) -> EngineResult<Detection> {
    let page = usize::try_from(raw.page)
        .ok()
        .filter(|p| *p < page_count)
        .ok_or_else(|| {
            EngineError::detector(format!(
                "item {}: page {} outside document with {} pages",
                position, raw.page, page_count
            ))
        })?;

    let bbox = raw.bbox;
    if !bbox.is_finite() || bbox.width < 0.0 || bbox.height < 0.0 {
        return Err(EngineError::detector(format!(
            "item {}: invalid bbox {:?}",
            position, bbox
        )));
    }

    let category = raw
        .category
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    Ok(Detection {
        page,
        document_bbox: bbox,
        text: raw.text.clone(),
        category,
    })
}

/// Validates a whole detector response.
///
/// One malformed item rejects the entire response with `DetectorFailure`,
/// so nothing from a bad payload reaches the store.
pub fn validate_detections(raw: &[RawDetection], page_count: usize) -> EngineResult<Vec<Detection>> {
    raw.iter()
        .enumerate()
        .map(|(position, item)| validate(item, position, page_count))
        .collect()
}

/// Builds a `detected` entity. The render box stays absent when the page
/// has no geometry yet.
pub fn detection_entity(
    detection: Detection,
    layout: &DocumentLayout,
    padding: f64,
) -> EngineResult<NewEntity> {
    let render_bbox = match layout.geometry(detection.page) {
        Ok(geometry) => Some(
            to_render_space(&detection.document_bbox, &geometry, detection.page)?.widened(padding),
        ),
        Err(EngineError::GeometryUnavailable { page }) => {
            debug!(page, "deferring render projection until page is laid out");
            None
        }
        Err(e) => return Err(e),
    };

    Ok(NewEntity {
        page: detection.page,
        render_bbox,
        document_bbox: detection.document_bbox,
        text: detection.text,
        category: detection.category,
        source: Source::Detected,
    })
}
