//! Manual text selection.

use super::normalize_text;
use crate::domain::{NewEntity, Source};
use crate::error::{EngineError, EngineResult};
use crate::geometry::{to_document_space, BBox, DocumentLayout, Point};

/// A contiguous text-layer selection as reported by the rendering host.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSelection {
    /// Zero-based page the selection is anchored on.
    pub page: usize,
    /// Selected text, untrimmed.
    pub text: String,
    /// Bounding rectangle of the selection, in the same coordinates as
    /// `page_origin`.
    pub rect: BBox,
    /// Top-left corner of the rendered page in those coordinates. Use the
    /// zero point when `rect` is already page-relative.
    pub page_origin: Point,
}

impl TextSelection {
    /// Selection whose rectangle is already relative to the page.
    pub fn page_relative(page: usize, text: &str, rect: BBox) -> Self {
        Self {
            page,
            text: text.to_string(),
            rect,
            page_origin: Point::default(),
        }
    }
}

/// Builds a `manual-text` entity from a selection.
///
/// Fails with `EmptySelection` for blank text or an empty rectangle and
/// with `GeometryUnavailable` when the page is not laid out.
pub fn text_selection_entity(
    selection: &TextSelection,
    layout: &DocumentLayout,
) -> EngineResult<NewEntity> {
    let text = normalize_text(&selection.text);
    if text.is_empty() {
        return Err(EngineError::EmptySelection);
    }

    let render = selection.rect.relative_to(selection.page_origin);
    if !render.is_finite() || render.is_empty() {
        return Err(EngineError::EmptySelection);
    }

    let geometry = layout.geometry(selection.page)?;
    let document = to_document_space(&render, &geometry, selection.page)?;

    Ok(NewEntity {
        page: selection.page,
        render_bbox: Some(render),
        document_bbox: document,
        text,
        category: None,
        source: Source::ManualText,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{DocumentSize, RenderSize};

    fn layout() -> DocumentLayout {
        let mut layout = DocumentLayout::new(&[DocumentSize::new(612.0, 792.0)]);
        layout.set_render_size(0, RenderSize::new(600.0, 776.47)).unwrap();
        layout
    }

    #[test]
    fn test_viewport_selection_is_made_page_relative() {
        let selection = TextSelection {
            page: 0,
            text: " Invoice  42 ".to_string(),
            rect: BBox::new(120.0, 350.0, 80.0, 20.0),
            page_origin: Point::new(20.0, 300.0),
        };
        let entity = text_selection_entity(&selection, &layout()).unwrap();

        assert_eq!(entity.text, "Invoice 42");
        assert_eq!(entity.render_bbox, Some(BBox::new(100.0, 50.0, 80.0, 20.0)));
        assert!((entity.document_bbox.x - 102.0).abs() < 0.01);
        assert_eq!(entity.source, Source::ManualText);
    }

    #[test]
    fn test_blank_selection_is_empty() {
        let selection = TextSelection::page_relative(0, "   ", BBox::new(0.0, 0.0, 5.0, 5.0));
        assert!(matches!(
            text_selection_entity(&selection, &layout()),
            Err(EngineError::EmptySelection)
        ));
    }

    #[test]
    fn test_unrendered_page() {
        let layout = DocumentLayout::new(&[DocumentSize::new(612.0, 792.0)]);
        let selection = TextSelection::page_relative(0, "x", BBox::new(0.0, 0.0, 5.0, 5.0));
        assert!(text_selection_entity(&selection, &layout)
            .unwrap_err()
            .is_deferred());
    }
}
