//! Manual area (drag rectangle) selection.

use crate::domain::{NewEntity, Source};
use crate::error::{EngineError, EngineResult};
use crate::geometry::{to_document_space, BBox, DocumentLayout, Point};

/// An in-progress pointer drag bound to one page.
///
/// Points are page-relative render coordinates. The page is fixed at
/// pointer-down; moving across a page boundary does not rebind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaDrag {
    page: usize,
    start: Point,
    current: Point,
}

impl AreaDrag {
    /// Pointer went down at `point` on `page`.
    pub fn begin(page: usize, point: Point) -> Self {
        Self {
            page,
            start: point,
            current: point,
        }
    }

    /// Pointer moved.
    pub fn update(&mut self, point: Point) {
        self.current = point;
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Current rectangle, normalized for drags going up or left.
    pub fn rect(&self) -> BBox {
        BBox::from_corners(self.start, self.current)
    }

    /// Pointer released. Returns the final rectangle, or `EmptySelection`
    /// when the drag is smaller than `min_extent` in either axis.
    pub fn finish(self, min_extent: f64) -> EngineResult<BBox> {
        let rect = self.rect();
        if !rect.is_finite() || rect.is_empty() || rect.width < min_extent || rect.height < min_extent {
            return Err(EngineError::EmptySelection);
        }
        Ok(rect)
    }
}

/// Builds a `manual-area` entity (empty text) from a finished drag.
pub fn area_entity(page: usize, rect: BBox, layout: &DocumentLayout) -> EngineResult<NewEntity> {
    if !rect.is_finite() || rect.is_empty() {
        return Err(EngineError::EmptySelection);
    }
    let geometry = layout.geometry(page)?;
    let document = to_document_space(&rect, &geometry, page)?;

    Ok(NewEntity {
        page,
        render_bbox: Some(rect),
        document_bbox: document,
        text: String::new(),
        category: None,
        source: Source::ManualArea,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{DocumentSize, RenderSize};

    #[test]
    fn test_drag_up_left_normalizes() {
        let mut drag = AreaDrag::begin(0, Point::new(200.0, 300.0));
        drag.update(Point::new(150.0, 250.0));
        assert_eq!(drag.finish(0.5).unwrap(), BBox::new(150.0, 250.0, 50.0, 50.0));
    }

    #[test]
    fn test_click_without_drag_is_cancelled() {
        let drag = AreaDrag::begin(0, Point::new(10.0, 10.0));
        assert!(matches!(drag.finish(0.5), Err(EngineError::EmptySelection)));
    }

    #[test]
    fn test_thin_drag_is_cancelled() {
        let mut drag = AreaDrag::begin(0, Point::new(10.0, 10.0));
        drag.update(Point::new(300.0, 10.2));
        assert!(drag.finish(0.5).is_err());
    }

    #[test]
    fn test_area_entity_has_no_text() {
        let mut layout = DocumentLayout::new(&[DocumentSize::new(612.0, 792.0)]);
        layout.set_render_size(0, RenderSize::new(612.0, 792.0)).unwrap();

        let entity = area_entity(0, BBox::new(0.0, 0.0, 612.0, 792.0), &layout).unwrap();
        assert_eq!(entity.text, "");
        assert_eq!(entity.source, Source::ManualArea);
        assert_eq!(entity.document_bbox, BBox::new(0.0, 0.0, 612.0, 792.0));
    }
}
