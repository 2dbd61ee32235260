//! Per-page geometry registry for the active document.

use super::{DocumentSize, PageGeometry, RenderSize};
use crate::error::{EngineError, EngineResult};

#[derive(Debug, Clone)]
struct PageSlot {
    document: DocumentSize,
    render: Option<RenderSize>,
}

/// Tracks the fixed document size of every page and the live render size
/// of the pages the host has laid out.
#[derive(Debug, Clone, Default)]
pub struct DocumentLayout {
    pages: Vec<PageSlot>,
}

impl DocumentLayout {
    /// Creates a layout with no render sizes known yet.
    pub fn new(pages: &[DocumentSize]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|document| PageSlot {
                    document: *document,
                    render: None,
                })
                .collect(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn slot(&self, page: usize) -> EngineResult<&PageSlot> {
        self.pages.get(page).ok_or(EngineError::PageOutOfRange {
            page,
            page_count: self.pages.len(),
        })
    }

    /// Fixed document size of a page.
    pub fn document_size(&self, page: usize) -> EngineResult<DocumentSize> {
        Ok(self.slot(page)?.document)
    }

    /// Records the page's current render size.
    ///
    /// A non-finite or non-positive size is stored as unknown.
    pub fn set_render_size(&mut self, page: usize, size: RenderSize) -> EngineResult<()> {
        let page_count = self.pages.len();
        let slot = self
            .pages
            .get_mut(page)
            .ok_or(EngineError::PageOutOfRange { page, page_count })?;
        let usable = size.width.is_finite()
            && size.height.is_finite()
            && size.width > 0.0
            && size.height > 0.0;
        slot.render = usable.then_some(size);
        Ok(())
    }

    /// Forgets the render size, e.g. when the page is unmounted.
    pub fn clear_render_size(&mut self, page: usize) -> EngineResult<()> {
        let page_count = self.pages.len();
        let slot = self
            .pages
            .get_mut(page)
            .ok_or(EngineError::PageOutOfRange { page, page_count })?;
        slot.render = None;
        Ok(())
    }

    /// Complete geometry for a page, or `GeometryUnavailable` when the page
    /// has no usable render size.
    pub fn geometry(&self, page: usize) -> EngineResult<PageGeometry> {
        let slot = self.slot(page)?;
        let render = slot
            .render
            .ok_or(EngineError::GeometryUnavailable { page })?;
        let geometry = PageGeometry::new(slot.document, render);
        if geometry.is_valid() {
            Ok(geometry)
        } else {
            Err(EngineError::GeometryUnavailable { page })
        }
    }

    /// True when `geometry(page)` would succeed.
    pub fn has_geometry(&self, page: usize) -> bool {
        self.geometry(page).is_ok()
    }

    /// Render size that fits the page into `width`, keeping its aspect ratio.
    pub fn fit_width(&self, page: usize, width: f64) -> EngineResult<RenderSize> {
        let document = self.document_size(page)?;
        if !width.is_finite() || width <= 0.0 || document.width <= 0.0 {
            return Err(EngineError::invalid("width", "must be positive"));
        }
        Ok(RenderSize::new(
            width,
            width * document.height / document.width,
        ))
    }
}
