//! The redaction entity and its identity.

use crate::geometry::BBox;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable entity identifier, assigned by the store and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where an entity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    ManualText,
    ManualArea,
    Detected,
    Search,
}

impl Source {
    /// Detector entities carry the cosmetic render padding.
    pub fn pads_render_box(&self) -> bool {
        matches!(self, Self::Detected)
    }
}

/// One redaction mark.
///
/// The page and both boxes are fixed at creation. Only visibility changes
/// afterwards; correcting a box means removing the entity and adding a new
/// one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedactionEntity {
    id: EntityId,
    page: usize,
    render_bbox: Option<BBox>,
    document_bbox: BBox,
    text: String,
    category: Option<String>,
    visible: bool,
    source: Source,
}

impl RedactionEntity {
    pub(crate) fn from_new(id: EntityId, new: NewEntity) -> Self {
        Self {
            id,
            page: new.page,
            render_bbox: new.render_bbox,
            document_bbox: new.document_bbox,
            text: new.text,
            category: new.category,
            visible: true,
            source: new.source,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Zero-based page index.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Render-space box, absent until the page has been laid out.
    pub fn render_bbox(&self) -> Option<BBox> {
        self.render_bbox
    }

    pub fn document_bbox(&self) -> BBox {
        self.document_bbox
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn source(&self) -> Source {
        self.source
    }

    /// True while the render box is still waiting for page geometry.
    pub fn is_pending(&self) -> bool {
        self.render_bbox.is_none()
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn set_render_bbox(&mut self, render: Option<BBox>) {
        self.render_bbox = render;
    }
}

/// An entity as produced by an adapter, before the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntity {
    pub page: usize,
    pub render_bbox: Option<BBox>,
    pub document_bbox: BBox,
    pub text: String,
    pub category: Option<String>,
    pub source: Source,
}

/// Criteria for listing entities. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityFilter {
    pub page: Option<usize>,
    pub category: Option<String>,
    pub text: Option<String>,
    pub source: Option<Source>,
    pub visible: Option<bool>,
}

impl EntityFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn matches(&self, entity: &RedactionEntity) -> bool {
        self.page.map_or(true, |p| entity.page == p)
            && self
                .category
                .as_deref()
                .map_or(true, |c| entity.category() == Some(c))
            && self.text.as_deref().map_or(true, |t| entity.text == t)
            && self.source.map_or(true, |s| entity.source == s)
            && self.visible.map_or(true, |v| entity.visible == v)
    }
}
