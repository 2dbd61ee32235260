//! Text search over the rendered text layer.
//!
//! Matches are provisional. They live in a [`SearchResults`] list outside
//! the store, each one toggled on or off by the user, and only become
//! entities when the list is applied.

use crate::domain::{NewEntity, Source};
use crate::error::{EngineError, EngineResult};
use crate::geometry::{to_document_space, to_render_space, BBox, DocumentLayout, PageGeometry};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// One rendered text run with its page-relative render box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub page: usize,
    pub text: String,
    pub bbox: BBox,
}

impl TextSpan {
    pub fn new(page: usize, text: &str, bbox: BBox) -> Self {
        Self {
            page,
            text: text.to_string(),
            bbox,
        }
    }
}

/// A provisional match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchMatch {
    pub page: usize,
    /// Matched text with the span's original casing.
    pub text: String,
    /// Estimated render box of the match at the page's latest render size.
    pub bbox: BBox,
    /// Document box, fixed from the geometry the match was measured under.
    /// `None` until the page reports a render size.
    pub document_bbox: Option<BBox>,
    pub selected: bool,
}

/// Transient, independently toggleable list of matches for one needle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults {
    needle: String,
    matches: Vec<SearchMatch>,
}

fn needle_pattern(needle: &str) -> EngineResult<Regex> {
    RegexBuilder::new(&regex::escape(needle))
        .case_insensitive(true)
        .build()
        .map_err(|e| EngineError::invalid("needle", e.to_string()))
}

/// Finds every case-insensitive occurrence of the pattern in one span.
///
/// The span's width is spread evenly over its characters to place each
/// match horizontally.
fn matches_in_span(pattern: &Regex, span: &TextSpan) -> Vec<SearchMatch> {
    let char_count = span.text.chars().count();
    if char_count == 0 || !span.bbox.is_finite() {
        return Vec::new();
    }
    let char_width = span.bbox.width / char_count as f64;

    pattern
        .find_iter(&span.text)
        .map(|m| {
            let start = span.text[..m.start()].chars().count();
            let len = m.as_str().chars().count();
            SearchMatch {
                page: span.page,
                text: m.as_str().to_string(),
                bbox: BBox::new(
                    span.bbox.x + start as f64 * char_width,
                    span.bbox.y,
                    len as f64 * char_width,
                    span.bbox.height,
                ),
                document_bbox: None,
                selected: true,
            }
        })
        .collect()
}

impl SearchResults {
    /// Searches `spans` for `needle`. Every match starts selected.
    ///
    /// Matches are ordered by page, keeping the host's span order within a
    /// page. Each match is mapped to document space with the layout's
    /// current geometry, so later zooms do not move it. A blank needle
    /// yields an empty list.
    pub fn search(needle: &str, spans: &[TextSpan], layout: &DocumentLayout) -> EngineResult<Self> {
        let needle = needle.trim();
        if needle.is_empty() {
            return Ok(Self::default());
        }
        let pattern = needle_pattern(needle)?;

        let mut matches: Vec<SearchMatch> = spans
            .iter()
            .flat_map(|span| matches_in_span(&pattern, span))
            .collect();
        matches.sort_by_key(|m| m.page);

        for m in matches.iter_mut() {
            match layout.geometry(m.page) {
                Ok(geometry) => m.document_bbox = Some(to_document_space(&m.bbox, &geometry, m.page)?),
                Err(e) if e.is_deferred() => {}
                Err(e) => return Err(e),
            }
        }

        Ok(Self {
            needle: needle.to_string(),
            matches,
        })
    }

    /// Follows a page's new render size.
    ///
    /// Anchored matches get a fresh render box. Matches found before the
    /// page had geometry are anchored with this one.
    pub fn reproject_page(&mut self, page: usize, geometry: &PageGeometry) -> EngineResult<()> {
        for m in self.matches.iter_mut().filter(|m| m.page == page) {
            match m.document_bbox {
                Some(document) => m.bbox = to_render_space(&document, geometry, page)?,
                None => m.document_bbox = Some(to_document_space(&m.bbox, geometry, page)?),
            }
        }
        Ok(())
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    fn get_mut(&mut self, index: usize) -> EngineResult<&mut SearchMatch> {
        let len = self.matches.len();
        self.matches.get_mut(index).ok_or_else(|| {
            EngineError::invalid("index", format!("no match {} (have {})", index, len))
        })
    }

    /// Flips one match and returns its new state.
    pub fn toggle(&mut self, index: usize) -> EngineResult<bool> {
        let m = self.get_mut(index)?;
        m.selected = !m.selected;
        Ok(m.selected)
    }

    pub fn set_selected(&mut self, index: usize, selected: bool) -> EngineResult<()> {
        self.get_mut(index)?.selected = selected;
        Ok(())
    }

    pub fn select_all(&mut self) {
        self.matches.iter_mut().for_each(|m| m.selected = true);
    }

    pub fn deselect_all(&mut self) {
        self.matches.iter_mut().for_each(|m| m.selected = false);
    }

    pub fn selected_count(&self) -> usize {
        self.matches.iter().filter(|m| m.selected).count()
    }

    /// True when every match is selected ("apply all" vs "apply selected").
    pub fn all_selected(&self) -> bool {
        self.matches.iter().all(|m| m.selected)
    }

    /// Converts the selected matches into `search` entities.
    ///
    /// Fails as a whole with `GeometryUnavailable` if any selected match was
    /// never anchored to document space. Render boxes are projected at the
    /// layout's current scale, or left empty for pages without geometry.
    pub fn to_entities(&self, layout: &DocumentLayout) -> EngineResult<Vec<NewEntity>> {
        self.matches
            .iter()
            .filter(|m| m.selected)
            .map(|m| -> EngineResult<NewEntity> {
                let document_bbox = m
                    .document_bbox
                    .ok_or(EngineError::GeometryUnavailable { page: m.page })?;
                let render_bbox = match layout.geometry(m.page) {
                    Ok(geometry) => Some(to_render_space(&document_bbox, &geometry, m.page)?),
                    Err(e) if e.is_deferred() => None,
                    Err(e) => return Err(e),
                };
                Ok(NewEntity {
                    page: m.page,
                    render_bbox,
                    document_bbox,
                    text: m.text.clone(),
                    category: None,
                    source: Source::Search,
                })
            })
            .collect()
    }
}
