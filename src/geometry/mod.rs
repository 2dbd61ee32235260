//! Page geometry and the two coordinate spaces.
//!
//! Render space is the on-screen page: origin top-left, y grows downward,
//! scale follows zoom and viewport width. Document space is the native
//! page: fixed units, origin bottom-left, y grows upward.

pub mod layout;
pub mod transform;

pub use layout::DocumentLayout;
pub use transform::{to_document_space, to_render_space, EPSILON};

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle. Interpreted in render or document space
/// depending on where it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds the rectangle spanned by two corner points, in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// True when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// True when the box has no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Shifts the box by `-origin`, turning viewport coordinates into
    /// coordinates relative to a page whose top-left corner is `origin`.
    pub fn relative_to(&self, origin: Point) -> Self {
        Self {
            x: self.x - origin.x,
            y: self.y - origin.y,
            ..*self
        }
    }

    /// Returns a copy with `extra` added to the width.
    pub fn widened(&self, extra: f64) -> Self {
        Self {
            width: self.width + extra,
            ..*self
        }
    }

    /// Component-wise comparison within `epsilon`.
    pub fn approx_eq(&self, other: &BBox, epsilon: f64) -> bool {
        (self.x - other.x).abs() <= epsilon
            && (self.y - other.y).abs() <= epsilon
            && (self.width - other.width).abs() <= epsilon
            && (self.height - other.height).abs() <= epsilon
    }
}

/// A point in render space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Native page size, fixed for the lifetime of a document.
///
/// `origin_x`/`origin_y` are the lower-left corner of the page box. Most
/// pages start at (0, 0); some MediaBoxes do not.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentSize {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub origin_x: f64,
    #[serde(default)]
    pub origin_y: f64,
}

impl DocumentSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }

    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin_x = x;
        self.origin_y = y;
        self
    }
}

/// Live on-screen page size; changes on resize and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSize {
    pub width: f64,
    pub height: f64,
}

impl RenderSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Complete geometry of one page: both sizes known.
///
/// Scale factors are derived on demand and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub document_width: f64,
    pub document_height: f64,
    pub document_origin_x: f64,
    pub document_origin_y: f64,
    pub render_width: f64,
    pub render_height: f64,
}

impl PageGeometry {
    pub fn new(document: DocumentSize, render: RenderSize) -> Self {
        Self {
            document_width: document.width,
            document_height: document.height,
            document_origin_x: document.origin_x,
            document_origin_y: document.origin_y,
            render_width: render.width,
            render_height: render.height,
        }
    }

    /// True when all four dimensions are finite and positive and the
    /// origin is finite.
    pub fn is_valid(&self) -> bool {
        [
            self.document_width,
            self.document_height,
            self.render_width,
            self.render_height,
        ]
        .iter()
        .all(|v| v.is_finite() && *v > 0.0)
            && self.document_origin_x.is_finite()
            && self.document_origin_y.is_finite()
    }

    /// Render units per document unit, horizontally.
    pub fn scale_x(&self) -> f64 {
        self.render_width / self.document_width
    }

    /// Render units per document unit, vertically.
    pub fn scale_y(&self) -> f64 {
        self.render_height / self.document_height
    }

    /// Document units per render unit, horizontally.
    pub fn inverse_scale_x(&self) -> f64 {
        self.document_width / self.render_width
    }

    /// Document units per render unit, vertically.
    pub fn inverse_scale_y(&self) -> f64 {
        self.document_height / self.render_height
    }
}
