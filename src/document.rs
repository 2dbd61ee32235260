//! Documents opened by the host and the page sizes they carry.
//!
//! The engine never modifies document bytes. It only reads each page's
//! native size so render boxes can be mapped into document space.

use crate::error::{EngineError, EngineResult};
use crate::geometry::{BBox, DocumentSize};
use lopdf::{Dictionary, Object, ObjectId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Identity of one opened document.
///
/// Assigned fresh on every open, so two opens of the same file never
/// share an id and a response for the first cannot land in the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A document under redaction.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    name: String,
    bytes: Arc<[u8]>,
    pages: Vec<DocumentSize>,
}

impl Document {
    /// Creates a document whose page sizes the host already knows.
    pub fn new(name: &str, bytes: Vec<u8>, pages: Vec<DocumentSize>) -> EngineResult<Self> {
        if pages.is_empty() {
            return Err(EngineError::MalformedDocument {
                reason: "document has no pages".to_string(),
            });
        }
        if let Some(index) = pages
            .iter()
            .position(|p| !(p.width.is_finite() && p.height.is_finite() && p.width > 0.0 && p.height > 0.0))
        {
            return Err(EngineError::MalformedDocument {
                reason: format!("page {} has an invalid size", index),
            });
        }
        Ok(Self {
            id: DocumentId::generate(),
            name: name.to_string(),
            bytes: bytes.into(),
            pages,
        })
    }

    /// Parses a PDF and reads the size of each page.
    pub fn from_pdf_bytes(name: &str, bytes: Vec<u8>) -> EngineResult<Self> {
        let pages = read_page_sizes(&bytes)?;
        debug!(name, pages = pages.len(), "loaded document page sizes");
        Self::new(name, bytes, pages)
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Cheap handle on the bytes for handing to a service call.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn pages(&self) -> &[DocumentSize] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Reads the displayed size of every page of a PDF, in page order.
///
/// Uses the MediaBox (inherited through the page tree when absent on the
/// page) and keeps its lower-left corner as the page origin. Width and
/// height, and the origin's coordinates, are swapped for pages rotated by
/// 90 or 270 degrees.
pub fn read_page_sizes(bytes: &[u8]) -> EngineResult<Vec<DocumentSize>> {
    let doc = lopdf::Document::load_mem(bytes)?;
    let mut sizes = Vec::new();

    for (number, page_id) in doc.get_pages() {
        let media_box = inherited(&doc, page_id, b"MediaBox")?.ok_or_else(|| {
            EngineError::MalformedDocument {
                reason: format!("page {} has no MediaBox", number),
            }
        })?;
        let page_box = page_box(&doc, media_box, number)?;

        let rotation = match inherited(&doc, page_id, b"Rotate")? {
            Some(obj) => resolve(&doc, obj)?.as_i64().unwrap_or(0),
            None => 0,
        };
        let size = if rotation.rem_euclid(180) == 90 {
            DocumentSize::new(page_box.height, page_box.width).with_origin(page_box.y, page_box.x)
        } else {
            DocumentSize::new(page_box.width, page_box.height).with_origin(page_box.x, page_box.y)
        };
        sizes.push(size);
    }

    if sizes.is_empty() {
        return Err(EngineError::MalformedDocument {
            reason: "document has no pages".to_string(),
        });
    }
    Ok(sizes)
}

fn resolve<'a>(doc: &'a lopdf::Document, obj: &'a Object) -> EngineResult<&'a Object> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

fn page_dict(doc: &lopdf::Document, id: ObjectId) -> EngineResult<&Dictionary> {
    Ok(doc.get_object(id)?.as_dict()?)
}

/// Looks up `key` on the page, then on each ancestor in the page tree.
fn inherited<'a>(
    doc: &'a lopdf::Document,
    page_id: ObjectId,
    key: &[u8],
) -> EngineResult<Option<&'a Object>> {
    let mut current = page_id;
    // Bounded walk guards against cyclic /Parent chains.
    for _ in 0..64 {
        let dict = page_dict(doc, current)?;
        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }
        match dict.get(b"Parent") {
            Ok(parent) => current = parent.as_reference()?,
            Err(_) => return Ok(None),
        }
    }
    Err(EngineError::MalformedDocument {
        reason: "page tree too deep or cyclic".to_string(),
    })
}

/// Normalized page box: lower-left corner plus size.
fn page_box(doc: &lopdf::Document, obj: &Object, page: u32) -> EngineResult<BBox> {
    let values = resolve(doc, obj)?
        .as_array()?
        .iter()
        .map(|v| resolve(doc, v).and_then(|v| Ok(v.as_float()? as f64)))
        .collect::<EngineResult<Vec<f64>>>()?;

    match values.as_slice() {
        [x1, y1, x2, y2] => {
            let width = (x2 - x1).abs();
            let height = (y2 - y1).abs();
            if width > 0.0 && height > 0.0 {
                Ok(BBox::new(x1.min(*x2), y1.min(*y2), width, height))
            } else {
                Err(EngineError::MalformedDocument {
                    reason: format!("page {} has an empty MediaBox", page),
                })
            }
        }
        _ => Err(EngineError::MalformedDocument {
            reason: format!("page {} MediaBox must have four numbers", page),
        }),
    }
}
