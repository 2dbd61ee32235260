//! Redaction entities and the views derived from them.
//!
//! An entity is one redaction mark on one page. Its document box is the
//! source of truth; the render box is a projection that is recomputed
//! whenever the page's render size changes.

pub mod entity;
pub mod index;

pub use entity::{EntityFilter, EntityId, NewEntity, RedactionEntity, Source};
pub use index::{CategoryGroup, TextGroup, VisibilityIndex};
