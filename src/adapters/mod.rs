//! Source adapters: the four ways a redaction mark enters the store.
//!
//! Each adapter turns one raw observation into a [`NewEntity`] through the
//! coordinate transform. Adapters never touch the store themselves; the
//! session inserts what they produce, so a failed adapter call cannot leave
//! a partial change behind.
//!
//! [`NewEntity`]: crate::domain::NewEntity

pub mod area;
pub mod detector;
pub mod search;
pub mod text;

pub use area::{area_entity, AreaDrag};
pub use detector::{detection_entity, validate_detections, Detection};
pub use search::{SearchMatch, SearchResults, TextSpan};
pub use text::{text_selection_entity, TextSelection};

use once_cell::sync::Lazy;
use regex::Regex;

/// Trims text and collapses internal whitespace runs to one space.
pub(crate) fn normalize_text(text: &str) -> String {
    static WHITESPACE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\s+").expect("Valid regex pattern"));
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}
