//! Custom assertions for geometry and store tests.
//!
//! Floating-point boxes rarely compare exactly after a round trip through
//! the transform, so most checks here take a tolerance.

use redactor_engine::{BBox, EntityStore, RedactionSession};

/// Asserts that two boxes agree on every field within `tolerance`.
///
/// # Panics
/// Panics with both boxes printed when any field differs by more.
pub fn assert_bbox_approx(actual: BBox, expected: BBox, tolerance: f64) {
    assert!(
        actual.approx_eq(&expected, tolerance),
        "boxes differ by more than {}:\n  actual:   {:?}\n  expected: {:?}",
        tolerance,
        actual,
        expected
    );
}

/// Asserts that the store holds exactly `count` entities, `visible` of them
/// visible.
pub fn assert_store_counts(store: &EntityStore, count: usize, visible: usize) {
    let index = store.index();
    assert_eq!(store.len(), count, "unexpected entity count");
    assert_eq!(index.visible, visible, "unexpected visible count");
}

/// Asserts that the session's store has no entities.
pub fn assert_store_empty(session: &RedactionSession) {
    assert!(
        session.store().is_empty(),
        "store should be empty but holds {} entities",
        session.store().len()
    );
}
