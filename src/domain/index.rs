//! Category and text grouping for bulk show/hide controls.
//!
//! The index is a snapshot built from the store on request. It holds no
//! state of its own, so it cannot drift from the entities it describes.

use super::RedactionEntity;
use serde::Serialize;

/// Entities sharing one text within a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextGroup {
    pub text: String,
    pub count: usize,
    pub all_visible: bool,
}

/// Entities sharing one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub count: usize,
    pub visible_count: usize,
    pub texts: Vec<TextGroup>,
}

impl CategoryGroup {
    /// True iff every entity in the category is visible.
    pub fn is_fully_visible(&self) -> bool {
        self.visible_count == self.count
    }
}

/// Derived view over the store, grouped by category then by distinct text.
///
/// Categories and texts appear in the order their first entity was created.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VisibilityIndex {
    pub categories: Vec<CategoryGroup>,
    pub uncategorized: usize,
    pub total: usize,
    pub visible: usize,
}

impl VisibilityIndex {
    /// Builds the index from entities in id order.
    pub fn build<'a>(entities: impl IntoIterator<Item = &'a RedactionEntity>) -> Self {
        let mut index = Self::default();

        for entity in entities {
            index.total += 1;
            if entity.is_visible() {
                index.visible += 1;
            }

            let Some(category) = entity.category() else {
                index.uncategorized += 1;
                continue;
            };

            let pos = match index.categories.iter().position(|g| g.category == category) {
                Some(pos) => pos,
                None => {
                    index.categories.push(CategoryGroup {
                        category: category.to_string(),
                        count: 0,
                        visible_count: 0,
                        texts: Vec::new(),
                    });
                    index.categories.len() - 1
                }
            };
            let group = &mut index.categories[pos];
            group.count += 1;
            if entity.is_visible() {
                group.visible_count += 1;
            }

            match group.texts.iter_mut().find(|t| t.text == entity.text()) {
                Some(text) => {
                    text.count += 1;
                    text.all_visible &= entity.is_visible();
                }
                None => group.texts.push(TextGroup {
                    text: entity.text().to_string(),
                    count: 1,
                    all_visible: entity.is_visible(),
                }),
            }
        }

        index
    }

    pub fn category(&self, name: &str) -> Option<&CategoryGroup> {
        self.categories.iter().find(|g| g.category == name)
    }

    /// True iff the category exists and every entity in it is visible.
    pub fn is_category_fully_visible(&self, name: &str) -> bool {
        self.category(name).map_or(false, CategoryGroup::is_fully_visible)
    }

    /// True when every entity is visible ("select all" has nothing to do).
    pub fn all_visible(&self) -> bool {
        self.visible == self.total
    }

    /// True when at least one entity is visible.
    pub fn any_visible(&self) -> bool {
        self.visible > 0
    }
}
