//! Canonical entity store for the active document.
//!
//! All mutations take `&mut self`, so the host's event loop serializes them
//! and a bulk toggle is never observed half-applied.

use crate::domain::{EntityFilter, EntityId, NewEntity, RedactionEntity, VisibilityIndex};
use crate::error::{EngineError, EngineResult};
use crate::geometry::{to_render_space, PageGeometry};
use std::collections::BTreeMap;
use tracing::debug;

/// Map of entity id to entity, ordered by id.
#[derive(Debug, Default)]
pub struct EntityStore {
    entities: BTreeMap<EntityId, RedactionEntity>,
    next_id: u64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entity and returns its freshly assigned id.
    pub fn add(&mut self, entity: NewEntity) -> EntityId {
        self.next_id += 1;
        let id = EntityId::new(self.next_id);
        debug!(%id, page = entity.page, source = ?entity.source, "entity added");
        self.entities
            .insert(id, RedactionEntity::from_new(id, entity));
        id
    }

    /// Inserts every entity or none.
    ///
    /// Validation happens before this call, so insertion itself cannot fail
    /// halfway.
    pub fn add_all(&mut self, entities: Vec<NewEntity>) -> Vec<EntityId> {
        entities.into_iter().map(|e| self.add(e)).collect()
    }

    /// Removes an entity by id.
    pub fn remove(&mut self, id: EntityId) -> EngineResult<RedactionEntity> {
        let removed = self
            .entities
            .remove(&id)
            .ok_or(EngineError::UnknownEntity { id })?;
        debug!(%id, "entity removed");
        Ok(removed)
    }

    pub fn get(&self, id: EntityId) -> Option<&RedactionEntity> {
        self.entities.get(&id)
    }

    pub fn set_visible(&mut self, id: EntityId, visible: bool) -> EngineResult<()> {
        let entity = self
            .entities
            .get_mut(&id)
            .ok_or(EngineError::UnknownEntity { id })?;
        entity.set_visible(visible);
        Ok(())
    }

    /// Sets visibility of every entity in a category. Returns how many
    /// entities the category holds.
    pub fn set_visible_by_category(&mut self, category: &str, visible: bool) -> usize {
        self.set_visible_where(&EntityFilter::new().category(category), visible)
    }

    /// Sets visibility of every entity with exactly this text.
    pub fn set_visible_by_text(&mut self, text: &str, visible: bool) -> usize {
        self.set_visible_where(&EntityFilter::new().text(text), visible)
    }

    /// Shows every entity regardless of category.
    pub fn select_all(&mut self) -> usize {
        self.set_visible_where(&EntityFilter::new(), true)
    }

    /// Hides every entity regardless of category.
    pub fn unselect_all(&mut self) -> usize {
        self.set_visible_where(&EntityFilter::new(), false)
    }

    fn set_visible_where(&mut self, filter: &EntityFilter, visible: bool) -> usize {
        let mut touched = 0;
        for entity in self.entities.values_mut().filter(|e| filter.matches(e)) {
            entity.set_visible(visible);
            touched += 1;
        }
        debug!(?filter, visible, touched, "bulk visibility change");
        touched
    }

    /// Entities matching `filter`, in id order.
    pub fn list(&self, filter: Option<&EntityFilter>) -> Vec<&RedactionEntity> {
        self.entities
            .values()
            .filter(|e| filter.map_or(true, |f| f.matches(e)))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RedactionEntity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Fresh category/text index over the current entities.
    pub fn index(&self) -> VisibilityIndex {
        VisibilityIndex::build(self.entities.values())
    }

    /// Recomputes the render box of every entity on `page` from its
    /// document box. Detector entities get `padding` added to the width.
    pub fn reproject_page(
        &mut self,
        page: usize,
        geometry: &PageGeometry,
        padding: f64,
    ) -> EngineResult<usize> {
        let mut projected = Vec::new();
        for entity in self.entities.values().filter(|e| e.page() == page) {
            let mut render = to_render_space(&entity.document_bbox(), geometry, page)?;
            if entity.source().pads_render_box() {
                render = render.widened(padding);
            }
            projected.push((entity.id(), render));
        }

        let count = projected.len();
        for (id, render) in projected {
            if let Some(entity) = self.entities.get_mut(&id) {
                entity.set_render_bbox(Some(render));
            }
        }
        Ok(count)
    }

    /// Drops the render box of every entity on `page`.
    pub fn unproject_page(&mut self, page: usize) {
        for entity in self.entities.values_mut().filter(|e| e.page() == page) {
            entity.set_render_bbox(None);
        }
    }

    /// Clears all entities. Ids keep increasing across resets.
    pub fn reset(&mut self) {
        debug!(cleared = self.entities.len(), "store reset");
        self.entities.clear();
    }
}
