//! Scene model: the ordered, authoritative list of entities.
//!
//! List order is paint order (first = bottom, last = topmost). Every
//! mutation builds a new list and swaps it in, so a [`SceneSnapshot`] taken
//! before a mutation never observes it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::element::{Entity, EntityId, EntityKind, EntityPatch, IdGenerator};
use crate::geometry::{Point, Rect, Size, MIN_SIZE};
use crate::style::{clamp_percent, Color, CropTransform};
use crate::{CoreError, CoreResult};

/// Slide background.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Background {
    /// Background color.
    pub color: Color,
    /// Opacity percent, blended over white.
    pub opacity: f32,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            opacity: 100.0,
        }
    }
}

/// Immutable view of the scene handed to renderers.
#[derive(Debug, Clone)]
pub struct SceneSnapshot {
    /// Entities in paint order.
    pub entities: Arc<Vec<Entity>>,
    /// Slide background.
    pub background: Background,
    /// Content area size in scene units.
    pub content_size: Size,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct NameCounters {
    text: u32,
    image: u32,
    shape: u32,
}

/// The scene: entities plus slide-wide attributes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    entities: Arc<Vec<Entity>>,
    background: Background,
    names: NameCounters,
    #[serde(skip)]
    ids: IdGenerator,
    #[serde(skip, default = "default_min_size")]
    min_size: f32,
}

fn default_min_size() -> f32 {
    MIN_SIZE
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            entities: Arc::default(),
            background: Background::default(),
            names: NameCounters::default(),
            ids: IdGenerator::default(),
            min_size: MIN_SIZE,
        }
    }
}

impl Scene {
    /// Create an empty scene with a white background.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `min_size` as the geometry floor instead of [`MIN_SIZE`].
    #[must_use]
    pub fn with_min_size(mut self, min_size: f32) -> Self {
        self.min_size = min_size.max(0.0);
        self
    }

    /// Smallest width and height a geometry update may set.
    #[must_use]
    pub fn min_size(&self) -> f32 {
        self.min_size
    }

    /// Allocate a fresh entity id.
    pub fn next_id(&mut self) -> EntityId {
        self.ids.next_id()
    }

    /// Allocate the next display name for a kind, e.g. `image3`.
    pub fn next_name(&mut self, kind: &EntityKind) -> String {
        let counter = match kind {
            EntityKind::Text(_) => &mut self.names.text,
            EntityKind::Image(_) => &mut self.names.image,
            EntityKind::Shape(_) => &mut self.names.shape,
        };
        *counter += 1;
        format!("{}{counter}", kind.name_prefix())
    }

    /// Append an entity on top. Returns `false` if its id is already present.
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.contains(entity.id) {
            tracing::warn!("Refusing to insert duplicate entity id {}", entity.id);
            return false;
        }
        self.ids.observe(entity.id);
        tracing::debug!("Inserted entity {} ({})", entity.id, entity.kind.name_prefix());
        self.replace_with(|list| list.push(entity));
        true
    }

    /// Remove an entity. Locked or missing entities are left alone.
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.index_of(id)?;
        if self.entities[index].locked {
            tracing::debug!("Entity {id} is locked, not removing");
            return None;
        }
        let removed = self.entities[index].clone();
        self.replace_with(|list| {
            list.remove(index);
        });
        Some(removed)
    }

    /// Apply a patch to one entity. Returns whether anything changed.
    ///
    /// Geometry patches on locked entities are ignored. Geometry is floored
    /// at the minimum size and image crops are clamped to the no-gap range.
    pub fn update(&mut self, id: EntityId, patch: EntityPatch) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let mut entity = self.entities[index].clone();

        match patch {
            EntityPatch::Geometry(geometry) => {
                if entity.locked {
                    tracing::debug!("Entity {id} is locked, ignoring geometry change");
                    return false;
                }
                let mut rect = geometry.rect;
                rect.width = rect.width.max(self.min_size);
                rect.height = rect.height.max(self.min_size);
                entity.geometry = rect;
                if let EntityKind::Image(image) = &mut entity.kind {
                    let crop = geometry.crop.unwrap_or(image.crop);
                    image.crop = crop.clamped(rect.size(), image.natural);
                }
            }
            EntityPatch::Style(style) => {
                if !entity.apply_style(style) {
                    return false;
                }
            }
            EntityPatch::Locked(locked) => entity.locked = locked,
            EntityPatch::Name(name) => entity.name = Some(name),
        }

        if entity == self.entities[index] {
            return false;
        }
        self.replace_with(|list| list[index] = entity);
        true
    }

    /// Move `id` so it paints just below `before`, or on top when `before` is `None`.
    pub fn reorder(&mut self, id: EntityId, before: Option<EntityId>) -> bool {
        if before == Some(id) {
            return false;
        }
        let Some(from) = self.index_of(id) else {
            return false;
        };
        if before.is_some_and(|b| !self.contains(b)) {
            return false;
        }

        self.replace_with(|list| {
            let entity = list.remove(from);
            let to = before
                .and_then(|b| list.iter().position(|e| e.id == b))
                .unwrap_or(list.len());
            list.insert(to, entity);
        });
        true
    }

    /// Paint `id` above everything else.
    pub fn bring_to_front(&mut self, id: EntityId) -> bool {
        self.reorder(id, None)
    }

    /// Paint `id` below everything else.
    pub fn send_to_back(&mut self, id: EntityId) -> bool {
        match self.entities.first() {
            Some(first) if first.id != id => {
                let first = first.id;
                self.reorder(id, Some(first))
            }
            _ => false,
        }
    }

    /// Deep-copy an entity with a new id, placed above its source by its
    /// height plus `gap`, and paint it on top.
    pub fn duplicate(&mut self, id: EntityId, gap: f32) -> Option<EntityId> {
        let source = self.get(id)?.clone();
        let new_id = self.next_id();
        let name = self.next_name(&source.kind);
        let mut copy = source;
        copy.id = new_id;
        copy.name = Some(name);
        copy.locked = false;
        copy.geometry.y -= copy.geometry.height + gap;
        self.insert(copy).then_some(new_id)
    }

    /// Change an image's crop transform, clamped so no gap is exposed.
    pub fn crop_image(&mut self, id: EntityId, crop: CropTransform) -> bool {
        let Some(entity) = self.get(id) else {
            return false;
        };
        if entity.image().is_none() {
            return false;
        }
        let rect = entity.geometry;
        self.update(
            id,
            EntityPatch::Geometry(crate::element::GeometryPatch {
                rect,
                crop: Some(crop),
            }),
        )
    }

    /// Get an entity by id.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Get an entity by id, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EntityNotFound`] if the id is unknown.
    pub fn require(&self, id: EntityId) -> CoreResult<&Entity> {
        self.get(id).ok_or(CoreError::EntityNotFound(id))
    }

    /// Whether an entity with this id exists.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    /// Paint-order index of an entity.
    #[must_use]
    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    /// Entities in paint order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Topmost entity containing a scene point.
    #[must_use]
    pub fn entity_at(&self, point: Point) -> Option<EntityId> {
        self.entities
            .iter()
            .rev()
            .find(|e| e.geometry.contains(point))
            .map(|e| e.id)
    }

    /// Ids of all entities whose bounds intersect `rect` (edges included).
    #[must_use]
    pub fn intersecting(&self, rect: &Rect) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.geometry.intersects(rect))
            .map(|e| e.id)
            .collect()
    }

    /// Slide background.
    #[must_use]
    pub fn background(&self) -> Background {
        self.background
    }

    /// Set the slide background; opacity is clamped to `[0, 100]`.
    pub fn set_background(&mut self, color: Color, opacity: f32) {
        self.background = Background {
            color,
            opacity: clamp_percent(opacity),
        };
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the scene has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Immutable snapshot for rendering.
    #[must_use]
    pub fn snapshot(&self, content_size: Size) -> SceneSnapshot {
        SceneSnapshot {
            entities: Arc::clone(&self.entities),
            background: self.background,
            content_size,
        }
    }

    /// Serialize the scene for layer/style panels.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> CoreResult<String> {
        serde_json::to_string(self).map_err(CoreError::Serialization)
    }

    fn replace_with(&mut self, edit: impl FnOnce(&mut Vec<Entity>)) {
        let mut next = self.entities.as_ref().clone();
        edit(&mut next);
        self.entities = Arc::new(next);
    }
}
