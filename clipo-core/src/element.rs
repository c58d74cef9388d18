//! Entities - the placed objects of a slide.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Size};
use crate::style::{
    Border, CropTransform, FilterStack, ShapeStyle, StylePatch, TextStyle,
};

/// Unique identifier for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Wrap a raw id.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic, time-derived id source.
///
/// Ids are wall-clock milliseconds, bumped past the previous id when two
/// entities are created within the same millisecond.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    /// Create a generator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unique id.
    pub fn next_id(&mut self) -> EntityId {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        self.last = now.max(self.last + 1);
        EntityId(self.last)
    }

    /// Make sure future ids are greater than `id`.
    pub fn observe(&mut self, id: EntityId) {
        self.last = self.last.max(id.0);
    }
}

/// Image content and presentation attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageData {
    /// Encoded image bytes (PNG, JPEG, ...). Shared between duplicates.
    pub source: Arc<Vec<u8>>,
    /// Natural pixel size of the decoded image.
    pub natural: Size,
    /// Position and scale of the content inside the container.
    pub crop: CropTransform,
    /// Border.
    pub border: Border,
    /// Corner radius percent.
    pub corner_radius: f32,
    /// Opacity percent.
    pub opacity: f32,
    /// Filter stack.
    pub filters: FilterStack,
}

impl ImageData {
    /// Image data with default presentation.
    #[must_use]
    pub fn new(source: Vec<u8>, natural: Size, scale: f32) -> Self {
        Self {
            source: Arc::new(source),
            natural,
            crop: CropTransform {
                scale,
                offset_x: 0.0,
                offset_y: 0.0,
            },
            border: Border::NONE,
            corner_radius: 0.0,
            opacity: 100.0,
            filters: FilterStack::default(),
        }
    }
}

/// The content of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum EntityKind {
    /// A text box.
    Text(TextStyle),
    /// A raster image.
    Image(ImageData),
    /// A vector shape.
    Shape(ShapeStyle),
}

impl EntityKind {
    /// Prefix used for auto-generated names.
    #[must_use]
    pub fn name_prefix(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Shape(_) => "shape",
        }
    }

    /// Whether side resize handles are offered (images and shapes only).
    #[must_use]
    pub fn has_side_handles(&self) -> bool {
        !matches!(self, Self::Text(_))
    }
}

/// A placed entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier.
    pub id: EntityId,
    /// Display label, e.g. `text1`.
    pub name: Option<String>,
    /// Position and size in scene units.
    pub geometry: Rect,
    /// Locked entities cannot be moved, resized or deleted.
    pub locked: bool,
    /// Content and style.
    pub kind: EntityKind,
}

impl Entity {
    /// Create an unlocked, unnamed entity.
    #[must_use]
    pub fn new(id: EntityId, kind: EntityKind, geometry: Rect) -> Self {
        Self {
            id,
            name: None,
            geometry,
            locked: false,
            kind,
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the locked flag.
    #[must_use]
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Image data, if this is an image.
    #[must_use]
    pub fn image(&self) -> Option<&ImageData> {
        match &self.kind {
            EntityKind::Image(image) => Some(image),
            _ => None,
        }
    }

    /// Apply a style edit. Returns `false` when the edit does not apply to this kind.
    pub fn apply_style(&mut self, patch: StylePatch) -> bool {
        match (&mut self.kind, patch.clamped()) {
            (EntityKind::Text(t), StylePatch::Content(v)) => t.content = v,
            (EntityKind::Text(t), StylePatch::FontFamily(v)) => t.font_family = v,
            (EntityKind::Text(t), StylePatch::FontSize(v)) => t.font_size = v,
            (EntityKind::Text(t), StylePatch::FontWeight(v)) => t.font_weight = v,
            (EntityKind::Text(t), StylePatch::FontStyle(v)) => t.font_style = v,
            (EntityKind::Text(t), StylePatch::TextColor(v)) => t.color = v,
            (EntityKind::Text(t), StylePatch::TextAlign(v)) => t.align = v,
            (EntityKind::Text(t), StylePatch::Background(v)) => t.background = v,
            (EntityKind::Text(t), StylePatch::Border(v)) => t.border = v,
            (EntityKind::Text(t), StylePatch::CornerRadius(v)) => t.corner_radius = v,
            (EntityKind::Image(i), StylePatch::Border(v)) => i.border = v,
            (EntityKind::Image(i), StylePatch::CornerRadius(v)) => i.corner_radius = v,
            (EntityKind::Image(i), StylePatch::Opacity(v)) => i.opacity = v,
            (EntityKind::Image(i), StylePatch::Filters(v)) => i.filters = v,
            (EntityKind::Shape(s), StylePatch::Fill(v)) => s.fill = v,
            (EntityKind::Shape(s), StylePatch::Border(v)) => s.border = v,
            (EntityKind::Shape(s), StylePatch::CornerRadius(v)) => s.corner_radius = v,
            (EntityKind::Shape(s), StylePatch::ShapeKind(v)) => s.shape_kind = v,
            (kind, patch) => {
                tracing::debug!("Ignoring {patch:?} on {} entity", kind.name_prefix());
                return false;
            }
        }
        true
    }
}

/// Geometry change produced by move/resize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeometryPatch {
    /// New rectangle.
    pub rect: Rect,
    /// New crop transform (images only).
    pub crop: Option<CropTransform>,
}

/// A single-entity update accepted by [`Scene::update`](crate::Scene::update).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "snake_case")]
pub enum EntityPatch {
    /// Move/resize. Ignored on locked entities.
    Geometry(GeometryPatch),
    /// Style edit. Allowed on locked entities.
    Style(StylePatch),
    /// Lock or unlock.
    Locked(bool),
    /// Rename.
    Name(String),
}
