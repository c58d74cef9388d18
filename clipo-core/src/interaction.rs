//! Pointer interaction state machine.
//!
//! At most one action is in flight at a time. Every action begins on
//! pointer-down and unconditionally ends on pointer-up or pointer-leave,
//! wherever the pointer is at that moment.

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::element::{EntityId, EntityPatch, GeometryPatch};
use crate::event::Modifiers;
use crate::geometry::{resize_image, resize_rect, Handle, Point, Rect};
use crate::guides::GuideLines;
use crate::scene::Scene;
use crate::style::CropTransform;
use crate::viewport::Viewport;

/// Current selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "ids", rename_all = "lowercase")]
pub enum Selection {
    /// Nothing selected.
    #[default]
    None,
    /// One entity, with handles shown.
    Single(EntityId),
    /// Several entities from a marquee.
    Multiple(Vec<EntityId>),
}

impl Selection {
    /// Build a multi-selection; empty becomes [`Selection::None`].
    #[must_use]
    pub fn from_ids(ids: Vec<EntityId>) -> Self {
        if ids.is_empty() {
            Self::None
        } else {
            Self::Multiple(ids)
        }
    }

    /// Selected ids in paint order of selection.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        match self {
            Self::None => Vec::new(),
            Self::Single(id) => vec![*id],
            Self::Multiple(ids) => ids.clone(),
        }
    }

    /// The sole selected id.
    #[must_use]
    pub fn single(&self) -> Option<EntityId> {
        match self {
            Self::Single(id) => Some(*id),
            _ => None,
        }
    }

    /// Whether `id` is selected.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        match self {
            Self::None => false,
            Self::Single(s) => *s == id,
            Self::Multiple(ids) => ids.contains(&id),
        }
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Collapse a one-element multi-selection into a single selection.
    #[must_use]
    pub fn normalized(self) -> Self {
        match self {
            Self::Multiple(ids) if ids.len() == 1 => Self::Single(ids[0]),
            Self::Multiple(ids) if ids.is_empty() => Self::None,
            other => other,
        }
    }
}

/// The in-flight pointer action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Interaction {
    /// No action.
    #[default]
    Idle,
    /// Dragging an entity body.
    Moving {
        /// Entity being moved.
        entity: EntityId,
        /// Pointer position at pointer-down, screen space.
        start_pointer: Point,
        /// Entity geometry at pointer-down.
        start_geometry: Rect,
    },
    /// Dragging a resize handle.
    Resizing {
        /// Entity being resized.
        entity: EntityId,
        /// Handle being dragged.
        handle: Handle,
        /// Pointer position at pointer-down, screen space.
        start_pointer: Point,
        /// Entity geometry at pointer-down.
        start_geometry: Rect,
        /// Image crop at pointer-down.
        start_crop: Option<CropTransform>,
    },
    /// Drawing a selection rectangle.
    MarqueeSelecting {
        /// Pointer-down position, screen space.
        start: Point,
        /// Latest pointer position, screen space.
        current: Point,
    },
}

impl Interaction {
    /// Whether no action is in flight.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// What lies under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// A resize handle of the selected entity.
    Handle(EntityId, Handle),
    /// An entity body.
    Entity(EntityId),
    /// Empty canvas.
    Canvas,
}

/// Mutable editor pieces the controller acts on for one event.
#[derive(Debug)]
pub struct InteractionContext<'a> {
    /// The scene.
    pub scene: &'a mut Scene,
    /// The selection.
    pub selection: &'a mut Selection,
    /// Zoom and content-area offset.
    pub viewport: &'a Viewport,
    /// Editor constants.
    pub config: &'a EditorConfig,
    /// Text entity currently being edited, if any.
    pub editing_text: Option<EntityId>,
}

/// Owns the interaction state and applies pointer transitions.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    state: Interaction,
    guides: GuideLines,
}

impl InteractionController {
    /// Create an idle controller.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> Interaction {
        self.state
    }

    /// Alignment guides from the latest move.
    #[must_use]
    pub fn guides(&self) -> &GuideLines {
        &self.guides
    }

    /// Screen-space marquee rectangle while selecting.
    #[must_use]
    pub fn marquee_rect(&self) -> Option<Rect> {
        match self.state {
            Interaction::MarqueeSelecting { start, current } => {
                Some(Rect::from_points(start, current))
            }
            _ => None,
        }
    }

    /// Find what is under a screen point.
    ///
    /// Handles of the single selected, unlocked entity win over bodies;
    /// bodies are tested topmost first.
    #[must_use]
    pub fn hit_test(ctx: &InteractionContext<'_>, screen: Point) -> HitTarget {
        if let Some(entity) = ctx.selection.single().and_then(|id| ctx.scene.get(id)) {
            if !entity.locked {
                let half = ctx.config.handle_size / 2.0;
                let sides: &[Handle] = if entity.kind.has_side_handles() {
                    &Handle::SIDES
                } else {
                    &[]
                };
                for &handle in Handle::CORNERS.iter().chain(sides) {
                    let at = ctx
                        .viewport
                        .scene_to_screen(handle.position_on(&entity.geometry));
                    if (screen.x - at.x).abs() <= half && (screen.y - at.y).abs() <= half {
                        return HitTarget::Handle(entity.id, handle);
                    }
                }
            }
        }

        ctx.scene
            .entity_at(ctx.viewport.screen_to_scene(screen))
            .map_or(HitTarget::Canvas, HitTarget::Entity)
    }

    /// Pointer pressed at a screen position.
    pub fn pointer_down(
        &mut self,
        ctx: &mut InteractionContext<'_>,
        screen: Point,
        modifiers: Modifiers,
    ) {
        self.guides = GuideLines::default();

        match Self::hit_test(ctx, screen) {
            HitTarget::Handle(entity, handle) => {
                let Some(target) = ctx.scene.get(entity) else {
                    return;
                };
                self.state = Interaction::Resizing {
                    entity,
                    handle,
                    start_pointer: screen,
                    start_geometry: target.geometry,
                    start_crop: target.image().map(|i| i.crop),
                };
                tracing::debug!("Resizing {entity} from {handle:?}");
            }
            HitTarget::Entity(id) => self.press_entity(ctx, id, screen, modifiers),
            HitTarget::Canvas => {
                *ctx.selection = Selection::None;
                self.state = Interaction::MarqueeSelecting {
                    start: screen,
                    current: screen,
                };
                tracing::debug!("Marquee started at ({}, {})", screen.x, screen.y);
            }
        }
    }

    fn press_entity(
        &mut self,
        ctx: &mut InteractionContext<'_>,
        id: EntityId,
        screen: Point,
        modifiers: Modifiers,
    ) {
        if ctx.editing_text == Some(id) {
            return;
        }
        let Some(entity) = ctx.scene.get(id) else {
            return;
        };
        if entity.locked {
            *ctx.selection = Selection::Single(id);
            self.state = Interaction::Idle;
            return;
        }

        let target = if modifiers.alt {
            match ctx.scene.duplicate(id, ctx.config.duplicate_gap) {
                Some(copy) => {
                    tracing::debug!("Duplicated {id} as {copy}");
                    copy
                }
                None => id,
            }
        } else {
            id
        };

        let Some(start_geometry) = ctx.scene.get(target).map(|e| e.geometry) else {
            return;
        };
        *ctx.selection = Selection::Single(target);
        self.state = Interaction::Moving {
            entity: target,
            start_pointer: screen,
            start_geometry,
        };
        tracing::debug!("Moving {target}");
    }

    /// Pointer moved to a screen position.
    pub fn pointer_move(
        &mut self,
        ctx: &mut InteractionContext<'_>,
        screen: Point,
        modifiers: Modifiers,
    ) {
        match self.state {
            Interaction::Idle => {}
            Interaction::Moving {
                entity,
                start_pointer,
                start_geometry,
            } => {
                let delta = ctx.viewport.screen_delta_to_scene(screen - start_pointer);
                let rect = start_geometry.with_origin(start_geometry.origin() + delta);
                ctx.scene
                    .update(entity, EntityPatch::Geometry(GeometryPatch { rect, crop: None }));
                self.guides = GuideLines::compute(
                    ctx.scene,
                    entity,
                    ctx.viewport,
                    ctx.config.content_size,
                    ctx.config.guide_threshold,
                );
            }
            Interaction::Resizing {
                entity,
                handle,
                start_pointer,
                start_geometry,
                start_crop,
            } => {
                let delta = ctx.viewport.screen_delta_to_scene(screen - start_pointer);
                let min = ctx.config.min_entity_size;
                let natural = ctx.scene.get(entity).and_then(|e| e.image()).map(|i| i.natural);
                let patch = match (start_crop, natural) {
                    (Some(crop), Some(natural)) => {
                        let resized = resize_image(
                            start_geometry,
                            crop,
                            natural,
                            handle,
                            delta,
                            modifiers.shift,
                            min,
                        );
                        GeometryPatch {
                            rect: resized.rect,
                            crop: Some(resized.crop),
                        }
                    }
                    _ => GeometryPatch {
                        rect: resize_rect(start_geometry, handle, delta, modifiers.shift, min),
                        crop: None,
                    },
                };
                ctx.scene.update(entity, EntityPatch::Geometry(patch));
            }
            Interaction::MarqueeSelecting { start, .. } => {
                self.state = Interaction::MarqueeSelecting {
                    start,
                    current: screen,
                };
                let screen_rect = Rect::from_points(start, screen);
                let scene_rect = ctx.viewport.screen_rect_to_scene(&screen_rect);
                *ctx.selection = Selection::from_ids(ctx.scene.intersecting(&scene_rect));
            }
        }
    }

    /// Pointer released anywhere. Always returns to idle.
    pub fn pointer_up(&mut self, selection: &mut Selection) {
        if let Interaction::MarqueeSelecting { .. } = self.state {
            *selection = std::mem::take(selection).normalized();
        }
        if !self.state.is_idle() {
            tracing::debug!("Interaction ended: {:?}", self.state);
        }
        self.state = Interaction::Idle;
        self.guides = GuideLines::default();
    }

    /// Pointer left the window. Same as a release.
    pub fn pointer_leave(&mut self, selection: &mut Selection) {
        self.pointer_up(selection);
    }
}
