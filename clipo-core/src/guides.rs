//! Center-alignment guides shown while an entity is dragged.
//!
//! Guides are visual feedback only; they never move the entity.

use serde::{Deserialize, Serialize};

use crate::element::EntityId;
use crate::geometry::{Point, Rect, Size};
use crate::scene::Scene;
use crate::viewport::Viewport;

/// Active guide lines in screen coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideLines {
    /// X positions of vertical lines.
    pub vertical: Vec<f32>,
    /// Y positions of horizontal lines.
    pub horizontal: Vec<f32>,
    /// Screen bounds of the content area, for clipping line length.
    pub bounds: Rect,
}

impl GuideLines {
    /// Compute guides for `dragged` against the content center and every
    /// other entity's center.
    ///
    /// A candidate is active on an axis when the screen-space distance
    /// between centers is at most `threshold` pixels.
    #[must_use]
    pub fn compute(
        scene: &Scene,
        dragged: EntityId,
        viewport: &Viewport,
        content_size: Size,
        threshold: f32,
    ) -> Self {
        let content = Rect::new(0.0, 0.0, content_size.width, content_size.height);
        let bounds = viewport.scene_rect_to_screen(&content);
        let Some(entity) = scene.get(dragged) else {
            return Self {
                bounds,
                ..Self::default()
            };
        };

        let center = entity.geometry.center();
        let candidates = std::iter::once(content.center()).chain(
            scene
                .entities()
                .iter()
                .filter(|e| e.id != dragged)
                .map(|e| e.geometry.center()),
        );

        let zoom = viewport.zoom();
        let mut vertical = Vec::new();
        let mut horizontal = Vec::new();
        for candidate in candidates {
            let screen: Point = viewport.scene_to_screen(candidate);
            if (center.x - candidate.x).abs() * zoom <= threshold {
                push_unique(&mut vertical, screen.x);
            }
            if (center.y - candidate.y).abs() * zoom <= threshold {
                push_unique(&mut horizontal, screen.y);
            }
        }

        Self {
            vertical,
            horizontal,
            bounds,
        }
    }

    /// Whether no guide is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertical.is_empty() && self.horizontal.is_empty()
    }
}

fn push_unique(lines: &mut Vec<f32>, position: f32) {
    let rounded = position.round();
    if !lines.iter().any(|l| (l - rounded).abs() < f32::EPSILON) {
        lines.push(rounded);
    }
}
