//! Editor configuration.

use serde::{Deserialize, Serialize};

use crate::geometry::{Size, MIN_SIZE};

/// Tunable constants for the editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Content area size in scene units (the exported image size).
    pub content_size: Size,
    /// Padding between the canvas frame and the content area, in screen pixels.
    pub content_padding: f32,
    /// Minimum entity width and height.
    pub min_entity_size: f32,
    /// Distance in screen pixels under which centers count as aligned.
    pub guide_threshold: f32,
    /// Vertical gap between a duplicate and its source.
    pub duplicate_gap: f32,
    /// Smallest zoom factor.
    pub min_zoom: f32,
    /// Largest zoom factor.
    pub max_zoom: f32,
    /// Multiplier applied per zoom step.
    pub zoom_step: f32,
    /// Side of the square hit area around each resize handle, in screen pixels.
    pub handle_size: f32,
    /// Fraction of the content area a newly added image may occupy.
    pub image_fit_fraction: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            content_size: Size::new(1000.0, 800.0),
            content_padding: 32.0,
            min_entity_size: MIN_SIZE,
            guide_threshold: 4.0,
            duplicate_gap: 10.0,
            min_zoom: 0.25,
            max_zoom: 4.0,
            zoom_step: 1.1,
            handle_size: 10.0,
            image_fit_fraction: 0.8,
        }
    }
}

impl EditorConfig {
    /// Use a different content area size.
    #[must_use]
    pub fn with_content_size(mut self, width: f32, height: f32) -> Self {
        self.content_size = Size::new(width, height);
        self
    }
}
