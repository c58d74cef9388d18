//! Zoom and screen/scene coordinate conversion.

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::geometry::{Point, Rect};

/// Zoom state plus the screen position of the content area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
    step: f32,
    /// Screen position of the canvas frame's top-left corner.
    canvas_offset: Point,
    /// Padding between the frame and the content area, in screen pixels.
    padding: f32,
}

impl Viewport {
    /// Create a viewport at zoom 1 with the canvas at the screen origin.
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            zoom: 1.0,
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            step: config.zoom_step,
            canvas_offset: Point::default(),
            padding: config.content_padding,
        }
    }

    /// Current zoom factor.
    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Zoom as a whole percentage, for the status bar.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn zoom_percent(&self) -> i32 {
        (self.zoom * 100.0).round() as i32
    }

    /// Set the zoom, clamped to the configured bounds and rounded to 2 decimals.
    pub fn set_zoom(&mut self, zoom: f32) {
        let target = if zoom.is_finite() { zoom } else { 1.0 };
        let clamped = target.clamp(self.min_zoom, self.max_zoom);
        self.zoom = round2(clamped).clamp(self.min_zoom, self.max_zoom);
        tracing::debug!("Zoom set to {}", self.zoom);
    }

    /// Set the zoom from a slider percentage.
    pub fn set_zoom_percent(&mut self, percent: f32) {
        self.set_zoom(percent / 100.0);
    }

    /// Multiply the zoom by one step.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * self.step);
    }

    /// Divide the zoom by one step.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / self.step);
    }

    /// Back to 100%.
    pub fn reset_zoom(&mut self) {
        self.set_zoom(1.0);
    }

    /// Zoom from a wheel tick: scrolling up (negative delta) zooms in.
    pub fn apply_wheel(&mut self, delta_y: f32) {
        if delta_y < 0.0 {
            self.zoom_in();
        } else if delta_y > 0.0 {
            self.zoom_out();
        }
    }

    /// Tell the viewport where the canvas frame sits on screen.
    pub fn set_canvas_offset(&mut self, offset: Point) {
        self.canvas_offset = offset;
    }

    /// Screen position of the content area's top-left corner.
    #[must_use]
    pub fn content_origin(&self) -> Point {
        Point::new(
            self.canvas_offset.x + self.padding,
            self.canvas_offset.y + self.padding,
        )
    }

    /// Convert a screen-space delta to scene units.
    #[must_use]
    pub fn screen_delta_to_scene(&self, delta: Point) -> Point {
        delta.scale(1.0 / self.zoom)
    }

    /// Convert a screen point to scene coordinates.
    #[must_use]
    pub fn screen_to_scene(&self, p: Point) -> Point {
        self.screen_delta_to_scene(p - self.content_origin())
    }

    /// Convert a scene point to screen coordinates.
    #[must_use]
    pub fn scene_to_screen(&self, p: Point) -> Point {
        p.scale(self.zoom) + self.content_origin()
    }

    /// Convert a scene rectangle to screen space.
    #[must_use]
    pub fn scene_rect_to_screen(&self, r: &Rect) -> Rect {
        let origin = self.scene_to_screen(r.origin());
        Rect::new(origin.x, origin.y, r.width * self.zoom, r.height * self.zoom)
    }

    /// Convert a screen rectangle to scene space.
    #[must_use]
    pub fn screen_rect_to_scene(&self, r: &Rect) -> Rect {
        let origin = self.screen_to_scene(r.origin());
        Rect::new(origin.x, origin.y, r.width / self.zoom, r.height / self.zoom)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

/// Round to two decimal places.
#[must_use]
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_zoom_steps_and_reset() {
        let mut vp = Viewport::default();
        for _ in 0..3 {
            vp.apply_wheel(-1.0);
        }
        assert!((vp.zoom() - 1.331).abs() < 0.01, "zoom was {}", vp.zoom());
        vp.reset_zoom();
        assert!((vp.zoom() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut vp = Viewport::default();
        for _ in 0..100 {
            vp.zoom_in();
        }
        assert!((vp.zoom() - 4.0).abs() < f32::EPSILON);
        for _ in 0..100 {
            vp.zoom_out();
        }
        assert!((vp.zoom() - 0.25).abs() < f32::EPSILON);

        vp.set_zoom(f32::NAN);
        assert!((vp.zoom() - 1.0).abs() < f32::EPSILON);
        vp.set_zoom_percent(1234.0);
        assert!((vp.zoom() - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zoom_rounded_to_two_decimals() {
        let mut vp = Viewport::default();
        vp.set_zoom(1.23456);
        assert!((vp.zoom() - 1.23).abs() < 1e-6);
        assert_eq!(vp.zoom_percent(), 123);
    }

    #[test]
    fn test_coordinate_round_trip_under_zoom() {
        let mut vp = Viewport::default();
        vp.set_canvas_offset(Point::new(200.0, 100.0));
        vp.set_zoom(2.0);

        let origin = vp.content_origin();
        assert!((origin.x - 232.0).abs() < f32::EPSILON);

        let scene = vp.screen_to_scene(Point::new(432.0, 332.0));
        assert!((scene.x - 100.0).abs() < 1e-4);
        assert!((scene.y - 100.0).abs() < 1e-4);

        let screen = vp.scene_to_screen(scene);
        assert!((screen.x - 432.0).abs() < 1e-4);

        let delta = vp.screen_delta_to_scene(Point::new(50.0, -20.0));
        assert!((delta.x - 25.0).abs() < 1e-6);
        assert!((delta.y + 10.0).abs() < 1e-6);
    }
}
