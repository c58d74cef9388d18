//! The drawing-surface capability the export engine renders through.
//!
//! Paths are recorded as plain commands so a surface can be swapped for a
//! recording double in tests.

use clipo_core::{Color, FilterStack, FontStyle, FontWeight, Point, Rect};

use crate::error::RenderResult;
use crate::image::DecodedImage;

/// Bezier constant for approximating a quarter circle with a cubic.
const KAPPA: f32 = 0.552_284_8;

/// One path command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    /// Start a new subpath.
    MoveTo(Point),
    /// Straight segment.
    LineTo(Point),
    /// Cubic bezier with two control points.
    CubicTo(Point, Point, Point),
    /// Close the current subpath.
    Close,
}

/// A vector path in user space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path2D {
    commands: Vec<PathCommand>,
}

impl Path2D {
    /// Empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a subpath.
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(PathCommand::MoveTo(Point::new(x, y)));
    }

    /// Add a line.
    pub fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(PathCommand::LineTo(Point::new(x, y)));
    }

    /// Add a cubic curve.
    pub fn cubic_to(&mut self, c1: Point, c2: Point, to: Point) {
        self.commands.push(PathCommand::CubicTo(c1, c2, to));
    }

    /// Close the subpath.
    pub fn close(&mut self) {
        self.commands.push(PathCommand::Close);
    }

    /// Recorded commands.
    #[must_use]
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Axis-aligned rectangle.
    #[must_use]
    pub fn rect(r: &Rect) -> Self {
        Self::polygon(&[
            Point::new(r.x, r.y),
            Point::new(r.right(), r.y),
            Point::new(r.right(), r.bottom()),
            Point::new(r.x, r.bottom()),
        ])
    }

    /// Rectangle with circular corners. A radius of zero gives a plain rectangle.
    #[must_use]
    pub fn rounded_rect(r: &Rect, radius: f32) -> Self {
        let radius = radius.clamp(0.0, r.width.min(r.height) / 2.0);
        if radius <= 0.0 {
            return Self::rect(r);
        }
        let k = radius * KAPPA;
        let (l, t, rt, b) = (r.x, r.y, r.right(), r.bottom());

        let mut path = Self::new();
        path.move_to(l + radius, t);
        path.line_to(rt - radius, t);
        path.cubic_to(
            Point::new(rt - radius + k, t),
            Point::new(rt, t + radius - k),
            Point::new(rt, t + radius),
        );
        path.line_to(rt, b - radius);
        path.cubic_to(
            Point::new(rt, b - radius + k),
            Point::new(rt - radius + k, b),
            Point::new(rt - radius, b),
        );
        path.line_to(l + radius, b);
        path.cubic_to(
            Point::new(l + radius - k, b),
            Point::new(l, b - radius + k),
            Point::new(l, b - radius),
        );
        path.line_to(l, t + radius);
        path.cubic_to(
            Point::new(l, t + radius - k),
            Point::new(l + radius - k, t),
            Point::new(l + radius, t),
        );
        path.close();
        path
    }

    /// Ellipse inscribed in `r`.
    #[must_use]
    pub fn ellipse(r: &Rect) -> Self {
        let c = r.center();
        let (rx, ry) = (r.width / 2.0, r.height / 2.0);
        let (kx, ky) = (rx * KAPPA, ry * KAPPA);

        let mut path = Self::new();
        path.move_to(c.x + rx, c.y);
        path.cubic_to(
            Point::new(c.x + rx, c.y + ky),
            Point::new(c.x + kx, c.y + ry),
            Point::new(c.x, c.y + ry),
        );
        path.cubic_to(
            Point::new(c.x - kx, c.y + ry),
            Point::new(c.x - rx, c.y + ky),
            Point::new(c.x - rx, c.y),
        );
        path.cubic_to(
            Point::new(c.x - rx, c.y - ky),
            Point::new(c.x - kx, c.y - ry),
            Point::new(c.x, c.y - ry),
        );
        path.cubic_to(
            Point::new(c.x + kx, c.y - ry),
            Point::new(c.x + rx, c.y - ky),
            Point::new(c.x + rx, c.y),
        );
        path.close();
        path
    }

    /// Closed polygon through `points`.
    #[must_use]
    pub fn polygon(points: &[Point]) -> Self {
        let mut path = Self::new();
        let mut iter = points.iter();
        if let Some(first) = iter.next() {
            path.move_to(first.x, first.y);
            for p in iter {
                path.line_to(p.x, p.y);
            }
            path.close();
        }
        path
    }
}

/// Stroke parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    /// Line width in user units.
    pub width: f32,
    /// Stroke color.
    pub color: Color,
    /// Dash pattern `[on, off]`, or `None` for solid.
    pub dash: Option<[f32; 2]>,
}

/// Horizontal anchor of a text run, like canvas `textAlign`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    /// Run starts at the anchor.
    Start,
    /// Run is centered on the anchor.
    Center,
    /// Run ends at the anchor.
    End,
}

/// Font selection for a text run.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    /// Family name.
    pub family: String,
    /// Size in user units.
    pub size: f32,
    /// Weight.
    pub weight: FontWeight,
    /// Slant.
    pub style: FontStyle,
}

/// A single line of text positioned by its anchor and vertical middle.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// The text.
    pub text: String,
    /// Anchor point; `y` is the vertical middle of the line.
    pub anchor: Point,
    /// How the run sits relative to the anchor.
    pub align: TextAnchor,
    /// Font.
    pub font: FontSpec,
    /// Fill color.
    pub color: Color,
}

/// Uniform scale followed by a translation, user space to device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceTransform {
    /// Scale factor.
    pub scale: f32,
    /// Horizontal offset in device pixels.
    pub translate_x: f32,
    /// Vertical offset in device pixels.
    pub translate_y: f32,
}

impl SurfaceTransform {
    /// No scaling or offset.
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        translate_x: 0.0,
        translate_y: 0.0,
    };

    /// Map a user-space point to device pixels.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            p.x * self.scale + self.translate_x,
            p.y * self.scale + self.translate_y,
        )
    }
}

impl Default for SurfaceTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A raster drawing target.
///
/// Mirrors the small subset of a 2D canvas context that slide rendering
/// needs. Drawing calls never fail; problems are logged by implementations.
pub trait RasterSurface {
    /// Width in device pixels.
    fn width(&self) -> u32;

    /// Height in device pixels.
    fn height(&self) -> u32;

    /// Set the user-to-device transform for later calls.
    fn set_transform(&mut self, transform: SurfaceTransform);

    /// Fill a path.
    fn fill_path(&mut self, path: &Path2D, color: Color);

    /// Stroke a path.
    fn stroke_path(&mut self, path: &Path2D, stroke: &StrokeStyle);

    /// Restrict later drawing to the inside of `path`.
    fn clip_path(&mut self, path: &Path2D);

    /// Remove the clip.
    fn reset_clip(&mut self);

    /// Apply a filter chain to later drawing.
    fn set_filter(&mut self, filters: &FilterStack);

    /// Apply an opacity in `[0, 1]` to later drawing.
    fn set_opacity(&mut self, opacity: f32);

    /// Clear filter and opacity.
    fn reset_effects(&mut self);

    /// Draw an image scaled into `dest`.
    fn draw_image(&mut self, image: &DecodedImage, dest: Rect);

    /// Draw one line of text.
    fn draw_text(&mut self, run: &TextRun);

    /// Encode the current pixels as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    fn encode_png(&self) -> RenderResult<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounded_rect_radius_clamped_to_half_short_side() {
        let r = Rect::new(0.0, 0.0, 100.0, 40.0);
        let path = Path2D::rounded_rect(&r, 500.0);
        assert_eq!(path.commands()[0], PathCommand::MoveTo(Point::new(20.0, 0.0)));
    }

    #[test]
    fn test_zero_radius_is_plain_rect() {
        let r = Rect::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(Path2D::rounded_rect(&r, 0.0), Path2D::rect(&r));
        assert_eq!(Path2D::rect(&r).commands().len(), 5);
    }

    #[test]
    fn test_transform_apply() {
        let t = SurfaceTransform {
            scale: 2.0,
            translate_x: 10.0,
            translate_y: -5.0,
        };
        assert_eq!(t.apply(Point::new(3.0, 4.0)), Point::new(16.0, 3.0));
    }
}
