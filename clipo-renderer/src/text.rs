//! Font registry and glyph outlining for text runs.
//!
//! Glyphs are converted to [`Path2D`] outlines so text goes through the same
//! fill path as every other shape.

use std::fmt;

use clipo_core::{FontStyle, FontWeight, Point};
use rusttype::{point as rt_point, Font, OutlineBuilder, Scale};

use crate::error::{RenderError, RenderResult};
use crate::surface::{FontSpec, Path2D, TextAnchor, TextRun};

struct Face {
    family: String,
    weight: FontWeight,
    style: FontStyle,
    font: Font<'static>,
}

/// Registered fonts, looked up by family, weight and slant.
///
/// Lookup falls back to any face of the family, then to the first face
/// registered. An empty book draws no text.
#[derive(Default)]
pub struct FontBook {
    faces: Vec<Face>,
}

impl fmt::Debug for FontBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.faces
                    .iter()
                    .map(|face| (&face.family, face.weight, face.style)),
            )
            .finish()
    }
}

impl FontBook {
    /// Empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a TrueType/OpenType face.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Font`] if the bytes are not a usable font.
    pub fn add_font(
        &mut self,
        family: &str,
        weight: FontWeight,
        style: FontStyle,
        bytes: Vec<u8>,
    ) -> RenderResult<()> {
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| RenderError::Font(format!("cannot parse face for '{family}'")))?;
        tracing::debug!(family, ?weight, ?style, "Registered font");
        self.faces.push(Face {
            family: family.to_lowercase(),
            weight,
            style,
            font,
        });
        Ok(())
    }

    /// Number of registered faces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Whether no faces are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    fn select(&self, spec: &FontSpec) -> Option<&Font<'static>> {
        let family = spec.family.to_lowercase();
        self.faces
            .iter()
            .find(|f| f.family == family && f.weight == spec.weight && f.style == spec.style)
            .or_else(|| self.faces.iter().find(|f| f.family == family))
            .or_else(|| self.faces.first())
            .map(|f| &f.font)
    }

    /// Outline of a text run in user space, or `None` when there is nothing
    /// to draw.
    #[must_use]
    pub fn outline(&self, run: &TextRun) -> Option<Path2D> {
        if run.text.trim().is_empty() {
            return None;
        }
        let Some(font) = self.select(&run.font) else {
            tracing::trace!(family = %run.font.family, "No font registered, skipping text");
            return None;
        };

        let scale = Scale::uniform(run.font.size);
        let metrics = font.v_metrics(scale);
        let width = advance(font, scale, &run.text);
        let x = match run.align {
            TextAnchor::Start => run.anchor.x,
            TextAnchor::Center => run.anchor.x - width / 2.0,
            TextAnchor::End => run.anchor.x - width,
        };
        // Descent is negative, so this puts the line's middle on the anchor.
        let baseline = run.anchor.y + (metrics.ascent + metrics.descent) / 2.0;

        let mut builder = PathOutline::default();
        for glyph in font.layout(&run.text, scale, rt_point(x, baseline)) {
            glyph.build_outline(&mut builder);
        }
        (!builder.path.is_empty()).then_some(builder.path)
    }
}

fn advance(font: &Font<'static>, scale: Scale, text: &str) -> f32 {
    font.layout(text, scale, rt_point(0.0, 0.0))
        .last()
        .map_or(0.0, |g| {
            g.position().x + g.unpositioned().h_metrics().advance_width
        })
}

/// Collects glyph outlines, raising quadratic segments to cubics.
#[derive(Default)]
struct PathOutline {
    path: Path2D,
    current: Point,
}

impl OutlineBuilder for PathOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        self.path.move_to(x, y);
        self.current = Point::new(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.path.line_to(x, y);
        self.current = Point::new(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let p0 = self.current;
        let q = Point::new(x1, y1);
        let to = Point::new(x, y);
        let c1 = p0 + (q - p0).scale(2.0 / 3.0);
        let c2 = to + (q - to).scale(2.0 / 3.0);
        self.path.cubic_to(c1, c2, to);
        self.current = to;
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.path
            .cubic_to(Point::new(x1, y1), Point::new(x2, y2), Point::new(x, y));
        self.current = Point::new(x, y);
    }

    fn close(&mut self) {
        self.path.close();
    }
}
