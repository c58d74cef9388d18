//! Software [`RasterSurface`] backed by a tiny-skia pixmap.

use std::sync::Arc;

use clipo_core::{Color, FilterStack, Rect};
use tiny_skia::{
    FillRule, FilterQuality, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, StrokeDash,
    Transform,
};

use crate::error::{RenderError, RenderResult};
use crate::filter::{apply_filters, filter_color};
use crate::image::DecodedImage;
use crate::surface::{Path2D, PathCommand, RasterSurface, StrokeStyle, SurfaceTransform, TextRun};
use crate::text::FontBook;

/// CPU raster surface.
pub struct SkiaSurface {
    pixmap: Pixmap,
    clip: Option<Mask>,
    transform: SurfaceTransform,
    filters: FilterStack,
    opacity: f32,
    fonts: Arc<FontBook>,
}

impl std::fmt::Debug for SkiaSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SkiaSurface")
            .field("width", &self.pixmap.width())
            .field("height", &self.pixmap.height())
            .field("clipped", &self.clip.is_some())
            .field("transform", &self.transform)
            .field("opacity", &self.opacity)
            .finish_non_exhaustive()
    }
}

impl SkiaSurface {
    /// Allocate a transparent surface.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Surface`] for a zero or oversized area.
    pub fn new(width: u32, height: u32, fonts: Arc<FontBook>) -> RenderResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or_else(|| {
            RenderError::Surface(format!("cannot allocate {width}x{height} pixmap"))
        })?;
        Ok(Self {
            pixmap,
            clip: None,
            transform: SurfaceTransform::IDENTITY,
            filters: FilterStack::default(),
            opacity: 1.0,
            fonts,
        })
    }

    /// Straight-alpha RGBA of one device pixel.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixmap.pixel(x, y).map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
    }

    fn device_transform(&self) -> Transform {
        let t = self.transform;
        Transform::from_row(t.scale, 0.0, 0.0, t.scale, t.translate_x, t.translate_y)
    }

    /// Color with the active filter chain and opacity applied.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn effective_color(&self, color: Color) -> tiny_skia::Color {
        let c = filter_color(color, &self.filters);
        let alpha = (f32::from(c.a) * self.opacity).round().clamp(0.0, 255.0) as u8;
        tiny_skia::Color::from_rgba8(c.r, c.g, c.b, alpha)
    }

    fn paint(&self, color: Color) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(self.effective_color(color));
        paint.anti_alias = true;
        paint
    }
}

fn to_skia_path(path: &Path2D) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    for command in path.commands() {
        match *command {
            PathCommand::MoveTo(p) => pb.move_to(p.x, p.y),
            PathCommand::LineTo(p) => pb.line_to(p.x, p.y),
            PathCommand::CubicTo(c1, c2, p) => pb.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
            PathCommand::Close => pb.close(),
        }
    }
    pb.finish()
}

/// Straight RGBA to a premultiplied pixmap.
fn image_pixmap(image: &DecodedImage) -> Option<Pixmap> {
    let size = tiny_skia::IntSize::from_wh(image.width, image.height)?;
    let mut data = image.data.clone();
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            // Rounded c * a / 255, always <= 255.
            *c = u8::try_from((u16::from(*c) * a + 127) / 255).unwrap_or(u8::MAX);
        }
    }
    Pixmap::from_vec(data, size)
}

impl RasterSurface for SkiaSurface {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn set_transform(&mut self, transform: SurfaceTransform) {
        self.transform = transform;
    }

    fn fill_path(&mut self, path: &Path2D, color: Color) {
        let Some(skia_path) = to_skia_path(path) else {
            return;
        };
        let paint = self.paint(color);
        let transform = self.device_transform();
        self.pixmap.fill_path(
            &skia_path,
            &paint,
            FillRule::Winding,
            transform,
            self.clip.as_ref(),
        );
    }

    fn stroke_path(&mut self, path: &Path2D, stroke: &StrokeStyle) {
        let Some(skia_path) = to_skia_path(path) else {
            return;
        };
        let paint = self.paint(stroke.color);
        let skia_stroke = Stroke {
            width: stroke.width,
            dash: stroke
                .dash
                .and_then(|[on, off]| StrokeDash::new(vec![on, off], 0.0)),
            ..Stroke::default()
        };
        let transform = self.device_transform();
        self.pixmap.stroke_path(
            &skia_path,
            &paint,
            &skia_stroke,
            transform,
            self.clip.as_ref(),
        );
    }

    fn clip_path(&mut self, path: &Path2D) {
        let Some(skia_path) = to_skia_path(path) else {
            return;
        };
        let Some(mut mask) = Mask::new(self.pixmap.width(), self.pixmap.height()) else {
            return;
        };
        mask.fill_path(&skia_path, FillRule::Winding, true, self.device_transform());
        self.clip = Some(mask);
    }

    fn reset_clip(&mut self) {
        self.clip = None;
    }

    fn set_filter(&mut self, filters: &FilterStack) {
        self.filters = filters.clamped();
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    fn reset_effects(&mut self) {
        self.filters = FilterStack::default();
        self.opacity = 1.0;
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw_image(&mut self, image: &DecodedImage, dest: Rect) {
        if image.width == 0 || image.height == 0 || dest.width <= 0.0 || dest.height <= 0.0 {
            return;
        }
        let Some(source) = image_pixmap(image) else {
            tracing::warn!(width = image.width, height = image.height, "Image buffer size mismatch");
            return;
        };
        let Some(mut layer) = Pixmap::new(self.pixmap.width(), self.pixmap.height()) else {
            return;
        };

        let placement = Transform::from_scale(
            dest.width / image.width as f32,
            dest.height / image.height as f32,
        )
        .post_translate(dest.x, dest.y)
        .post_concat(self.device_transform());
        layer.draw_pixmap(
            0,
            0,
            source.as_ref(),
            &PixmapPaint {
                quality: FilterQuality::Bilinear,
                ..PixmapPaint::default()
            },
            placement,
            None,
        );

        if !self.filters.is_identity() {
            // Blur radius is in scene units.
            let device_filters = FilterStack {
                blur: self.filters.blur * self.transform.scale,
                ..self.filters
            };
            let (w, h) = (layer.width(), layer.height());
            apply_filters(layer.data_mut(), w, h, &device_filters);
        }

        self.pixmap.draw_pixmap(
            0,
            0,
            layer.as_ref(),
            &PixmapPaint {
                opacity: self.opacity,
                ..PixmapPaint::default()
            },
            Transform::identity(),
            self.clip.as_ref(),
        );
    }

    fn draw_text(&mut self, run: &TextRun) {
        if let Some(outline) = self.fonts.outline(run) {
            self.fill_path(&outline, run.color);
        }
    }

    fn encode_png(&self) -> RenderResult<Vec<u8>> {
        self.pixmap
            .encode_png()
            .map_err(|e| RenderError::Export(format!("PNG encoding failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface(w: u32, h: u32) -> SkiaSurface {
        SkiaSurface::new(w, h, Arc::new(FontBook::new())).unwrap()
    }

    #[test]
    fn test_zero_size_is_surface_error() {
        let err = SkiaSurface::new(0, 10, Arc::new(FontBook::new())).unwrap_err();
        assert!(matches!(err, RenderError::Surface(_)));
    }

    #[test]
    fn test_fill_respects_transform() {
        let mut s = surface(20, 20);
        s.set_transform(SurfaceTransform {
            scale: 2.0,
            translate_x: 10.0,
            translate_y: 0.0,
        });
        s.fill_path(&Path2D::rect(&Rect::new(0.0, 0.0, 5.0, 5.0)), Color::rgb(255, 0, 0));
        assert_eq!(s.pixel(15, 5), Some([255, 0, 0, 255]));
        assert_eq!(s.pixel(5, 5), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_clip_limits_image() {
        let mut s = surface(20, 20);
        s.clip_path(&Path2D::rect(&Rect::new(0.0, 0.0, 10.0, 20.0)));
        let img = DecodedImage::solid(4, 4, [0, 0, 255, 255]);
        s.draw_image(&img, Rect::new(0.0, 0.0, 20.0, 20.0));
        s.reset_clip();

        assert_eq!(s.pixel(5, 10), Some([0, 0, 255, 255]));
        assert_eq!(s.pixel(15, 10), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_opacity_and_filter_reach_image() {
        let mut s = surface(10, 10);
        s.set_filter(&FilterStack {
            grayscale: 100.0,
            ..FilterStack::default()
        });
        s.set_opacity(0.5);
        s.draw_image(&DecodedImage::solid(2, 2, [255, 0, 0, 255]), Rect::new(0.0, 0.0, 10.0, 10.0));
        s.reset_effects();

        let [r, g, b, a] = s.pixel(5, 5).unwrap();
        assert!((126..=129).contains(&a), "alpha {a}");
        assert!(r.abs_diff(g) <= 2 && g.abs_diff(b) <= 2, "not gray: {r} {g} {b}");
    }

    #[test]
    fn test_encode_png_has_signature() {
        let png = surface(3, 3).encode_png().unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
