//! Scene export to PNG.
//!
//! Renders a [`SceneSnapshot`] at zoom 1 with nothing selected, so the output
//! matches what the editor shows. Image sources are decoded concurrently
//! before the draw pass; an image that fails to decode is logged and left out.

use std::collections::HashMap;
use std::sync::Arc;

use clipo_core::{
    Background, Border, BorderStyle, Color, Entity, EntityId, EntityKind, ImageData, Point, Rect,
    SceneSnapshot, ShapeStyle, Size, TextAlign, TextStyle,
};
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};
use crate::image::{decode_image, DecodedImage};
use crate::shapes::{radius_from_percent, shape_path};
use crate::skia::SkiaSurface;
use crate::surface::{
    FontSpec, Path2D, RasterSurface, StrokeStyle, SurfaceTransform, TextAnchor, TextRun,
};
use crate::text::FontBook;

/// Dash pattern for dashed borders, `[on, off]`.
pub const DASH_PATTERN: [f32; 2] = [6.0, 4.0];

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f32 = 1.2;

/// Horizontal inset for left- and right-aligned text.
pub const TEXT_INSET: f32 = 8.0;

/// Decoded images keyed by entity.
pub type DecodedImages = HashMap<EntityId, Arc<DecodedImage>>;

/// Configuration for scene export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Suggested output file name.
    pub filename: String,
    /// Output size in pixels; the content size when `None`. Other sizes
    /// scale the slide uniformly to fit.
    pub size: Option<(u32, u32)>,
    /// Background override; the scene's own background when `None`.
    pub background: Option<Background>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            filename: "presentation.png".to_string(),
            size: None,
            background: None,
        }
    }
}

/// Exports a [`SceneSnapshot`] to PNG.
#[derive(Debug, Clone)]
pub struct SceneExporter {
    config: ExportConfig,
    fonts: Arc<FontBook>,
}

impl SceneExporter {
    /// Create a new exporter with the given configuration and fonts.
    #[must_use]
    pub fn new(config: ExportConfig, fonts: Arc<FontBook>) -> Self {
        Self { config, fonts }
    }

    /// Create an exporter with default configuration and no fonts.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default(), Arc::new(FontBook::new()))
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Fonts used for text entities.
    #[must_use]
    pub fn fonts(&self) -> &Arc<FontBook> {
        &self.fonts
    }

    /// Decode, draw and encode the snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot be allocated or PNG encoding
    /// fails. Individual image decode failures are not errors.
    pub async fn export_png(&self, snapshot: &SceneSnapshot) -> RenderResult<Vec<u8>> {
        let images = decode_images(snapshot).await;
        let surface = self.render(snapshot, &images)?;
        let png = surface.encode_png()?;
        tracing::info!(
            bytes = png.len(),
            entities = snapshot.entities.len(),
            filename = %self.config.filename,
            "Exported scene"
        );
        Ok(png)
    }

    /// Draw the snapshot onto a new surface using already decoded images.
    ///
    /// With a size override the slide is scaled uniformly to fit and
    /// centered; the background covers the whole surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the content size is degenerate or the surface
    /// cannot be allocated.
    #[allow(clippy::cast_precision_loss)]
    pub fn render(
        &self,
        snapshot: &SceneSnapshot,
        images: &DecodedImages,
    ) -> RenderResult<SkiaSurface> {
        let content = content_pixels(snapshot.content_size)?;
        let (width, height) = self.config.size.unwrap_or(content);
        let mut surface = SkiaSurface::new(width, height, Arc::clone(&self.fonts))?;

        let mut snapshot = snapshot.clone();
        if let Some(background) = self.config.background {
            snapshot.background = background;
        }

        if (width, height) == content {
            draw_scene(&mut surface, &snapshot, images);
        } else {
            let output = Size::new(width as f32, height as f32);
            let slide = snapshot.content_size;
            let scale = (output.width / slide.width).min(output.height / slide.height);
            tracing::debug!(width, height, scale, "Scaling export to requested size");

            surface.set_transform(SurfaceTransform::IDENTITY);
            draw_background(
                &mut surface,
                &Rect::new(0.0, 0.0, output.width, output.height),
                snapshot.background,
            );
            draw_centered(&mut surface, scale, output, &snapshot, images);
        }
        Ok(surface)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn content_pixels(size: Size) -> RenderResult<(u32, u32)> {
    let finite = size.width.is_finite() && size.height.is_finite();
    if !finite || size.width < 1.0 || size.height < 1.0 {
        return Err(RenderError::Surface(format!(
            "invalid content size {}x{}",
            size.width, size.height
        )));
    }
    Ok((size.width.round() as u32, size.height.round() as u32))
}

/// Decode every image entity concurrently.
///
/// Each decode runs on the blocking pool; failures are logged and the
/// entity is missing from the result.
pub async fn decode_images(snapshot: &SceneSnapshot) -> DecodedImages {
    let tasks = snapshot.entities.iter().filter_map(|entity| {
        let image = entity.image()?;
        let id = entity.id;
        let source = Arc::clone(&image.source);
        Some(async move {
            let decoded = tokio::task::spawn_blocking(move || decode_image(&source)).await;
            match decoded {
                Ok(Ok(image)) => Some((id, Arc::new(image))),
                Ok(Err(e)) => {
                    tracing::warn!(%id, "Skipping image that failed to decode: {e}");
                    None
                }
                Err(e) => {
                    tracing::warn!(%id, "Image decode task failed: {e}");
                    None
                }
            }
        })
    });

    futures::future::join_all(tasks)
        .await
        .into_iter()
        .flatten()
        .collect()
}

/// Draw the scene at `scale`, centered in `output`, then restore the
/// identity transform.
pub(crate) fn draw_centered(
    surface: &mut dyn RasterSurface,
    scale: f32,
    output: Size,
    snapshot: &SceneSnapshot,
    images: &DecodedImages,
) {
    let content = snapshot.content_size;
    surface.set_transform(SurfaceTransform {
        scale,
        translate_x: (output.width - content.width * scale) / 2.0,
        translate_y: (output.height - content.height * scale) / 2.0,
    });
    draw_scene(surface, snapshot, images);
    surface.set_transform(SurfaceTransform::IDENTITY);
}

/// Paint the background and every entity in scene order.
pub fn draw_scene(
    surface: &mut dyn RasterSurface,
    snapshot: &SceneSnapshot,
    images: &DecodedImages,
) {
    let content = Rect::new(
        0.0,
        0.0,
        snapshot.content_size.width,
        snapshot.content_size.height,
    );
    draw_background(surface, &content, snapshot.background);

    for entity in snapshot.entities.iter() {
        tracing::trace!(id = %entity.id, "Drawing entity");
        match &entity.kind {
            EntityKind::Image(image) => {
                if let Some(decoded) = images.get(&entity.id) {
                    draw_image_entity(surface, entity, image, decoded);
                }
            }
            EntityKind::Text(text) => draw_text_entity(surface, &entity.geometry, text),
            EntityKind::Shape(shape) => draw_shape_entity(surface, &entity.geometry, shape),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn draw_background(surface: &mut dyn RasterSurface, content: &Rect, background: Background) {
    let path = Path2D::rect(content);
    surface.fill_path(&path, Color::WHITE);
    let opacity = background.opacity.clamp(0.0, 100.0) / 100.0;
    let alpha = (f32::from(background.color.a) * opacity).round() as u8;
    if alpha > 0 {
        surface.fill_path(&path, Color { a: alpha, ..background.color });
    }
}

fn border_stroke(border: &Border) -> Option<StrokeStyle> {
    border.is_visible().then(|| StrokeStyle {
        width: border.width,
        color: border.color,
        dash: (border.style == BorderStyle::Dashed).then_some(DASH_PATTERN),
    })
}

fn draw_image_entity(
    surface: &mut dyn RasterSurface,
    entity: &Entity,
    image: &ImageData,
    decoded: &DecodedImage,
) {
    let rect = entity.geometry;
    let outline = Path2D::rounded_rect(&rect, radius_from_percent(&rect, image.corner_radius));
    let content = image.crop.content_size(image.natural);
    let dest = Rect::new(
        rect.x + image.crop.offset_x,
        rect.y + image.crop.offset_y,
        content.width,
        content.height,
    );

    surface.clip_path(&outline);
    surface.set_filter(&image.filters);
    surface.set_opacity(image.opacity / 100.0);
    surface.draw_image(decoded, dest);
    // Still clipped: only the inner half of the border shows.
    if let Some(stroke) = border_stroke(&image.border) {
        surface.stroke_path(&outline, &stroke);
    }
    surface.reset_clip();
    surface.reset_effects();
}

fn draw_text_entity(surface: &mut dyn RasterSurface, rect: &Rect, text: &TextStyle) {
    let outline = Path2D::rounded_rect(rect, radius_from_percent(rect, text.corner_radius));
    if let Some(background) = text.background.filter(|c| !c.is_transparent()) {
        surface.fill_path(&outline, background);
    }
    if let Some(stroke) = border_stroke(&text.border) {
        surface.stroke_path(&outline, &stroke);
    }

    let font = FontSpec {
        family: text.font_family.clone(),
        size: text.font_size,
        weight: text.font_weight,
        style: text.font_style,
    };
    let (x, align) = match text.align {
        TextAlign::Left | TextAlign::Justify => (rect.x + TEXT_INSET, TextAnchor::Start),
        TextAlign::Right => (rect.right() - TEXT_INSET, TextAnchor::End),
        TextAlign::Center => (rect.center().x, TextAnchor::Center),
    };

    for (line, y) in line_positions(rect, &text.content, text.font_size) {
        surface.draw_text(&TextRun {
            text: line.to_string(),
            anchor: Point::new(x, y),
            align,
            font: font.clone(),
            color: text.color,
        });
    }
}

/// Vertical middles of each line, with the block centered in `rect`.
#[allow(clippy::cast_precision_loss)]
fn line_positions<'a>(rect: &Rect, content: &'a str, font_size: f32) -> Vec<(&'a str, f32)> {
    let lines: Vec<&str> = content.split('\n').collect();
    let line_height = font_size * LINE_HEIGHT;
    let top = rect.center().y - line_height * lines.len() as f32 / 2.0;
    lines
        .into_iter()
        .enumerate()
        .map(|(i, line)| (line, top + line_height * (i as f32 + 0.5)))
        .collect()
}

fn draw_shape_entity(surface: &mut dyn RasterSurface, rect: &Rect, shape: &ShapeStyle) {
    let path = shape_path(shape.shape_kind, rect, shape.corner_radius);
    surface.fill_path(&path, shape.fill);
    if let Some(stroke) = border_stroke(&shape.border) {
        surface.stroke_path(&path, &stroke);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_positions_center_block() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let lines = line_positions(&rect, "a\nb", 10.0);
        assert_eq!(lines.len(), 2);
        assert!((lines[0].1 - 44.0).abs() < 1e-4);
        assert!((lines[1].1 - 56.0).abs() < 1e-4);

        let single = line_positions(&rect, "only", 24.0);
        assert!((single[0].1 - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_default_filename() {
        assert_eq!(ExportConfig::default().filename, "presentation.png");
    }
}
