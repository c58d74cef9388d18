//! Presentation frames: the slide letterboxed into the viewer's window.

use std::sync::Arc;

use clipo_core::{Color, PresentationSession, Rect, SceneSnapshot, Size};

use crate::error::{RenderError, RenderResult};
use crate::export::{decode_images, draw_centered, DecodedImages};
use crate::skia::SkiaSurface;
use crate::surface::{Path2D, RasterSurface, SurfaceTransform};
use crate::text::FontBook;

/// Color around the slide.
pub const LETTERBOX: Color = Color::BLACK;

/// Renders read-only presentation frames.
#[derive(Debug)]
pub struct PresentationRenderer {
    fonts: Arc<FontBook>,
    frame_count: u64,
}

impl PresentationRenderer {
    /// Create a renderer drawing text with `fonts`.
    #[must_use]
    pub fn new(fonts: Arc<FontBook>) -> Self {
        Self {
            fonts,
            frame_count: 0,
        }
    }

    /// Number of frames drawn so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Draw one frame sized to the session's viewport.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is not active or the surface cannot
    /// be allocated.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn render_frame(
        &mut self,
        session: &PresentationSession,
        snapshot: &SceneSnapshot,
        images: &DecodedImages,
    ) -> RenderResult<SkiaSurface> {
        if !session.is_active() {
            return Err(RenderError::Surface("presentation is not active".to_string()));
        }
        let viewport = session.viewport();
        let width = viewport.width.round().max(1.0) as u32;
        let height = viewport.height.round().max(1.0) as u32;
        let mut surface = SkiaSurface::new(width, height, Arc::clone(&self.fonts))?;

        draw_frame(&mut surface, session.scale(), viewport, snapshot, images);
        self.frame_count += 1;
        tracing::trace!(frame = self.frame_count, scale = session.scale(), "Presentation frame");
        Ok(surface)
    }

    /// Decode images, draw one frame and encode it as PNG.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be drawn or encoded.
    pub async fn render_png(
        &mut self,
        session: &PresentationSession,
        snapshot: &SceneSnapshot,
    ) -> RenderResult<Vec<u8>> {
        let images = decode_images(snapshot).await;
        self.render_frame(session, snapshot, &images)?.encode_png()
    }
}

/// Fill the surface with the letterbox color and draw the slide centered at
/// `scale`.
pub fn draw_frame(
    surface: &mut dyn RasterSurface,
    scale: f32,
    viewport: Size,
    snapshot: &SceneSnapshot,
    images: &DecodedImages,
) {
    surface.set_transform(SurfaceTransform::IDENTITY);
    surface.fill_path(
        &Path2D::rect(&Rect::new(0.0, 0.0, viewport.width, viewport.height)),
        LETTERBOX,
    );

    draw_centered(surface, scale, viewport, snapshot, images);
}
