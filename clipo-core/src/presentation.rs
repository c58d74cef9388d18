//! Presentation mode: full-screen, read-only playback at a uniform scale.

use serde::{Deserialize, Serialize};

use crate::geometry::Size;
use crate::CoreResult;

/// Host environment that can switch to and from full-screen.
pub trait FullscreenHost {
    /// Ask the host to go full-screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses.
    fn request_fullscreen(&mut self) -> CoreResult<()>;

    /// Ask the host to leave full-screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the host refuses.
    fn exit_fullscreen(&mut self) -> CoreResult<()>;
}

/// A host without full-screen support. Presentation runs windowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFullscreen;

impl FullscreenHost for NoFullscreen {
    fn request_fullscreen(&mut self) -> CoreResult<()> {
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> CoreResult<()> {
        Ok(())
    }
}

/// Presentation mode state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresentationSession {
    active: bool,
    fullscreen: bool,
    scale: f32,
    viewport: Size,
}

impl Default for PresentationSession {
    fn default() -> Self {
        Self {
            active: false,
            fullscreen: false,
            scale: 1.0,
            viewport: Size::default(),
        }
    }
}

impl PresentationSession {
    /// Create an inactive session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uniform scale that fits `canvas` inside `viewport`.
    ///
    /// Falls back to 1 when the ratio is non-finite or not positive.
    #[must_use]
    pub fn compute_scale(viewport: Size, canvas: Size) -> f32 {
        let scale = (viewport.width / canvas.width).min(viewport.height / canvas.height);
        if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        }
    }

    /// Start presenting. Full-screen failures are logged and ignored.
    pub fn enter(&mut self, host: &mut dyn FullscreenHost, viewport: Size, canvas: Size) {
        self.active = true;
        self.viewport = viewport;
        self.scale = Self::compute_scale(viewport, canvas);
        self.fullscreen = match host.request_fullscreen() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Full-screen request failed, presenting windowed: {e}");
                false
            }
        };
        tracing::info!("Presentation started at scale {:.3}", self.scale);
    }

    /// Recompute the scale after the window changed size.
    pub fn resize(&mut self, viewport: Size, canvas: Size) {
        if !self.active {
            return;
        }
        self.viewport = viewport;
        self.scale = Self::compute_scale(viewport, canvas);
        tracing::debug!("Presentation rescaled to {:.3}", self.scale);
    }

    /// Stop presenting and restore editing.
    pub fn exit(&mut self, host: &mut dyn FullscreenHost) {
        if !self.active {
            return;
        }
        if self.fullscreen {
            if let Err(e) = host.exit_fullscreen() {
                tracing::warn!("Full-screen exit failed: {e}");
            }
        }
        self.active = false;
        self.fullscreen = false;
        tracing::info!("Presentation ended");
    }

    /// Whether presentation mode is on.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the host actually went full-screen.
    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Current uniform scale.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Viewport size the scale was computed for.
    #[must_use]
    pub fn viewport(&self) -> Size {
        self.viewport
    }
}
