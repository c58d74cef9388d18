//! # Clipo Renderer
//!
//! Software rasterizer for Clipo slides, built on tiny-skia.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────┐   decode (async)   ┌──────────────┐
//! │ SceneSnapshot│ ─────────────────▶ │ DecodedImages│
//! └──────┬───────┘                    └──────┬───────┘
//!        │             draw_scene            │
//!        └──────────────┬────────────────────┘
//!                       ▼
//!              ┌─────────────────┐
//!              │  RasterSurface  │  (SkiaSurface, or a test double)
//!              └────────┬────────┘
//!                       ▼
//!                      PNG
//! ```
//!
//! The same draw pass backs both [`SceneExporter`] (1:1 PNG export) and
//! [`PresentationRenderer`] (letterboxed full-screen frames).

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod filter;
pub mod image;
pub mod presentation;
pub mod shapes;
pub mod skia;
pub mod surface;
pub mod text;

pub use error::{RenderError, RenderResult};
pub use export::{decode_images, draw_scene, DecodedImages, ExportConfig, SceneExporter};
pub use image::{decode_data_uri, decode_image, DecodedImage};
pub use presentation::PresentationRenderer;
pub use skia::SkiaSurface;
pub use surface::{
    FontSpec, Path2D, PathCommand, RasterSurface, StrokeStyle, SurfaceTransform, TextAnchor,
    TextRun,
};
pub use text::FontBook;
