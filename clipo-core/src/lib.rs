//! # Clipo Core
//!
//! Editing logic for the Clipo slide editor: the scene model and everything
//! that mutates it in response to pointer and keyboard input.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 clipo-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Scene Model     │  Interaction Controller  │
//! │  - Entities      │  - Move / resize         │
//! │  - Paint order   │  - Marquee selection     │
//! │  - Copy-on-write │  - Duplicate on drag     │
//! ├─────────────────────────────────────────────┤
//! │  Geometry        │  Viewport / Guides       │
//! │  - Anchored      │  - Zoom clamp + round    │
//! │    resize        │  - Screen <-> scene      │
//! │  - Crop clamp    │  - Center alignment      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Everything here is synchronous and single-threaded. Rendering lives in
//! `clipo-renderer`, which consumes [`SceneSnapshot`]s.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod element;
pub mod error;
pub mod event;
pub mod geometry;
pub mod guides;
pub mod interaction;
pub mod presentation;
pub mod scene;
pub mod state;
pub mod style;
pub mod viewport;

pub use config::EditorConfig;
pub use element::{Entity, EntityId, EntityKind, EntityPatch, IdGenerator, ImageData};
pub use error::{CoreError, CoreResult};
pub use event::{InputEvent, InputSource, Key, Modifiers, ScriptedInput};
pub use geometry::{Handle, Point, Rect, Size, MIN_SIZE};
pub use guides::GuideLines;
pub use interaction::{Interaction, InteractionController, Selection};
pub use presentation::{FullscreenHost, NoFullscreen, PresentationSession};
pub use scene::{Background, Scene, SceneSnapshot};
pub use state::{EditorState, StatusBar, Tool};
pub use style::{
    Border, BorderStyle, Color, CropTransform, FilterStack, FontStyle, FontWeight, ShapeKind,
    ShapeStyle, StylePatch, TextAlign, TextStyle,
};
pub use viewport::Viewport;

/// Clipo core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
