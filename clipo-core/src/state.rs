//! Editor state: the scene plus everything that reacts to user input.

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::element::{Entity, EntityId, EntityKind, EntityPatch, ImageData};
use crate::event::{InputEvent, InputSource, Key, Modifiers};
use crate::geometry::{fit_scale, Point, Rect, Size};
use crate::guides::GuideLines;
use crate::interaction::{Interaction, InteractionContext, InteractionController, Selection};
use crate::presentation::{FullscreenHost, NoFullscreen, PresentationSession};
use crate::scene::{Scene, SceneSnapshot};
use crate::style::{Color, CropTransform, ShapeKind, ShapeStyle, StylePatch, TextStyle};
use crate::viewport::Viewport;

/// Active creation tool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", content = "shape", rename_all = "lowercase")]
pub enum Tool {
    /// Select and manipulate entities.
    #[default]
    Select,
    /// Click to place a text box.
    Text,
    /// Click to place a shape.
    Shape(ShapeKind),
}

/// Values shown in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBar {
    /// Zoom as a whole percentage.
    pub zoom_percent: i32,
    /// Content area width in pixels.
    pub canvas_width: u32,
    /// Content area height in pixels.
    pub canvas_height: u32,
    /// Number of entities on the slide.
    pub entity_count: usize,
    /// One-based slide index.
    pub slide: usize,
    /// Number of slides.
    pub slide_count: usize,
}

impl std::fmt::Display for StatusBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Slide {} of {} | {} x {} | {} elements | {}%",
            self.slide,
            self.slide_count,
            self.canvas_width,
            self.canvas_height,
            self.entity_count,
            self.zoom_percent
        )
    }
}

/// The whole editor.
pub struct EditorState {
    config: EditorConfig,
    scene: Scene,
    selection: Selection,
    viewport: Viewport,
    controller: InteractionController,
    tool: Tool,
    editing_text: Option<EntityId>,
    presentation: PresentationSession,
    fullscreen: Box<dyn FullscreenHost>,
    window: Size,
    layers_panel_open: bool,
    overlay_open: bool,
}

impl std::fmt::Debug for EditorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorState")
            .field("entities", &self.scene.len())
            .field("selection", &self.selection)
            .field("zoom", &self.viewport.zoom())
            .field("interaction", &self.controller.state())
            .field("tool", &self.tool)
            .field("editing_text", &self.editing_text)
            .field("presenting", &self.presentation.is_active())
            .finish_non_exhaustive()
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorState {
    /// Create an empty editor.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let viewport = Viewport::new(&config);
        let scene = Scene::new().with_min_size(config.min_entity_size);
        Self {
            window: config.content_size,
            config,
            scene,
            selection: Selection::None,
            viewport,
            controller: InteractionController::new(),
            tool: Tool::Select,
            editing_text: None,
            presentation: PresentationSession::new(),
            fullscreen: Box::new(NoFullscreen),
            layers_panel_open: false,
            overlay_open: false,
        }
    }

    /// Use a host that can go full-screen.
    #[must_use]
    pub fn with_fullscreen_host(mut self, host: Box<dyn FullscreenHost>) -> Self {
        self.fullscreen = host;
        self
    }

    // --- Adding entities ---

    /// Add a default text box centered in the content area and select it.
    pub fn add_text(&mut self) -> EntityId {
        let rect = Rect::centered_in(self.config.content_size, Size::new(200.0, 60.0));
        self.add_entity(EntityKind::Text(TextStyle::default()), rect)
    }

    /// Add a text box with the given content.
    pub fn add_text_with(&mut self, content: impl Into<String>) -> EntityId {
        let id = self.add_text();
        self.scene.update(
            id,
            EntityPatch::Style(StylePatch::Content(content.into())),
        );
        id
    }

    /// Add a default shape centered in the content area and select it.
    pub fn add_shape(&mut self, kind: ShapeKind) -> EntityId {
        let rect = Rect::centered_in(self.config.content_size, kind.default_size());
        self.add_entity(EntityKind::Shape(ShapeStyle::new(kind)), rect)
    }

    /// Add an image scaled to fit the content area, centered, and select it.
    ///
    /// `natural` is the decoded pixel size reported by the file picker.
    pub fn add_image(&mut self, source: Vec<u8>, natural: Size) -> EntityId {
        let content = self.config.content_size;
        let fraction = self.config.image_fit_fraction;
        let bounds = Size::new(content.width * fraction, content.height * fraction);
        let scale = fit_scale(natural, bounds);
        let size = Size::new(natural.width * scale, natural.height * scale);
        let rect = Rect::centered_in(content, size);
        self.add_entity(EntityKind::Image(ImageData::new(source, natural, scale)), rect)
    }

    fn add_entity(&mut self, kind: EntityKind, rect: Rect) -> EntityId {
        let id = self.scene.next_id();
        let name = self.scene.next_name(&kind);
        tracing::info!("Adding {name}");
        self.scene.insert(Entity::new(id, kind, rect).with_name(name));
        self.selection = Selection::Single(id);
        id
    }

    fn place_with_tool(&mut self, tool: Tool, screen: Point) {
        let at = self.viewport.screen_to_scene(screen);
        let (kind, size) = match tool {
            Tool::Select => return,
            Tool::Text => (EntityKind::Text(TextStyle::default()), Size::new(200.0, 60.0)),
            Tool::Shape(kind) => (EntityKind::Shape(ShapeStyle::new(kind)), kind.default_size()),
        };
        let rect = Rect::new(
            at.x - size.width / 2.0,
            at.y - size.height / 2.0,
            size.width,
            size.height,
        );
        self.add_entity(kind, rect);
        self.tool = Tool::Select;
    }

    // --- Editing ---

    /// Delete every selected, unlocked entity. Returns how many were removed.
    ///
    /// Does nothing while a text box is being edited.
    pub fn delete_selection(&mut self) -> usize {
        if self.editing_text.is_some() {
            return 0;
        }
        let mut kept = Vec::new();
        let mut removed = 0;
        for id in self.selection.ids() {
            if self.scene.remove(id).is_some() {
                removed += 1;
            } else if self.scene.contains(id) {
                kept.push(id);
            }
        }
        if removed > 0 {
            tracing::info!("Deleted {removed} entities");
        }
        self.selection = Selection::from_ids(kept).normalized();
        removed
    }

    /// Start editing a text entity's content.
    pub fn begin_text_edit(&mut self, id: EntityId) -> bool {
        let is_text = self
            .scene
            .get(id)
            .is_some_and(|e| matches!(e.kind, EntityKind::Text(_)));
        if is_text {
            self.editing_text = Some(id);
            self.selection = Selection::Single(id);
        }
        is_text
    }

    /// Stop editing text.
    pub fn end_text_edit(&mut self) {
        self.editing_text = None;
    }

    /// Apply a style edit. Allowed on locked entities.
    pub fn apply_style(&mut self, id: EntityId, patch: StylePatch) -> bool {
        self.scene.update(id, EntityPatch::Style(patch))
    }

    /// Lock or unlock an entity.
    pub fn set_locked(&mut self, id: EntityId, locked: bool) -> bool {
        self.scene.update(id, EntityPatch::Locked(locked))
    }

    /// Rename an entity.
    pub fn rename(&mut self, id: EntityId, name: impl Into<String>) -> bool {
        self.scene.update(id, EntityPatch::Name(name.into()))
    }

    /// Move `id` just below `before`, or to the top when `before` is `None`.
    pub fn reorder(&mut self, id: EntityId, before: Option<EntityId>) -> bool {
        self.scene.reorder(id, before)
    }

    /// Paint `id` above everything else.
    pub fn bring_to_front(&mut self, id: EntityId) -> bool {
        self.scene.bring_to_front(id)
    }

    /// Paint `id` below everything else.
    pub fn send_to_back(&mut self, id: EntityId) -> bool {
        self.scene.send_to_back(id)
    }

    /// Change an image's crop.
    pub fn crop_image(&mut self, id: EntityId, crop: CropTransform) -> bool {
        self.scene.crop_image(id, crop)
    }

    /// Set the slide background.
    pub fn set_background(&mut self, color: Color, opacity: f32) {
        self.scene.set_background(color, opacity);
    }

    /// Switch tools.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Open or close the external overlay (menus, pickers).
    pub fn set_overlay_open(&mut self, open: bool) {
        self.overlay_open = open;
    }

    /// Tell the editor where the canvas frame sits on screen.
    pub fn set_canvas_offset(&mut self, offset: Point) {
        self.viewport.set_canvas_offset(offset);
    }

    /// Mutable scene access for layer operations.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Mutable viewport access for the zoom slider.
    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    // --- Presentation ---

    /// Enter presentation mode for the current window size.
    pub fn enter_presentation(&mut self) {
        self.controller.pointer_leave(&mut self.selection);
        self.presentation
            .enter(self.fullscreen.as_mut(), self.window, self.config.content_size);
    }

    /// Leave presentation mode.
    pub fn exit_presentation(&mut self) {
        self.presentation.exit(self.fullscreen.as_mut());
    }

    // --- Input ---

    /// Feed one input event.
    pub fn handle_event(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerDown { x, y, modifiers } => {
                if self.presentation.is_active() {
                    return;
                }
                if self.tool == Tool::Select {
                    self.with_controller(|c, ctx| c.pointer_down(ctx, Point::new(x, y), modifiers));
                } else {
                    self.place_with_tool(self.tool, Point::new(x, y));
                }
            }
            InputEvent::PointerMove { x, y, modifiers } => {
                self.with_controller(|c, ctx| c.pointer_move(ctx, Point::new(x, y), modifiers));
            }
            InputEvent::PointerUp { .. } => self.controller.pointer_up(&mut self.selection),
            InputEvent::PointerLeave => self.controller.pointer_leave(&mut self.selection),
            InputEvent::Wheel { delta_y, modifiers } => {
                if modifiers.command() && !self.presentation.is_active() {
                    self.viewport.apply_wheel(delta_y);
                }
            }
            InputEvent::KeyDown { ref key, modifiers } => self.handle_key(key, modifiers),
            InputEvent::Resize { width, height } => {
                self.window = Size::new(width, height);
                self.presentation.resize(self.window, self.config.content_size);
            }
        }
    }

    /// Drain an input source. Returns the number of events handled.
    pub fn pump(&mut self, source: &mut impl InputSource) -> usize {
        let mut count = 0;
        while let Some(event) = source.next_event() {
            self.handle_event(&event);
            count += 1;
        }
        count
    }

    fn handle_key(&mut self, key: &Key, modifiers: Modifiers) {
        if self.presentation.is_active() {
            if *key == Key::Escape {
                self.exit_presentation();
            }
            return;
        }

        match key {
            Key::Escape => {
                if self.editing_text.is_some() {
                    self.end_text_edit();
                } else {
                    self.overlay_open = false;
                }
            }
            Key::Delete => {
                self.delete_selection();
            }
            Key::Char(c) if modifiers.command() => match *c {
                '+' | '=' => self.viewport.zoom_in(),
                '-' => self.viewport.zoom_out(),
                '0' => self.viewport.reset_zoom(),
                _ => {}
            },
            Key::Char('1') if modifiers.alt => {
                self.layers_panel_open = !self.layers_panel_open;
                tracing::debug!("Layers panel open: {}", self.layers_panel_open);
            }
            Key::Char('v' | 'V') if self.editing_text.is_none() => {
                self.tool = Tool::Select;
                self.overlay_open = false;
            }
            Key::Char(_) => {}
        }
    }

    fn with_controller(
        &mut self,
        f: impl FnOnce(&mut InteractionController, &mut InteractionContext<'_>),
    ) {
        let mut ctx = InteractionContext {
            scene: &mut self.scene,
            selection: &mut self.selection,
            viewport: &self.viewport,
            config: &self.config,
            editing_text: self.editing_text,
        };
        f(&mut self.controller, &mut ctx);
    }

    // --- Outputs ---

    /// Editor constants.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Entities in paint order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        self.scene.entities()
    }

    /// Current selection.
    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selected ids.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<EntityId> {
        self.selection.ids()
    }

    /// Zoom and coordinate state.
    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// In-flight pointer action.
    #[must_use]
    pub fn interaction(&self) -> Interaction {
        self.controller.state()
    }

    /// Active alignment guides.
    #[must_use]
    pub fn guides(&self) -> &GuideLines {
        self.controller.guides()
    }

    /// Marquee rectangle in screen space while selecting.
    #[must_use]
    pub fn marquee_rect(&self) -> Option<Rect> {
        self.controller.marquee_rect()
    }

    /// Active tool.
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Text entity being edited.
    #[must_use]
    pub fn editing_text(&self) -> Option<EntityId> {
        self.editing_text
    }

    /// Presentation state.
    #[must_use]
    pub fn presentation(&self) -> &PresentationSession {
        &self.presentation
    }

    /// Whether the external layers panel should be shown.
    #[must_use]
    pub fn layers_panel_open(&self) -> bool {
        self.layers_panel_open
    }

    /// Whether an external overlay is open.
    #[must_use]
    pub fn overlay_open(&self) -> bool {
        self.overlay_open
    }

    /// Status bar values.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn status(&self) -> StatusBar {
        let content = self.config.content_size;
        StatusBar {
            zoom_percent: self.viewport.zoom_percent(),
            canvas_width: content.width.round().max(0.0) as u32,
            canvas_height: content.height.round().max(0.0) as u32,
            entity_count: self.scene.len(),
            slide: 1,
            slide_count: 1,
        }
    }

    /// Immutable snapshot for the renderer.
    #[must_use]
    pub fn snapshot(&self) -> SceneSnapshot {
        self.scene.snapshot(self.config.content_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::GeometryPatch;

    #[test]
    fn test_add_text_is_centered_and_selected() {
        let mut editor = EditorState::default();
        let id = editor.add_text();
        let entity = editor.scene().get(id).unwrap();
        assert_eq!(entity.geometry, Rect::new(400.0, 370.0, 200.0, 60.0));
        assert_eq!(entity.name.as_deref(), Some("text1"));
        assert_eq!(editor.selection(), &Selection::Single(id));
    }

    #[test]
    fn test_add_image_fits_content_area() {
        let mut editor = EditorState::default();
        let id = editor.add_image(vec![1, 2, 3], Size::new(2000.0, 1000.0));
        let entity = editor.scene().get(id).unwrap();
        // 0.8 * 1000 / 2000 = 0.4
        assert_eq!(entity.geometry, Rect::new(100.0, 200.0, 800.0, 400.0));
        assert!((entity.image().unwrap().crop.scale - 0.4).abs() < 1e-6);

        let small = editor.add_image(vec![1], Size::new(100.0, 50.0));
        let small = editor.scene().get(small).unwrap();
        assert!((small.image().unwrap().crop.scale - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_configured_min_size_reaches_scene() {
        let config = EditorConfig {
            min_entity_size: 45.0,
            ..EditorConfig::default()
        };
        let mut editor = EditorState::new(config);
        let id = editor.add_shape(ShapeKind::Square);
        editor.scene_mut().update(
            id,
            EntityPatch::Geometry(GeometryPatch {
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
                crop: None,
            }),
        );
        let g = editor.scene().get(id).unwrap().geometry;
        assert!((g.width - 45.0).abs() < f32::EPSILON);
        assert!((g.height - 45.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_layer_order() {
        let mut editor = EditorState::default();
        let a = editor.add_shape(ShapeKind::Circle);
        let b = editor.add_shape(ShapeKind::Star);
        let c = editor.add_text();
        let order = |e: &EditorState| e.entities().iter().map(|x| x.id).collect::<Vec<_>>();

        assert!(editor.send_to_back(c));
        assert_eq!(order(&editor), vec![c, a, b]);
        assert!(editor.bring_to_front(a));
        assert_eq!(order(&editor), vec![c, b, a]);
        assert!(editor.reorder(a, Some(b)));
        assert_eq!(order(&editor), vec![c, a, b]);
        assert!(!editor.send_to_back(c));
    }

    #[test]
    fn test_delete_skips_locked_and_text_editing() {
        let mut editor = EditorState::default();
        let text = editor.add_text();
        editor.begin_text_edit(text);
        assert_eq!(editor.delete_selection(), 0);
        editor.end_text_edit();

        editor.set_locked(text, true);
        editor.handle_event(&InputEvent::key(Key::Delete, Modifiers::NONE));
        assert_eq!(editor.scene().len(), 1);

        editor.set_locked(text, false);
        assert_eq!(editor.delete_selection(), 1);
        assert!(editor.scene().is_empty());
        assert!(editor.selection().is_empty());

        // Nothing selected.
        assert_eq!(editor.delete_selection(), 0);
    }

    #[test]
    fn test_keyboard_shortcuts() {
        let mut editor = EditorState::default();
        editor.handle_event(&InputEvent::key(Key::Char('='), Modifiers::CTRL));
        assert!((editor.viewport().zoom() - 1.1).abs() < 1e-6);
        editor.handle_event(&InputEvent::key(Key::Char('0'), Modifiers::CTRL));
        assert!((editor.viewport().zoom() - 1.0).abs() < f32::EPSILON);

        editor.handle_event(&InputEvent::key(Key::Char('1'), Modifiers::ALT));
        assert!(editor.layers_panel_open());

        editor.set_tool(Tool::Text);
        editor.set_overlay_open(true);
        editor.handle_event(&InputEvent::key(Key::Char('v'), Modifiers::NONE));
        assert_eq!(editor.tool(), Tool::Select);
        assert!(!editor.overlay_open());
    }

    #[test]
    fn test_tool_click_places_entity_then_selects() {
        let mut editor = EditorState::default();
        editor.set_tool(Tool::Shape(ShapeKind::Circle));
        // Screen (132, 132) is scene (100, 100) behind the 32px padding.
        editor.handle_event(&InputEvent::down(132.0, 132.0));
        assert_eq!(editor.scene().len(), 1);
        assert_eq!(
            editor.entities()[0].geometry,
            Rect::new(25.0, 25.0, 150.0, 150.0)
        );
        assert_eq!(editor.tool(), Tool::Select);
    }

    #[test]
    fn test_presentation_suppresses_shortcuts_except_escape() {
        let mut editor = EditorState::default();
        editor.handle_event(&InputEvent::Resize {
            width: 2000.0,
            height: 1600.0,
        });
        editor.enter_presentation();
        assert!((editor.presentation().scale() - 2.0).abs() < f32::EPSILON);

        editor.handle_event(&InputEvent::key(Key::Char('='), Modifiers::CTRL));
        assert!((editor.viewport().zoom() - 1.0).abs() < f32::EPSILON);

        editor.handle_event(&InputEvent::Resize {
            width: 500.0,
            height: 400.0,
        });
        assert!((editor.presentation().scale() - 0.5).abs() < f32::EPSILON);

        editor.handle_event(&InputEvent::key(Key::Escape, Modifiers::NONE));
        assert!(!editor.presentation().is_active());
    }

    #[test]
    fn test_status_bar() {
        let mut editor = EditorState::default();
        editor.add_shape(ShapeKind::Star);
        let status = editor.status();
        assert_eq!(status.zoom_percent, 100);
        assert_eq!((status.canvas_width, status.canvas_height), (1000, 800));
        assert_eq!(status.to_string(), "Slide 1 of 1 | 1000 x 800 | 1 elements | 100%");
    }
}
