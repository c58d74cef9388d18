//! Integration tests for scene export (clipo-renderer).
//!
//! Draw-order checks run against a recording surface; end-to-end checks go
//! through the tiny-skia surface and PNG encoding.

use std::sync::Arc;

use clipo_core::{
    Border, BorderStyle, Color, Entity, EntityId, EntityKind, FilterStack, ImageData, Point, Rect,
    Scene, SceneSnapshot, ShapeKind, ShapeStyle, Size, TextAlign, TextStyle,
};
use clipo_renderer::{
    decode_images, draw_scene, DecodedImage, DecodedImages, ExportConfig, FontBook, Path2D,
    RasterSurface, RenderResult, SceneExporter, SkiaSurface, StrokeStyle, SurfaceTransform,
    TextAnchor, TextRun,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Transform,
    Fill(Color),
    Stroke(Option<[f32; 2]>),
    Clip,
    ResetClip,
    Filter(FilterStack),
    Opacity(f32),
    ResetEffects,
    Image(Rect),
    Text(String, Point, TextAnchor),
}

#[derive(Default)]
struct RecordingSurface {
    calls: Vec<Call>,
}

impl RasterSurface for RecordingSurface {
    fn width(&self) -> u32 {
        0
    }
    fn height(&self) -> u32 {
        0
    }
    fn set_transform(&mut self, _: SurfaceTransform) {
        self.calls.push(Call::Transform);
    }
    fn fill_path(&mut self, _: &Path2D, color: Color) {
        self.calls.push(Call::Fill(color));
    }
    fn stroke_path(&mut self, _: &Path2D, stroke: &StrokeStyle) {
        self.calls.push(Call::Stroke(stroke.dash));
    }
    fn clip_path(&mut self, _: &Path2D) {
        self.calls.push(Call::Clip);
    }
    fn reset_clip(&mut self) {
        self.calls.push(Call::ResetClip);
    }
    fn set_filter(&mut self, filters: &FilterStack) {
        self.calls.push(Call::Filter(*filters));
    }
    fn set_opacity(&mut self, opacity: f32) {
        self.calls.push(Call::Opacity(opacity));
    }
    fn reset_effects(&mut self) {
        self.calls.push(Call::ResetEffects);
    }
    fn draw_image(&mut self, _: &DecodedImage, dest: Rect) {
        self.calls.push(Call::Image(dest));
    }
    fn draw_text(&mut self, run: &TextRun) {
        self.calls
            .push(Call::Text(run.text.clone(), run.anchor, run.align));
    }
    fn encode_png(&self) -> RenderResult<Vec<u8>> {
        Ok(Vec::new())
    }
}

fn add(scene: &mut Scene, kind: EntityKind, rect: Rect) -> EntityId {
    let id = scene.next_id();
    assert!(scene.insert(Entity::new(id, kind, rect)));
    id
}

fn record(snapshot: &SceneSnapshot, images: &DecodedImages) -> Vec<Call> {
    let mut surface = RecordingSurface::default();
    draw_scene(&mut surface, snapshot, images);
    surface.calls
}

/// Calls after the white and colored background fills.
fn entity_calls(calls: &[Call]) -> &[Call] {
    &calls[2..]
}

fn png_bytes(width: u32, height: u32, color: Color) -> Vec<u8> {
    let mut surface = SkiaSurface::new(width, height, Arc::new(FontBook::new())).unwrap();
    surface.fill_path(
        &Path2D::rect(&Rect::new(0.0, 0.0, width as f32, height as f32)),
        color,
    );
    surface.encode_png().unwrap()
}

#[test]
fn test_background_blends_over_white() {
    let mut scene = Scene::new();
    scene.set_background(Color::rgb(255, 0, 0), 50.0);
    let calls = record(&scene.snapshot(Size::new(100.0, 100.0)), &DecodedImages::new());
    assert_eq!(
        calls,
        vec![Call::Fill(Color::WHITE), Call::Fill(Color::rgba(255, 0, 0, 128))]
    );

    scene.set_background(Color::rgb(0, 0, 255), 0.0);
    let calls = record(&scene.snapshot(Size::new(100.0, 100.0)), &DecodedImages::new());
    assert_eq!(calls, vec![Call::Fill(Color::WHITE)]);
}

#[test]
fn test_image_pipeline_order() {
    let mut scene = Scene::new();
    scene.set_background(Color::WHITE, 100.0);
    let mut image = ImageData::new(Vec::new(), Size::new(400.0, 200.0), 0.5);
    image.crop.offset_x = -15.0;
    image.opacity = 50.0;
    image.filters.sepia = 40.0;
    image.border = Border {
        width: 2.0,
        color: Color::BLACK,
        style: BorderStyle::Dashed,
    };
    let id = add(&mut scene, EntityKind::Image(image), Rect::new(10.0, 20.0, 180.0, 100.0));

    let mut images = DecodedImages::new();
    images.insert(id, Arc::new(DecodedImage::solid(4, 2, [0, 255, 0, 255])));
    let calls = record(&scene.snapshot(Size::new(300.0, 300.0)), &images);

    assert_eq!(
        entity_calls(&calls),
        &[
            Call::Clip,
            Call::Filter(FilterStack {
                sepia: 40.0,
                ..FilterStack::default()
            }),
            Call::Opacity(0.5),
            Call::Image(Rect::new(-5.0, 20.0, 200.0, 100.0)),
            Call::Stroke(Some([6.0, 4.0])),
            Call::ResetClip,
            Call::ResetEffects,
        ]
    );
}

#[test]
fn test_image_border_stays_inside_clip() {
    let mut scene = Scene::new();
    let mut image = ImageData::new(Vec::new(), Size::new(20.0, 20.0), 1.0);
    image.border = Border {
        width: 4.0,
        color: Color::rgb(255, 0, 0),
        style: BorderStyle::Solid,
    };
    let id = add(&mut scene, EntityKind::Image(image), Rect::new(10.0, 10.0, 20.0, 20.0));
    let mut images = DecodedImages::new();
    images.insert(id, Arc::new(DecodedImage::solid(20, 20, [0, 255, 0, 255])));

    let surface = SceneExporter::with_defaults()
        .render(&scene.snapshot(Size::new(40.0, 40.0)), &images)
        .unwrap();
    // Inner half of the 4px border at x = 10..12, nothing outside the box.
    assert_eq!(surface.pixel(11, 20), Some([255, 0, 0, 255]));
    assert_eq!(surface.pixel(9, 20), Some([255, 255, 255, 255]));
    assert_eq!(surface.pixel(20, 20), Some([0, 255, 0, 255]));
}

#[test]
fn test_undecoded_image_is_skipped() {
    let mut scene = Scene::new();
    add(
        &mut scene,
        EntityKind::Image(ImageData::new(b"junk".to_vec(), Size::new(10.0, 10.0), 1.0)),
        Rect::new(0.0, 0.0, 10.0, 10.0),
    );
    add(
        &mut scene,
        EntityKind::Shape(ShapeStyle::new(ShapeKind::Circle)),
        Rect::new(0.0, 0.0, 10.0, 10.0),
    );

    let calls = record(&scene.snapshot(Size::new(50.0, 50.0)), &DecodedImages::new());
    assert_eq!(
        entity_calls(&calls),
        &[Call::Fill(ShapeStyle::new(ShapeKind::Circle).fill)]
    );
}

#[test]
fn test_text_lines_are_centered_and_inset() {
    let mut scene = Scene::new();
    let style = TextStyle {
        content: "one\ntwo".to_string(),
        font_size: 10.0,
        align: TextAlign::Left,
        background: Some(Color::rgb(250, 250, 0)),
        border: Border {
            width: 1.0,
            color: Color::BLACK,
            style: BorderStyle::Solid,
        },
        ..TextStyle::default()
    };
    add(&mut scene, EntityKind::Text(style), Rect::new(0.0, 0.0, 200.0, 100.0));

    let calls = record(&scene.snapshot(Size::new(200.0, 100.0)), &DecodedImages::new());
    assert_eq!(
        entity_calls(&calls),
        &[
            Call::Fill(Color::rgb(250, 250, 0)),
            Call::Stroke(None),
            Call::Text("one".to_string(), Point::new(8.0, 44.0), TextAnchor::Start),
            Call::Text("two".to_string(), Point::new(8.0, 56.0), TextAnchor::Start),
        ]
    );
}

#[test]
fn test_right_aligned_text_without_decoration() {
    let mut scene = Scene::new();
    let style = TextStyle {
        content: "hi".to_string(),
        font_size: 10.0,
        align: TextAlign::Right,
        background: Some(Color::TRANSPARENT),
        ..TextStyle::default()
    };
    add(&mut scene, EntityKind::Text(style), Rect::new(10.0, 10.0, 100.0, 40.0));

    let calls = record(&scene.snapshot(Size::new(200.0, 100.0)), &DecodedImages::new());
    assert_eq!(
        entity_calls(&calls),
        &[Call::Text("hi".to_string(), Point::new(102.0, 30.0), TextAnchor::End)]
    );
}

#[test]
fn test_shapes_stroke_only_with_border() {
    let mut scene = Scene::new();
    let mut bordered = ShapeStyle::new(ShapeKind::Triangle);
    bordered.fill = Color::rgb(1, 2, 3);
    bordered.border = Border {
        width: 3.0,
        color: Color::BLACK,
        style: BorderStyle::Solid,
    };
    add(&mut scene, EntityKind::Shape(bordered), Rect::new(0.0, 0.0, 50.0, 50.0));
    let mut plain = ShapeStyle::new(ShapeKind::Arrow);
    plain.fill = Color::rgb(4, 5, 6);
    add(&mut scene, EntityKind::Shape(plain), Rect::new(0.0, 0.0, 50.0, 50.0));

    let calls = record(&scene.snapshot(Size::new(100.0, 100.0)), &DecodedImages::new());
    assert_eq!(
        entity_calls(&calls),
        &[
            Call::Fill(Color::rgb(1, 2, 3)),
            Call::Stroke(None),
            Call::Fill(Color::rgb(4, 5, 6)),
        ]
    );
}

#[test]
fn test_render_matches_content_size_and_paints_shapes() {
    let mut scene = Scene::new();
    let mut square = ShapeStyle::new(ShapeKind::Square);
    square.fill = Color::rgb(255, 0, 0);
    add(&mut scene, EntityKind::Shape(square), Rect::new(10.0, 10.0, 20.0, 20.0));

    let exporter = SceneExporter::with_defaults();
    let surface = exporter
        .render(&scene.snapshot(Size::new(120.0, 90.0)), &DecodedImages::new())
        .unwrap();

    assert_eq!((surface.width(), surface.height()), (120, 90));
    assert_eq!(surface.pixel(20, 20), Some([255, 0, 0, 255]));
    assert_eq!(surface.pixel(100, 70), Some([255, 255, 255, 255]));
}

#[test]
fn test_export_config_overrides() {
    let mut scene = Scene::new();
    scene.set_background(Color::rgb(0, 0, 0), 100.0);
    let config = ExportConfig {
        size: Some((40, 30)),
        background: Some(clipo_core::Background {
            color: Color::rgb(0, 0, 255),
            opacity: 100.0,
        }),
        ..ExportConfig::default()
    };
    let exporter = SceneExporter::new(config, Arc::new(FontBook::new()));
    let surface = exporter
        .render(&scene.snapshot(Size::new(40.0, 30.0)), &DecodedImages::new())
        .unwrap();
    assert_eq!(surface.width(), 40);
    assert_eq!(surface.pixel(5, 5), Some([0, 0, 255, 255]));
}

#[test]
fn test_size_override_scales_slide_and_fills_background() {
    let mut scene = Scene::new();
    scene.set_background(Color::rgb(0, 0, 255), 100.0);
    let mut square = ShapeStyle::new(ShapeKind::Square);
    square.fill = Color::rgb(255, 0, 0);
    add(&mut scene, EntityKind::Shape(square), Rect::new(20.0, 15.0, 10.0, 10.0));
    let snapshot = scene.snapshot(Size::new(40.0, 30.0));

    let doubled = SceneExporter::new(
        ExportConfig {
            size: Some((80, 60)),
            ..ExportConfig::default()
        },
        Arc::new(FontBook::new()),
    )
    .render(&snapshot, &DecodedImages::new())
    .unwrap();
    assert_eq!((doubled.width(), doubled.height()), (80, 60));
    assert_eq!(doubled.pixel(5, 5), Some([0, 0, 255, 255]));
    assert_eq!(doubled.pixel(78, 58), Some([0, 0, 255, 255]));
    // Square spans 40..60 x 30..50 at scale 2.
    assert_eq!(doubled.pixel(50, 40), Some([255, 0, 0, 255]));
    assert_eq!(doubled.pixel(35, 25), Some([0, 0, 255, 255]));

    // Wider than the slide: scale 1, slide centered, background in the margins.
    let wide = SceneExporter::new(
        ExportConfig {
            size: Some((100, 30)),
            ..ExportConfig::default()
        },
        Arc::new(FontBook::new()),
    )
    .render(&snapshot, &DecodedImages::new())
    .unwrap();
    assert_eq!(wide.pixel(2, 15), Some([0, 0, 255, 255]));
    assert_eq!(wide.pixel(97, 15), Some([0, 0, 255, 255]));
    assert_eq!(wide.pixel(55, 20), Some([255, 0, 0, 255]));
}

#[test]
fn test_degenerate_content_size_is_an_error() {
    let exporter = SceneExporter::with_defaults();
    let snapshot = Scene::new().snapshot(Size::new(0.0, 10.0));
    let result = exporter.render(&snapshot, &DecodedImages::new());
    assert!(result.is_err());
}

#[tokio::test]
async fn test_decode_failure_does_not_block_others() {
    let mut scene = Scene::new();
    let good = add(
        &mut scene,
        EntityKind::Image(ImageData::new(
            png_bytes(4, 4, Color::rgb(0, 255, 0)),
            Size::new(4.0, 4.0),
            1.0,
        )),
        Rect::new(0.0, 0.0, 4.0, 4.0),
    );
    let bad = add(
        &mut scene,
        EntityKind::Image(ImageData::new(b"not an image".to_vec(), Size::new(4.0, 4.0), 1.0)),
        Rect::new(4.0, 0.0, 4.0, 4.0),
    );

    let images = decode_images(&scene.snapshot(Size::new(10.0, 10.0))).await;
    assert!(images.contains_key(&good));
    assert!(!images.contains_key(&bad));
    assert_eq!(images[&good].width, 4);
}

#[tokio::test]
async fn test_export_png_end_to_end() {
    let mut scene = Scene::new();
    add(
        &mut scene,
        EntityKind::Image(ImageData::new(
            png_bytes(8, 8, Color::rgb(0, 0, 255)),
            Size::new(8.0, 8.0),
            4.0,
        )),
        Rect::new(20.0, 20.0, 32.0, 32.0),
    );
    add(
        &mut scene,
        EntityKind::Image(ImageData::new(b"corrupt".to_vec(), Size::new(8.0, 8.0), 1.0)),
        Rect::new(60.0, 20.0, 8.0, 8.0),
    );
    add(
        &mut scene,
        EntityKind::Text(TextStyle::default()),
        Rect::new(0.0, 60.0, 120.0, 30.0),
    );

    let exporter = SceneExporter::with_defaults();
    let png = exporter
        .export_png(&scene.snapshot(Size::new(120.0, 90.0)))
        .await
        .expect("export succeeds despite a corrupt image");

    assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
    let decoded = clipo_renderer::decode_image(&png).unwrap();
    assert_eq!((decoded.width, decoded.height), (120, 90));
    let center: usize = (36 * 120 + 36) * 4;
    assert_eq!(&decoded.data[center..center + 4], &[0, 0, 255, 255]);
}
