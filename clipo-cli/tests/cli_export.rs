//! End-to-end tests for the CLI jobs, writing into temporary directories.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clipo_cli::{compose, run_export, run_present, CliError, SlideJob};
use clipo_core::{Color, EntityKind, ShapeKind};
use clipo_renderer::{decode_image, FontBook, Path2D, RasterSurface, RenderError, SkiaSurface};

fn job(dir: &Path) -> SlideJob {
    SlideJob {
        texts: Vec::new(),
        images: Vec::new(),
        shapes: Vec::new(),
        background: Color::WHITE,
        background_opacity: 100.0,
        font: None,
        config: None,
        out: dir.join("presentation.png"),
    }
}

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let mut surface = SkiaSurface::new(width, height, Arc::new(FontBook::new())).unwrap();
    surface.fill_path(
        &Path2D::rect(&clipo_core::Rect::new(0.0, 0.0, width as f32, height as f32)),
        Color::rgb(0, 128, 0),
    );
    let path = dir.join(name);
    std::fs::write(&path, surface.encode_png().unwrap()).unwrap();
    path
}

fn write_config(dir: &Path, width: u32, height: u32) -> PathBuf {
    let path = dir.join("editor.json");
    std::fs::write(
        &path,
        format!(r#"{{"content_size": {{"width": {width}, "height": {height}}}}}"#),
    )
    .unwrap();
    path
}

#[test]
fn test_compose_adds_entities_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut job = job(dir.path());
    job.texts = vec!["Title".to_string(), "line one\\nline two".to_string()];
    job.images = vec![write_png(dir.path(), "logo.png", 40, 20)];
    job.shapes = vec![ShapeKind::Star];

    let editor = compose(&job).unwrap();
    let entities = editor.entities();
    assert_eq!(entities.len(), 4);
    match &entities[1].kind {
        EntityKind::Text(text) => assert_eq!(text.content, "line one\nline two"),
        other => panic!("expected text, got {other:?}"),
    }
    match &entities[2].kind {
        EntityKind::Image(image) => assert_eq!(image.natural.width, 40.0),
        other => panic!("expected image, got {other:?}"),
    }
    assert!(matches!(entities[3].kind, EntityKind::Shape(_)));
    assert_eq!(editor.status().entity_count, 4);
}

#[tokio::test]
async fn test_export_writes_png_of_content_size() {
    let dir = tempfile::tempdir().unwrap();
    let mut job = job(dir.path());
    job.config = Some(write_config(dir.path(), 200, 100));
    job.background = Color::rgb(255, 0, 0);
    job.texts = vec!["Hello".to_string()];
    job.shapes = vec![ShapeKind::Circle];

    let written = run_export(&job).await.unwrap();
    assert_eq!(written, job.out);

    let png = decode_image(&std::fs::read(&written).unwrap()).unwrap();
    assert_eq!((png.width, png.height), (200, 100));
    assert_eq!(&png.data[..4], &[255, 0, 0, 255]);
}

#[tokio::test]
async fn test_present_writes_letterboxed_frame() {
    let dir = tempfile::tempdir().unwrap();
    let mut job = job(dir.path());
    job.config = Some(write_config(dir.path(), 100, 100));
    job.out = dir.path().join("frame.png");

    run_present(&job, (400, 100)).await.unwrap();

    let frame = decode_image(&std::fs::read(&job.out).unwrap()).unwrap();
    assert_eq!((frame.width, frame.height), (400, 100));
    // Left edge is letterbox, the middle is the white slide.
    assert_eq!(&frame.data[..4], &[0, 0, 0, 255]);
    let middle = (50 * 400 + 200) * 4;
    assert_eq!(&frame.data[middle..middle + 4], &[255, 255, 255, 255]);
}

#[tokio::test]
async fn test_missing_image_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut job = job(dir.path());
    job.images = vec![dir.path().join("nope.png")];

    let err = run_export(&job).await.unwrap_err();
    assert!(matches!(err, CliError::Io { .. }), "{err}");
    assert!(!job.out.exists());
}

#[test]
fn test_invalid_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, "{ not json").unwrap();
    let mut job = job(dir.path());
    job.config = Some(path);

    assert!(matches!(compose(&job), Err(CliError::Config { .. })));
}

#[tokio::test]
async fn test_invalid_font_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let font = dir.path().join("font.ttf");
    std::fs::write(&font, b"not a font").unwrap();
    let mut job = job(dir.path());
    job.font = Some(font);

    let err = run_export(&job).await.unwrap_err();
    assert!(matches!(err, CliError::Render(RenderError::Font(_))), "{err}");
}
