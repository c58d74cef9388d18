//! # Clipo CLI
//!
//! Composes a single slide from command-line actions and writes it out as a
//! PNG, either 1:1 (`export`) or as a letterboxed presentation frame
//! (`present`).
//!
//! ## Usage
//!
//! ```bash
//! clipo export --text "Quarterly review" --shape arrow --image logo.png \
//!     --background "#1e293b" --background-opacity 80 --out slide.png
//! clipo present --viewport 1920x1080 --text "Hello" --out frame.png
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use clipo_core::{
    Color, EditorConfig, EditorState, FontStyle, FontWeight, InputEvent, ShapeKind, Size,
    TextStyle,
};
use clipo_renderer::{
    decode_image, ExportConfig, FontBook, PresentationRenderer, RenderError, SceneExporter,
};
use thiserror::Error;

/// Errors surfaced to the command line.
#[derive(Debug, Error)]
pub enum CliError {
    /// A file could not be read or written.
    #[error("{path}: {source}")]
    Io {
        /// The file involved.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The editor configuration file is not valid JSON.
    #[error("invalid editor config {path}: {source}")]
    Config {
        /// The config file.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// Rendering, decoding or font loading failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Command-line arguments for clipo.
#[derive(Debug, Clone, Parser)]
#[command(name = "clipo")]
#[command(about = "Compose a slide and export it as PNG")]
#[command(version)]
pub struct CliArgs {
    /// What to do.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Render the slide at its content size.
    Export(SlideArgs),
    /// Render a full-screen presentation frame.
    Present {
        /// Slide contents.
        #[command(flatten)]
        slide: SlideArgs,
        /// Window size as WIDTHxHEIGHT.
        #[arg(long, value_parser = parse_size, default_value = "1920x1080")]
        viewport: (u32, u32),
    },
}

/// Slide contents and output options shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub struct SlideArgs {
    /// Add a text box (repeatable; `\n` separates lines).
    #[arg(long = "text")]
    pub texts: Vec<String>,

    /// Add an image from a file (repeatable).
    #[arg(long = "image")]
    pub images: Vec<PathBuf>,

    /// Add a shape: rectangle, square, circle, triangle, diamond, star,
    /// arrow, line, pentagon or hexagon (repeatable).
    #[arg(long = "shape", value_parser = parse_shape)]
    pub shapes: Vec<ShapeKind>,

    /// Background color as hex.
    #[arg(long, default_value = "#ffffff")]
    pub background: String,

    /// Background opacity percent.
    #[arg(long, default_value = "100")]
    pub background_opacity: f32,

    /// TrueType/OpenType font used for all text.
    #[arg(long, env = "CLIPO_FONT")]
    pub font: Option<PathBuf>,

    /// Editor configuration as JSON (content size, thresholds).
    #[arg(long, env = "CLIPO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output file.
    #[arg(long, default_value = "presentation.png")]
    pub out: PathBuf,
}

fn parse_shape(s: &str) -> Result<ShapeKind, String> {
    s.parse().map_err(|e: clipo_core::CoreError| e.to_string())
}

/// Parse `WIDTHxHEIGHT`.
///
/// # Errors
///
/// Returns a message if either side is missing, non-numeric or zero.
pub fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w: u32 = w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let h: u32 = h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    if w == 0 || h == 0 {
        return Err(format!("size must be non-zero, got {w}x{h}"));
    }
    Ok((w, h))
}

/// A slide job resolved from arguments.
#[derive(Debug, Clone)]
pub struct SlideJob {
    /// Text boxes in insertion order.
    pub texts: Vec<String>,
    /// Image files in insertion order, added after texts.
    pub images: Vec<PathBuf>,
    /// Shapes in insertion order, added last.
    pub shapes: Vec<ShapeKind>,
    /// Background color.
    pub background: Color,
    /// Background opacity percent.
    pub background_opacity: f32,
    /// Optional font file.
    pub font: Option<PathBuf>,
    /// Optional editor config file.
    pub config: Option<PathBuf>,
    /// Output path.
    pub out: PathBuf,
}

impl From<SlideArgs> for SlideJob {
    fn from(args: SlideArgs) -> Self {
        Self {
            texts: args.texts,
            images: args.images,
            shapes: args.shapes,
            background: Color::parse_or(&args.background, Color::WHITE),
            background_opacity: args.background_opacity,
            font: args.font,
            config: args.config,
            out: args.out,
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the editor configuration, or the default when no file is given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<EditorConfig, CliError> {
    let Some(path) = path else {
        return Ok(EditorConfig::default());
    };
    serde_json::from_slice(&read(path)?).map_err(|source| CliError::Config {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the font book. Without a font file, text is laid out but not drawn.
///
/// # Errors
///
/// Returns an error if the font file cannot be read or parsed.
pub fn load_fonts(path: Option<&Path>) -> Result<FontBook, CliError> {
    let mut book = FontBook::new();
    match path {
        Some(path) => {
            let family = TextStyle::default().font_family;
            book.add_font(&family, FontWeight::Normal, FontStyle::Normal, read(path)?)?;
        }
        None => tracing::warn!("No font given (--font or CLIPO_FONT); text will not be drawn"),
    }
    Ok(book)
}

/// Create an editor and add every entity of the job.
///
/// # Errors
///
/// Returns an error if the config or an image file cannot be read, or an
/// image cannot be decoded.
pub fn compose(job: &SlideJob) -> Result<EditorState, CliError> {
    let mut editor = EditorState::new(load_config(job.config.as_deref())?);
    editor.set_background(job.background, job.background_opacity);

    for text in &job.texts {
        editor.add_text_with(text.replace("\\n", "\n"));
    }
    for path in &job.images {
        let bytes = read(path)?;
        let decoded = decode_image(&bytes)?;
        #[allow(clippy::cast_precision_loss)]
        let natural = Size::new(decoded.width as f32, decoded.height as f32);
        editor.add_image(bytes, natural);
    }
    for kind in &job.shapes {
        editor.add_shape(*kind);
    }

    tracing::info!("{}", editor.status());
    Ok(editor)
}

async fn write(path: &Path, bytes: &[u8]) -> Result<(), CliError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Compose the slide and write it at its content size.
///
/// # Errors
///
/// Returns an error if composing, rendering or writing fails.
pub async fn run_export(job: &SlideJob) -> Result<PathBuf, CliError> {
    let editor = compose(job)?;
    let fonts = Arc::new(load_fonts(job.font.as_deref())?);
    let filename = job.out.file_name().map_or_else(
        || ExportConfig::default().filename,
        |n| n.to_string_lossy().into_owned(),
    );
    let exporter = SceneExporter::new(
        ExportConfig {
            filename,
            ..ExportConfig::default()
        },
        fonts,
    );

    let png = exporter.export_png(&editor.snapshot()).await?;
    write(&job.out, &png).await?;
    Ok(job.out.clone())
}

/// Compose the slide, enter presentation mode for `viewport` and write one
/// frame.
///
/// # Errors
///
/// Returns an error if composing, rendering or writing fails.
#[allow(clippy::cast_precision_loss)]
pub async fn run_present(job: &SlideJob, viewport: (u32, u32)) -> Result<PathBuf, CliError> {
    let mut editor = compose(job)?;
    editor.handle_event(&InputEvent::Resize {
        width: viewport.0 as f32,
        height: viewport.1 as f32,
    });
    editor.enter_presentation();

    let mut renderer = PresentationRenderer::new(Arc::new(load_fonts(job.font.as_deref())?));
    let png = renderer
        .render_png(editor.presentation(), &editor.snapshot())
        .await?;
    write(&job.out, &png).await?;

    editor.exit_presentation();
    Ok(job.out.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1920x1080"), Ok((1920, 1080)));
        assert_eq!(parse_size("800X600"), Ok((800, 600)));
        assert!(parse_size("1920").is_err());
        assert!(parse_size("0x10").is_err());
        assert!(parse_size("axb").is_err());
    }

    #[test]
    fn test_export_args() {
        let args = CliArgs::try_parse_from([
            "clipo",
            "export",
            "--text",
            "Hello",
            "--shape",
            "Circle",
            "--shape",
            "arrow",
            "--background",
            "#000000",
            "--background-opacity",
            "40",
        ])
        .unwrap();

        let Command::Export(slide) = args.command else {
            panic!("expected export");
        };
        let job = SlideJob::from(slide);
        assert_eq!(job.texts, vec!["Hello".to_string()]);
        assert_eq!(job.shapes, vec![ShapeKind::Circle, ShapeKind::Arrow]);
        assert_eq!(job.background, Color::BLACK);
        assert_eq!(job.out, PathBuf::from("presentation.png"));
    }

    #[test]
    fn test_unknown_shape_rejected() {
        assert!(CliArgs::try_parse_from(["clipo", "export", "--shape", "blob"]).is_err());
    }

    #[test]
    fn test_bad_background_falls_back_to_white() {
        let args =
            CliArgs::try_parse_from(["clipo", "export", "--background", "not-a-color"]).unwrap();
        let Command::Export(slide) = args.command else {
            panic!("expected export");
        };
        assert_eq!(SlideJob::from(slide).background, Color::WHITE);
    }

    #[test]
    fn test_present_viewport() {
        let args =
            CliArgs::try_parse_from(["clipo", "present", "--viewport", "640x480"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Present {
                viewport: (640, 480),
                ..
            }
        ));
    }
}
