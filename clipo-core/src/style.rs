//! Per-kind style attributes and silent range clamping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::geometry::{clamp_offset, cover_scale, Size};

/// An sRGB color with straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel (255 = opaque).
    pub a: u8,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

    /// Opaque color from channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color with explicit alpha.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Whether the color has no visible coverage.
    #[must_use]
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    /// Parse a color, falling back to `fallback` with a warning.
    #[must_use]
    pub fn parse_or(input: &str, fallback: Self) -> Self {
        input.parse().unwrap_or_else(|e| {
            tracing::warn!("{e}, using {fallback}");
            fallback
        })
    }
}

impl FromStr for Color {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "transparent" => return Ok(Self::TRANSPARENT),
            "white" => return Ok(Self::WHITE),
            "black" => return Ok(Self::BLACK),
            _ => {}
        }

        let invalid = || CoreError::InvalidColor(s.to_string());
        let hex = trimmed.strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let short = |i: usize| {
            u8::from_str_radix(&hex[i..=i], 16)
                .map(|v| v * 17)
                .map_err(|_| invalid())
        };

        match hex.len() {
            3 => Ok(Self::rgb(short(0)?, short(1)?, short(2)?)),
            6 => Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// Clamp a percentage into `[0, 100]`; NaN becomes 0.
#[must_use]
pub fn clamp_percent(value: f32) -> f32 {
    clamp_range(value, 0.0, 100.0)
}

/// Clamp into `[min, max]`; NaN becomes `min`.
#[must_use]
pub fn clamp_range(value: f32, min: f32, max: f32) -> f32 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

/// Border line style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BorderStyle {
    /// Continuous line.
    #[default]
    Solid,
    /// 6-on 4-off dash pattern.
    Dashed,
}

/// Border around a text, image or shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    /// Line width in scene units (0 = no border).
    pub width: f32,
    /// Line color.
    pub color: Color,
    /// Line style.
    pub style: BorderStyle,
}

impl Border {
    /// No border.
    pub const NONE: Self = Self {
        width: 0.0,
        color: Color::BLACK,
        style: BorderStyle::Solid,
    };

    /// Whether anything should be stroked.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && !self.color.is_transparent()
    }

    fn clamped(self) -> Self {
        Self {
            width: clamp_range(self.width, 0.0, 50.0),
            ..self
        }
    }
}

impl Default for Border {
    fn default() -> Self {
        Self::NONE
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Flush left.
    Left,
    /// Centered.
    #[default]
    Center,
    /// Flush right.
    Right,
    /// Justified (drawn flush left).
    Justify,
}

/// Font weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    /// Regular weight.
    #[default]
    Normal,
    /// Bold weight.
    Bold,
}

/// Font style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    /// Upright.
    #[default]
    Normal,
    /// Italic.
    Italic,
}

/// Style of a text entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Text content; lines separated by `\n`.
    pub content: String,
    /// Font family name.
    pub font_family: String,
    /// Font size in scene units.
    pub font_size: f32,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Font style.
    pub font_style: FontStyle,
    /// Text color.
    pub color: Color,
    /// Horizontal alignment.
    pub align: TextAlign,
    /// Box background, `None` for transparent.
    pub background: Option<Color>,
    /// Box border.
    pub border: Border,
    /// Corner radius as a percentage of half the shorter side.
    pub corner_radius: f32,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            content: "Click to edit".to_string(),
            font_family: "Inter".to_string(),
            font_size: 24.0,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            color: Color::rgb(0x33, 0x33, 0x33),
            align: TextAlign::Center,
            background: None,
            border: Border::NONE,
            corner_radius: 0.0,
        }
    }
}

/// Crop transform of an image inside its container.
///
/// The image is drawn at `natural * scale`, its top-left at
/// `(offset_x, offset_y)` relative to the container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropTransform {
    /// Content scale relative to the natural size.
    pub scale: f32,
    /// Horizontal content offset (always `<= 0`).
    pub offset_x: f32,
    /// Vertical content offset (always `<= 0`).
    pub offset_y: f32,
}

impl Default for CropTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl CropTransform {
    /// Size of the scaled image content.
    #[must_use]
    pub fn content_size(&self, natural: Size) -> Size {
        Size::new(natural.width * self.scale, natural.height * self.scale)
    }

    /// Clamp into the no-gap range for the given container.
    ///
    /// The scale is raised to cover the container if needed, then both
    /// offsets are clamped to `[min(0, container - content), 0]`.
    #[must_use]
    pub fn clamped(self, container: Size, natural: Size) -> Self {
        let base = if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            1.0
        };
        let scale = base.max(cover_scale(container, natural));
        let content = Self { scale, ..self }.content_size(natural);
        Self {
            scale,
            offset_x: clamp_offset(self.offset_x, container.width, content.width),
            offset_y: clamp_offset(self.offset_y, container.height, content.height),
        }
    }
}

/// CSS-style filter stack applied to images.
///
/// Applied in field order: brightness, contrast, saturate, hue-rotate,
/// grayscale, sepia, blur.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterStack {
    /// Brightness percent, `[0, 200]`, 100 = identity.
    pub brightness: f32,
    /// Contrast percent, `[0, 200]`, 100 = identity.
    pub contrast: f32,
    /// Saturation percent, `[0, 200]`, 100 = identity.
    pub saturate: f32,
    /// Hue rotation in degrees, `[0, 360]`.
    pub hue_rotate: f32,
    /// Grayscale percent, `[0, 100]`.
    pub grayscale: f32,
    /// Sepia percent, `[0, 100]`.
    pub sepia: f32,
    /// Blur radius in pixels, `[0, 10]`.
    pub blur: f32,
}

impl Default for FilterStack {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturate: 100.0,
            hue_rotate: 0.0,
            grayscale: 0.0,
            sepia: 0.0,
            blur: 0.0,
        }
    }
}

impl FilterStack {
    /// Clamp every field into its valid range.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            brightness: clamp_range(self.brightness, 0.0, 200.0),
            contrast: clamp_range(self.contrast, 0.0, 200.0),
            saturate: clamp_range(self.saturate, 0.0, 200.0),
            hue_rotate: clamp_range(self.hue_rotate, 0.0, 360.0),
            grayscale: clamp_percent(self.grayscale),
            sepia: clamp_percent(self.sepia),
            blur: clamp_range(self.blur, 0.0, 10.0),
        }
    }

    /// Whether the stack leaves pixels unchanged.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_identity(&self) -> bool {
        *self == Self::default() || *self == Self {
            hue_rotate: 360.0,
            ..Self::default()
        }
    }
}

/// Supported shape kinds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Square,
    Circle,
    Triangle,
    Diamond,
    Star,
    Arrow,
    Line,
    Pentagon,
    Hexagon,
}

impl ShapeKind {
    /// All shape kinds.
    pub const ALL: [Self; 10] = [
        Self::Rectangle,
        Self::Square,
        Self::Circle,
        Self::Triangle,
        Self::Diamond,
        Self::Star,
        Self::Arrow,
        Self::Line,
        Self::Pentagon,
        Self::Hexagon,
    ];

    /// Lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rectangle => "rectangle",
            Self::Square => "square",
            Self::Circle => "circle",
            Self::Triangle => "triangle",
            Self::Diamond => "diamond",
            Self::Star => "star",
            Self::Arrow => "arrow",
            Self::Line => "line",
            Self::Pentagon => "pentagon",
            Self::Hexagon => "hexagon",
        }
    }

    /// Default size for a newly added shape of this kind.
    #[must_use]
    pub fn default_size(self) -> Size {
        match self {
            Self::Line => Size::new(200.0, 20.0),
            Self::Rectangle | Self::Arrow => Size::new(200.0, 120.0),
            _ => Size::new(150.0, 150.0),
        }
    }
}

impl FromStr for ShapeKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownShapeKind(s.to_string()))
    }
}

/// Style of a shape entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    /// Which outline to draw.
    pub shape_kind: ShapeKind,
    /// Fill color.
    pub fill: Color,
    /// Border.
    pub border: Border,
    /// Corner radius percent (rectangles only).
    pub corner_radius: f32,
}

impl ShapeStyle {
    /// Default style for a shape kind.
    #[must_use]
    pub fn new(shape_kind: ShapeKind) -> Self {
        Self {
            shape_kind,
            fill: Color::rgb(0x3b, 0x82, 0xf6),
            border: Border::NONE,
            corner_radius: 0.0,
        }
    }
}

/// A style-panel edit. Values are clamped when applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum StylePatch {
    Content(String),
    FontFamily(String),
    FontSize(f32),
    FontWeight(FontWeight),
    FontStyle(FontStyle),
    TextColor(Color),
    TextAlign(TextAlign),
    Background(Option<Color>),
    Border(Border),
    CornerRadius(f32),
    Opacity(f32),
    Filters(FilterStack),
    Fill(Color),
    ShapeKind(ShapeKind),
}

impl StylePatch {
    /// The patch with its numeric payload clamped into range.
    #[must_use]
    pub fn clamped(self) -> Self {
        match self {
            Self::FontSize(v) => Self::FontSize(clamp_range(v, 1.0, 400.0)),
            Self::Border(b) => Self::Border(b.clamped()),
            Self::CornerRadius(v) => Self::CornerRadius(clamp_percent(v)),
            Self::Opacity(v) => Self::Opacity(clamp_percent(v)),
            Self::Filters(f) => Self::Filters(f.clamped()),
            other => other,
        }
    }
}
