//! CSS-style filter chain on RGBA pixels.
//!
//! Functions run in fixed order (brightness, contrast, saturate, hue-rotate,
//! grayscale, sepia, blur) and each step clamps to `[0, 1]`, matching how a
//! browser applies a `filter` list.

use clipo_core::{Color, FilterStack};

type Matrix = [[f32; 3]; 3];

/// Color part of the chain as a list of steps.
fn color_steps(filters: &FilterStack) -> Vec<ColorStep> {
    let f = filters.clamped();
    let mut steps = Vec::with_capacity(6);

    let brightness = f.brightness / 100.0;
    if (brightness - 1.0).abs() > f32::EPSILON {
        steps.push(ColorStep::Linear {
            slope: brightness,
            intercept: 0.0,
        });
    }
    let contrast = f.contrast / 100.0;
    if (contrast - 1.0).abs() > f32::EPSILON {
        steps.push(ColorStep::Linear {
            slope: contrast,
            intercept: 0.5 - 0.5 * contrast,
        });
    }
    let saturate = f.saturate / 100.0;
    if (saturate - 1.0).abs() > f32::EPSILON {
        steps.push(ColorStep::Matrix(saturate_matrix(saturate)));
    }
    if f.hue_rotate > 0.0 && f.hue_rotate < 360.0 {
        steps.push(ColorStep::Matrix(hue_rotate_matrix(f.hue_rotate)));
    }
    if f.grayscale > 0.0 {
        steps.push(ColorStep::Matrix(grayscale_matrix(f.grayscale / 100.0)));
    }
    if f.sepia > 0.0 {
        steps.push(ColorStep::Matrix(sepia_matrix(f.sepia / 100.0)));
    }
    steps
}

#[derive(Debug, Clone, Copy)]
enum ColorStep {
    Linear { slope: f32, intercept: f32 },
    Matrix(Matrix),
}

impl ColorStep {
    fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        match self {
            Self::Linear { slope, intercept } => {
                rgb.map(|c| (c * slope + intercept).clamp(0.0, 1.0))
            }
            Self::Matrix(m) => {
                let mut out = [0.0; 3];
                for (row, value) in m.iter().zip(out.iter_mut()) {
                    *value = (row[0] * rgb[0] + row[1] * rgb[1] + row[2] * rgb[2]).clamp(0.0, 1.0);
                }
                out
            }
        }
    }
}

fn saturate_matrix(s: f32) -> Matrix {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn hue_rotate_matrix(degrees: f32) -> Matrix {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

fn grayscale_matrix(amount: f32) -> Matrix {
    let a = 1.0 - amount;
    [
        [0.2126 + 0.7874 * a, 0.7152 - 0.7152 * a, 0.0722 - 0.0722 * a],
        [0.2126 - 0.2126 * a, 0.7152 + 0.2848 * a, 0.0722 - 0.0722 * a],
        [0.2126 - 0.2126 * a, 0.7152 - 0.7152 * a, 0.0722 + 0.9278 * a],
    ]
}

fn sepia_matrix(amount: f32) -> Matrix {
    let a = 1.0 - amount;
    [
        [0.393 + 0.607 * a, 0.769 - 0.769 * a, 0.189 - 0.189 * a],
        [0.349 - 0.349 * a, 0.686 + 0.314 * a, 0.168 - 0.168 * a],
        [0.272 - 0.272 * a, 0.534 - 0.534 * a, 0.131 + 0.869 * a],
    ]
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_byte(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Run the color steps of the chain over one straight-alpha color.
#[must_use]
pub fn filter_color(color: Color, filters: &FilterStack) -> Color {
    let steps = color_steps(filters);
    if steps.is_empty() {
        return color;
    }
    let rgb = [color.r, color.g, color.b].map(|c| f32::from(c) / 255.0);
    let rgb = steps.iter().fold(rgb, |acc, step| step.apply(acc));
    Color::rgba(to_byte(rgb[0]), to_byte(rgb[1]), to_byte(rgb[2]), color.a)
}

/// Apply the whole chain in place to premultiplied RGBA pixels.
pub fn apply_filters(premultiplied: &mut [u8], width: u32, height: u32, filters: &FilterStack) {
    let steps = color_steps(filters);
    if !steps.is_empty() {
        for px in premultiplied.chunks_exact_mut(4) {
            let alpha = f32::from(px[3]) / 255.0;
            if alpha <= 0.0 {
                continue;
            }
            let rgb = [px[0], px[1], px[2]].map(|c| (f32::from(c) / 255.0 / alpha).min(1.0));
            let rgb = steps.iter().fold(rgb, |acc, step| step.apply(acc));
            px[0] = to_byte(rgb[0] * alpha);
            px[1] = to_byte(rgb[1] * alpha);
            px[2] = to_byte(rgb[2] * alpha);
        }
    }

    let sigma = filters.clamped().blur;
    if sigma > 0.0 {
        blur(premultiplied, width, height, sigma);
    }
}

fn blur(premultiplied: &mut [u8], width: u32, height: u32, sigma: f32) {
    let Some(buffer) = image::RgbaImage::from_raw(width, height, premultiplied.to_vec()) else {
        tracing::warn!("Blur skipped: buffer does not match {width}x{height}");
        return;
    };
    let blurred = image::imageops::blur(&buffer, sigma);
    premultiplied.copy_from_slice(blurred.as_raw());
}
