//! Outlines for shape entities, scaled into the entity box.

use std::f32::consts::{FRAC_PI_2, PI};

use clipo_core::{Point, Rect, ShapeKind};

use crate::surface::Path2D;

/// Arrow outline on a 100x100 reference box.
const ARROW: [(f32, f32); 7] = [
    (0.0, 35.0),
    (60.0, 35.0),
    (60.0, 15.0),
    (100.0, 50.0),
    (60.0, 85.0),
    (60.0, 65.0),
    (0.0, 65.0),
];

/// Triangle outline on a 100x100 reference box.
const TRIANGLE: [(f32, f32); 3] = [(50.0, 10.0), (90.0, 90.0), (10.0, 90.0)];

/// Outline for `kind` filling `rect`.
///
/// `corner_radius` is a percent of half the shorter side and only rounds
/// rectangles.
#[must_use]
pub fn shape_path(kind: ShapeKind, rect: &Rect, corner_radius: f32) -> Path2D {
    match kind {
        ShapeKind::Rectangle => {
            Path2D::rounded_rect(rect, radius_from_percent(rect, corner_radius))
        }
        ShapeKind::Square | ShapeKind::Line => Path2D::rect(rect),
        ShapeKind::Circle => Path2D::ellipse(rect),
        ShapeKind::Triangle => reference_polygon(rect, &TRIANGLE),
        ShapeKind::Arrow => reference_polygon(rect, &ARROW),
        ShapeKind::Diamond => reference_polygon(
            rect,
            &[(50.0, 0.0), (100.0, 50.0), (50.0, 100.0), (0.0, 50.0)],
        ),
        ShapeKind::Pentagon => Path2D::polygon(&regular_polygon(rect, 5, 1.0, 1.0)),
        ShapeKind::Hexagon => Path2D::polygon(&regular_polygon(rect, 6, 1.0, 1.0)),
        ShapeKind::Star => Path2D::polygon(&regular_polygon(rect, 10, 1.0, 0.4)),
    }
}

/// Corner radius percent of half the shorter side, in user units.
pub(crate) fn radius_from_percent(rect: &Rect, percent: f32) -> f32 {
    percent.clamp(0.0, 100.0) / 100.0 * rect.width.min(rect.height) / 2.0
}

fn reference_polygon(rect: &Rect, points: &[(f32, f32)]) -> Path2D {
    let points: Vec<Point> = points
        .iter()
        .map(|&(px, py)| {
            Point::new(
                rect.x + px / 100.0 * rect.width,
                rect.y + py / 100.0 * rect.height,
            )
        })
        .collect();
    Path2D::polygon(&points)
}

/// Vertices around the box's inscribed ellipse, starting at the top.
/// Odd vertices use `inner` as the radius factor, which makes a star.
#[allow(clippy::cast_precision_loss)]
fn regular_polygon(rect: &Rect, count: usize, outer: f32, inner: f32) -> Vec<Point> {
    let c = rect.center();
    let (rx, ry) = (rect.width / 2.0, rect.height / 2.0);
    (0..count)
        .map(|i| {
            let angle = -FRAC_PI_2 + 2.0 * PI * i as f32 / count as f32;
            let factor = if i % 2 == 1 { inner } else { outer };
            Point::new(
                c.x + rx * factor * angle.cos(),
                c.y + ry * factor * angle.sin(),
            )
        })
        .collect()
}
