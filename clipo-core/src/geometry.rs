//! Geometry utilities: rectangles, anchored resize and crop clamping.
//!
//! All values are scene units (top-left origin, content-area relative)
//! unless a function says otherwise.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

use crate::style::CropTransform;

/// Minimum interactive width and height of an entity.
pub const MIN_SIZE: f32 = 20.0;

const EPSILON: f32 = 1e-3;

/// A 2D point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Scale both components.
    #[must_use]
    pub fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Size {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Width divided by height, or 1 for degenerate sizes.
    #[must_use]
    pub fn aspect_ratio(self) -> f32 {
        if self.height > 0.0 && self.width > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalised rectangle spanning two arbitrary corner points.
    #[must_use]
    pub fn from_points(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Rectangle of the given size centered inside `container`.
    #[must_use]
    pub fn centered_in(container: Size, size: Size) -> Self {
        Self::new(
            (container.width - size.width) / 2.0,
            (container.height - size.height) / 2.0,
            size.width,
            size.height,
        )
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Top-left corner.
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Width and height.
    #[must_use]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether the point lies inside the rectangle (edges included).
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Whether two rectangles intersect.
    ///
    /// Intervals are closed: rectangles that only share an edge intersect.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    /// Same size, new top-left corner.
    #[must_use]
    pub fn with_origin(self, origin: Point) -> Self {
        Self::new(origin.x, origin.y, self.width, self.height)
    }
}

/// A resize handle: four corners and four side midpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    /// Top-left corner.
    Nw,
    /// Top-right corner.
    Ne,
    /// Bottom-left corner.
    Sw,
    /// Bottom-right corner.
    Se,
    /// Top side.
    N,
    /// Bottom side.
    S,
    /// Right side.
    E,
    /// Left side.
    W,
}

impl Handle {
    /// Corner handles.
    pub const CORNERS: [Self; 4] = [Self::Nw, Self::Ne, Self::Sw, Self::Se];

    /// Side handles.
    pub const SIDES: [Self; 4] = [Self::N, Self::S, Self::E, Self::W];

    /// Whether this is a corner handle.
    #[must_use]
    pub fn is_corner(self) -> bool {
        matches!(self, Self::Nw | Self::Ne | Self::Sw | Self::Se)
    }

    /// Whether dragging this handle moves the left edge.
    #[must_use]
    pub fn moves_left(self) -> bool {
        matches!(self, Self::Nw | Self::Sw | Self::W)
    }

    /// Whether dragging this handle moves the top edge.
    #[must_use]
    pub fn moves_top(self) -> bool {
        matches!(self, Self::Nw | Self::Ne | Self::N)
    }

    /// Whether this handle changes the width.
    #[must_use]
    pub fn affects_width(self) -> bool {
        !matches!(self, Self::N | Self::S)
    }

    /// Whether this handle changes the height.
    #[must_use]
    pub fn affects_height(self) -> bool {
        !matches!(self, Self::E | Self::W)
    }

    /// Where this handle sits on `rect`.
    #[must_use]
    pub fn position_on(self, rect: &Rect) -> Point {
        let c = rect.center();
        match self {
            Self::Nw => Point::new(rect.x, rect.y),
            Self::Ne => Point::new(rect.right(), rect.y),
            Self::Sw => Point::new(rect.x, rect.bottom()),
            Self::Se => Point::new(rect.right(), rect.bottom()),
            Self::N => Point::new(c.x, rect.y),
            Self::S => Point::new(c.x, rect.bottom()),
            Self::E => Point::new(rect.right(), c.y),
            Self::W => Point::new(rect.x, c.y),
        }
    }

    /// The point held fixed while this handle is dragged.
    ///
    /// For corners this is the diagonally opposite corner; for sides it is
    /// the top-left corner shifted onto the opposite side.
    #[must_use]
    pub fn anchor(self, rect: &Rect) -> Point {
        let x = if self.moves_left() { rect.right() } else { rect.x };
        let y = if self.moves_top() { rect.bottom() } else { rect.y };
        Point::new(x, y)
    }
}

/// Resize `initial` by dragging `handle` by `delta` scene units.
///
/// The handle's anchor never moves. Both dimensions are floored at
/// `min_size`. In proportional mode the dimension with the larger absolute
/// raw change drives and the other follows the original aspect ratio.
#[must_use]
pub fn resize_rect(
    initial: Rect,
    handle: Handle,
    delta: Point,
    proportional: bool,
    min_size: f32,
) -> Rect {
    let raw_w = match handle {
        Handle::Se | Handle::Ne | Handle::E => initial.width + delta.x,
        Handle::Sw | Handle::Nw | Handle::W => initial.width - delta.x,
        Handle::N | Handle::S => initial.width,
    };
    let raw_h = match handle {
        Handle::Se | Handle::Sw | Handle::S => initial.height + delta.y,
        Handle::Ne | Handle::Nw | Handle::N => initial.height - delta.y,
        Handle::E | Handle::W => initial.height,
    };

    let mut width = raw_w.max(min_size);
    let mut height = raw_h.max(min_size);

    if proportional {
        let aspect = initial.size().aspect_ratio();
        if (raw_w - initial.width).abs() >= (raw_h - initial.height).abs() {
            height = (width / aspect).max(min_size);
        } else {
            width = (height * aspect).max(min_size);
        }
    }

    let anchor = handle.anchor(&initial);
    let x = if handle.moves_left() {
        anchor.x - width
    } else {
        anchor.x
    };
    let y = if handle.moves_top() {
        anchor.y - height
    } else {
        anchor.y
    };

    Rect::new(x, y, width, height)
}

/// Outcome of resizing an image entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageResize {
    /// New container rectangle.
    pub rect: Rect,
    /// New crop transform.
    pub crop: CropTransform,
}

/// Resize an image container while keeping it fully covered by content.
///
/// Corner handles are always proportional and keep the content size unless
/// the box would outgrow it, in which case the content scale is raised just
/// enough to cover. Side handles crop: the image stays put in scene space and
/// the moving edge stops at the image edge.
#[must_use]
pub fn resize_image(
    initial: Rect,
    crop: CropTransform,
    natural: Size,
    handle: Handle,
    delta: Point,
    proportional_modifier: bool,
    min_size: f32,
) -> ImageResize {
    let proportional = handle.is_corner() || proportional_modifier;
    let mut rect = resize_rect(initial, handle, delta, proportional, min_size);
    let mut crop = crop;

    if handle.is_corner() {
        let content = crop.content_size(natural);
        if rect.width > content.width + EPSILON || rect.height > content.height + EPSILON {
            crop.scale = crop.scale.max(cover_scale(rect.size(), natural));
        }
    } else {
        let content = crop.content_size(natural);
        let image = Rect::new(
            initial.x + crop.offset_x,
            initial.y + crop.offset_y,
            content.width,
            content.height,
        );
        rect = pin_to_content(&initial, rect, &image, min_size);
        crop.offset_x = image.x - rect.x;
        crop.offset_y = image.y - rect.y;
    }

    ImageResize {
        rect,
        crop: crop.clamped(rect.size(), natural),
    }
}

/// Stop every edge that moved during a resize at the matching image edge.
fn pin_to_content(initial: &Rect, rect: Rect, image: &Rect, min_size: f32) -> Rect {
    let (x, width) = pin_axis(
        (initial.x, initial.right()),
        (rect.x, rect.right()),
        (image.x, image.right()),
        min_size,
    );
    let (y, height) = pin_axis(
        (initial.y, initial.bottom()),
        (rect.y, rect.bottom()),
        (image.y, image.bottom()),
        min_size,
    );
    Rect::new(x, y, width, height)
}

fn pin_axis(
    initial: (f32, f32),
    current: (f32, f32),
    image: (f32, f32),
    min_size: f32,
) -> (f32, f32) {
    let (mut start, mut end) = current;
    let start_moved = (start - initial.0).abs() > EPSILON;
    let end_moved = (end - initial.1).abs() > EPSILON;

    if start_moved {
        start = start.max(image.0);
    }
    if end_moved {
        end = end.min(image.1);
    }

    let length = (end - start).max(min_size);
    if start_moved {
        (end - length, length)
    } else {
        (start, length)
    }
}

/// Clamp a content offset so the container never shows a gap.
///
/// Valid range is `[min(0, container - content), 0]`.
#[must_use]
pub fn clamp_offset(offset: f32, container: f32, content: f32) -> f32 {
    offset.clamp((container - content).min(0.0), 0.0)
}

/// Largest scale `<= 1` that fits `natural` inside `bounds`, preserving aspect ratio.
#[must_use]
pub fn fit_scale(natural: Size, bounds: Size) -> f32 {
    if natural.width <= 0.0 || natural.height <= 0.0 {
        return 1.0;
    }
    (bounds.width / natural.width)
        .min(bounds.height / natural.height)
        .min(1.0)
}

/// Smallest scale at which `natural` covers `container` on both axes.
#[must_use]
pub fn cover_scale(container: Size, natural: Size) -> f32 {
    if natural.width <= 0.0 || natural.height <= 0.0 {
        return 1.0;
    }
    (container.width / natural.width).max(container.height / natural.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rect(actual: Rect, expected: Rect) {
        let close = |a: f32, b: f32| (a - b).abs() < 0.01;
        assert!(
            close(actual.x, expected.x)
                && close(actual.y, expected.y)
                && close(actual.width, expected.width)
                && close(actual.height, expected.height),
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_se_resize_grows_from_top_left() {
        let r = resize_rect(
            Rect::new(100.0, 100.0, 200.0, 120.0),
            Handle::Se,
            Point::new(50.0, 30.0),
            false,
            MIN_SIZE,
        );
        assert_rect(r, Rect::new(100.0, 100.0, 250.0, 150.0));
    }

    #[test]
    fn test_nw_resize_keeps_opposite_corner() {
        let initial = Rect::new(100.0, 100.0, 250.0, 150.0);
        let r = resize_rect(initial, Handle::Nw, Point::new(20.0, 10.0), false, MIN_SIZE);
        assert_rect(r, Rect::new(120.0, 110.0, 230.0, 140.0));
        assert!((r.right() - 350.0).abs() < 0.01);
        assert!((r.bottom() - 250.0).abs() < 0.01);
    }

    #[test]
    fn test_side_handle_changes_one_dimension() {
        let initial = Rect::new(10.0, 10.0, 100.0, 100.0);
        let r = resize_rect(initial, Handle::E, Point::new(40.0, 999.0), false, MIN_SIZE);
        assert_rect(r, Rect::new(10.0, 10.0, 140.0, 100.0));

        let r = resize_rect(initial, Handle::N, Point::new(999.0, 30.0), false, MIN_SIZE);
        assert_rect(r, Rect::new(10.0, 40.0, 100.0, 70.0));
    }

    #[test]
    fn test_resize_floors_at_minimum() {
        let initial = Rect::new(0.0, 0.0, 100.0, 100.0);
        let r = resize_rect(initial, Handle::Nw, Point::new(500.0, 500.0), false, MIN_SIZE);
        assert_rect(r, Rect::new(80.0, 80.0, 20.0, 20.0));
    }

    #[test]
    fn test_proportional_uses_larger_change_as_driver() {
        let initial = Rect::new(0.0, 0.0, 200.0, 100.0);
        let r = resize_rect(initial, Handle::Se, Point::new(100.0, 10.0), true, MIN_SIZE);
        assert_rect(r, Rect::new(0.0, 0.0, 300.0, 150.0));

        let r = resize_rect(initial, Handle::Se, Point::new(10.0, 50.0), true, MIN_SIZE);
        assert_rect(r, Rect::new(0.0, 0.0, 300.0, 150.0));
    }

    #[test]
    fn test_image_west_side_crops_and_pins() {
        let initial = Rect::new(50.0, 40.0, 400.0, 300.0);
        let result = resize_image(
            initial,
            CropTransform::default(),
            Size::new(400.0, 300.0),
            Handle::W,
            Point::new(100.0, 0.0),
            false,
            MIN_SIZE,
        );
        assert_rect(result.rect, Rect::new(150.0, 40.0, 300.0, 300.0));
        assert!((result.crop.offset_x + 100.0).abs() < 0.01);
        assert!(result.crop.offset_y.abs() < 0.01);
    }

    #[test]
    fn test_image_side_cannot_extend_past_content() {
        let initial = Rect::new(0.0, 0.0, 400.0, 300.0);
        let result = resize_image(
            initial,
            CropTransform::default(),
            Size::new(400.0, 300.0),
            Handle::E,
            Point::new(120.0, 0.0),
            false,
            MIN_SIZE,
        );
        assert_rect(result.rect, Rect::new(0.0, 0.0, 400.0, 300.0));
    }

    #[test]
    fn test_image_corner_raises_scale_when_outgrowing_content() {
        let initial = Rect::new(0.0, 0.0, 200.0, 150.0);
        let crop = CropTransform {
            scale: 0.5,
            offset_x: 0.0,
            offset_y: 0.0,
        };
        let result = resize_image(
            initial,
            crop,
            Size::new(400.0, 300.0),
            Handle::Se,
            Point::new(200.0, 0.0),
            false,
            MIN_SIZE,
        );
        assert_rect(result.rect, Rect::new(0.0, 0.0, 400.0, 300.0));
        assert!((result.crop.scale - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_closed_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(!a.intersects(&Rect::new(10.5, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn test_fit_scale_never_upscales() {
        assert!((fit_scale(Size::new(100.0, 50.0), Size::new(800.0, 640.0)) - 1.0).abs() < 1e-6);
        let s = fit_scale(Size::new(1600.0, 800.0), Size::new(800.0, 640.0));
        assert!((s - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_offset_range() {
        assert!((clamp_offset(10.0, 300.0, 400.0)).abs() < 1e-6);
        assert!((clamp_offset(-150.0, 300.0, 400.0) + 100.0).abs() < 1e-6);
        assert!((clamp_offset(-50.0, 300.0, 400.0) + 50.0).abs() < 1e-6);
    }
}
