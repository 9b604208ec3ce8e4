//! Plane geometry shared by the store, the interaction engine and renderers.
//!
//! Two coordinate spaces exist:
//!
//! - **world space**: where nodes, groups and edges live; invariant to zoom/pan
//! - **screen space**: pixels relative to the top-left corner of the viewport
//!
//! The mapping is anchored at the top-left corner of the viewport:
//!
//! ```text
//! screen = (world + camera.xy) * zoom
//! world  = screen / zoom - camera.xy
//! ```
//!
//! Anchoring at the corner (instead of the viewport centre) means resizing the
//! viewport never shifts a node's screen position.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Default lower zoom bound.
pub const MIN_ZOOM: f32 = 0.1;
/// Default upper zoom bound.
pub const MAX_ZOOM: f32 = 4.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    pub fn distance_sq(self, other: Vec2) -> f32 {
        (self - other).length_sq()
    }

    /// Midpoint between two points (pinch centre).
    pub fn midpoint(self, other: Vec2) -> Vec2 {
        Vec2::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    pub fn lerp(self, other: Vec2, t: f32) -> Vec2 {
        self + (other - self) * t
    }

    pub fn min(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x.min(other.x), self.y.min(other.y))
    }

    pub fn max(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from((x, y): (f32, f32)) -> Self {
        Vec2::new(x, y)
    }
}

impl From<Vec2> for (f32, f32) {
    fn from(v: Vec2) -> Self {
        (v.x, v.y)
    }
}

/// Axis-aligned rectangle, `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self::new(origin.x, origin.y, size.x, size.y)
    }

    /// Normalised rectangle spanning two arbitrary corners (marquee drag).
    pub fn from_corners(a: Vec2, b: Vec2) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    pub fn bottom_right(&self) -> Vec2 {
        Vec2::new(self.right(), self.bottom())
    }

    /// Inclusive point containment.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Strict overlap: rectangles that merely share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let min = self.origin().min(other.origin());
        let max = self.bottom_right().max(other.bottom_right());
        Rect::from_corners(min, max)
    }

    /// Grow on every side by `amount`.
    pub fn expand(&self, amount: f32) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    pub fn translate(&self, delta: Vec2) -> Rect {
        Rect::new(self.x + delta.x, self.y + delta.y, self.width, self.height)
    }

    /// Union of an arbitrary number of rectangles; `None` when empty.
    pub fn union_all<I>(rects: I) -> Option<Rect>
    where
        I: IntoIterator<Item = Rect>,
    {
        rects.into_iter().reduce(|acc, r| acc.union(&r))
    }
}

/// Viewport camera: pan offset in world units plus zoom factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, zoom: 1.0 }
    }
}

/// Partial camera update; `None` fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraPatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub zoom: Option<f32>,
}

impl CameraPatch {
    pub fn position(x: f32, y: f32) -> Self {
        Self { x: Some(x), y: Some(y), zoom: None }
    }

    pub fn zoom(zoom: f32) -> Self {
        Self { zoom: Some(zoom), ..Self::default() }
    }
}

impl From<Camera> for CameraPatch {
    fn from(c: Camera) -> Self {
        Self { x: Some(c.x), y: Some(c.y), zoom: Some(c.zoom) }
    }
}

impl Camera {
    pub fn new(x: f32, y: f32, zoom: f32) -> Self {
        Self { x, y, zoom }
    }

    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    fn safe_zoom(&self) -> f32 {
        if self.zoom > 0.0 {
            self.zoom
        } else {
            1.0
        }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world + self.offset()) * self.zoom
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen / self.safe_zoom() - self.offset()
    }

    /// Screen-space length converted to world units (hit radii are specified in pixels).
    pub fn screen_len_to_world(&self, len: f32) -> f32 {
        len / self.safe_zoom()
    }

    pub fn world_rect_to_screen(&self, rect: &Rect) -> Rect {
        Rect::from_origin_size(self.world_to_screen(rect.origin()), rect.size() * self.zoom)
    }

    pub fn screen_rect_to_world(&self, rect: &Rect) -> Rect {
        Rect::from_origin_size(
            self.screen_to_world(rect.origin()),
            rect.size() / self.safe_zoom(),
        )
    }

    /// Apply a partial update, clamping the zoom into `[min_zoom, max_zoom]`.
    pub fn apply(&mut self, patch: CameraPatch, min_zoom: f32, max_zoom: f32) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(zoom) = patch.zoom {
            self.zoom = clamp_zoom(zoom, min_zoom, max_zoom);
        }
    }

    /// Camera with `new_zoom` that keeps the world point under `screen_anchor` fixed.
    pub fn zoomed_about(&self, screen_anchor: Vec2, new_zoom: f32) -> Camera {
        let world = self.screen_to_world(screen_anchor);
        let offset = screen_anchor / new_zoom - world;
        Camera::new(offset.x, offset.y, new_zoom)
    }

    /// Camera for `zoom` that maps `world_center` onto the viewport centre.
    pub fn centered_on(world_center: Vec2, viewport: Vec2, zoom: f32) -> Camera {
        let offset = viewport / (2.0 * zoom) - world_center;
        Camera::new(offset.x, offset.y, zoom)
    }

    pub fn lerp(&self, other: &Camera, t: f32) -> Camera {
        Camera::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.zoom + (other.zoom - self.zoom) * t,
        )
    }
}

/// Clamp a zoom factor, mapping non-finite input to the nearest sane bound.
pub fn clamp_zoom(zoom: f32, min_zoom: f32, max_zoom: f32) -> f32 {
    if zoom.is_nan() {
        return 1.0_f32.clamp(min_zoom, max_zoom);
    }
    zoom.clamp(min_zoom, max_zoom)
}
