use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A point in either world or screen space. Which one is always clear from
/// the call site (`to_screen` / `to_world`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Euclidean distance between two points.
    pub fn distance(self, other: Point) -> f64 {
        (other - self).length()
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// A displacement, e.g. a pan delta in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const ZERO: Vector = Vector { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Vector { x, y }
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Point) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Add for Vector {
    type Output = Vector;

    fn add(self, rhs: Vector) -> Vector {
        Vector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Mul<f64> for Vector {
    type Output = Vector;

    fn mul(self, rhs: f64) -> Vector {
        Vector::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }

    /// Both dimensions finite and strictly positive.
    pub fn is_positive(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Fixed world extent of the background image.
pub type MapBounds = Size;

/// Current size of the rendering surface in screen pixels.
pub type ViewportBounds = Size;

/// Axis-aligned rectangle; `origin` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self {
        Rect { origin, size }
    }

    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    /// Inclusive on every edge, so a point on the border counts as inside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.y >= self.min_y() && p.y <= self.max_y()
    }

    /// Whether `other` lies entirely inside `self`, with `eps` of slack for
    /// floating-point noise.
    pub fn contains_rect(&self, other: &Rect, eps: f64) -> bool {
        other.min_x() >= self.min_x() - eps
            && other.min_y() >= self.min_y() - eps
            && other.max_x() <= self.max_x() + eps
            && other.max_y() <= self.max_y() + eps
    }
}

/// Allowed range for the camera scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomLimits {
    pub min: f64,
    pub max: f64,
}

impl ZoomLimits {
    /// Limits for a map that must cover the viewport on both axes.
    ///
    /// `min` is the smallest scale at which the map still fills the viewport.
    /// When that exceeds `ceiling` the coverage requirement wins and `max` is
    /// raised to match.
    pub fn covering(map: MapBounds, viewport: ViewportBounds, ceiling: f64) -> Self {
        let min = (viewport.width / map.width).max(viewport.height / map.height);
        ZoomLimits {
            min,
            max: ceiling.max(min),
        }
    }

    pub fn clamp(&self, scale: f64) -> f64 {
        scale.clamp(self.min, self.max)
    }

    pub fn contains(&self, scale: f64) -> bool {
        scale >= self.min && scale <= self.max
    }
}

/// A point of interest on the map.
///
/// `(x, y)` is the world-space top-left corner of the marker box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl Location {
    pub fn new(id: impl Into<String>, name: impl Into<String>, x: f64, y: f64) -> Self {
        Location {
            id: id.into(),
            name: name.into(),
            x,
            y,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Generate a URL-safe slug from the display name.
    pub fn slug(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Load state of an image resource, as reported by the asset loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssetState {
    #[default]
    Pending,
    Ready,
    Unavailable,
}

impl std::fmt::Display for AssetState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetState::Pending => write!(f, "Pending"),
            AssetState::Ready => write!(f, "Ready"),
            AssetState::Unavailable => write!(f, "Unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance_and_midpoint() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(30.0, 40.0);
        assert!((a.distance(b) - 50.0).abs() < 1e-9);
        assert_eq!(a.midpoint(b), Point::new(15.0, 20.0));
    }

    #[test]
    fn test_point_vector_arithmetic() {
        let d = Point::new(10.0, 5.0) - Point::new(4.0, 8.0);
        assert_eq!(d, Vector::new(6.0, -3.0));
        assert_eq!(Point::new(4.0, 8.0) + d, Point::new(10.0, 5.0));
        assert_eq!(d * 2.0, Vector::new(12.0, -6.0));
    }

    #[test]
    fn test_rect_contains_is_inclusive() {
        let r = Rect::new(Point::new(400.0, 220.0), Size::new(48.0, 48.0));
        assert!(r.contains(Point::new(400.0, 220.0)));
        assert!(r.contains(Point::new(448.0, 268.0)));
        assert!(!r.contains(Point::new(448.1, 240.0)));
    }

    #[test]
    fn test_zoom_limits_cover_viewport() {
        let limits = ZoomLimits::covering(Size::new(1792.0, 1024.0), Size::new(800.0, 600.0), 1.5);
        assert!((limits.min - 600.0 / 1024.0).abs() < 1e-9);
        assert!((limits.max - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_limits_ceiling_below_cover() {
        let limits = ZoomLimits::covering(Size::new(1792.0, 1024.0), Size::new(3000.0, 2000.0), 1.5);
        assert!(limits.min > 1.5);
        assert_eq!(limits.min, limits.max);
    }

    #[test]
    fn test_location_slug() {
        let loc = Location::new("", "The Old Keep!", 0.0, 0.0);
        assert_eq!(loc.slug(), "the-old-keep");
    }

    #[test]
    fn test_size_is_positive() {
        assert!(Size::new(1.0, 1.0).is_positive());
        assert!(!Size::new(0.0, 1.0).is_positive());
        assert!(!Size::new(f64::NAN, 1.0).is_positive());
    }
}
