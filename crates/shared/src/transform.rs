use crate::models::{Point, Rect, Size, Vector};

/// Uniform pan + zoom transform from world space to screen space.
///
/// `screen = (tx, ty) + world * scale`. The scale is always finite and
/// strictly positive; constructing one that isn't is a programming error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    tx: f64,
    ty: f64,
    scale: f64,
}

impl Transform2D {
    pub const IDENTITY: Transform2D = Transform2D {
        tx: 0.0,
        ty: 0.0,
        scale: 1.0,
    };

    pub fn new(tx: f64, ty: f64, scale: f64) -> Self {
        assert!(
            scale.is_finite() && scale > 0.0,
            "degenerate transform scale: {scale}"
        );
        Transform2D { tx, ty, scale }
    }

    pub fn tx(&self) -> f64 {
        self.tx
    }

    pub fn ty(&self) -> f64 {
        self.ty
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translation(&self) -> Vector {
        Vector::new(self.tx, self.ty)
    }

    pub fn to_screen(&self, world: Point) -> Point {
        Point::new(self.tx + world.x * self.scale, self.ty + world.y * self.scale)
    }

    pub fn to_world(&self, screen: Point) -> Point {
        Point::new((screen.x - self.tx) / self.scale, (screen.y - self.ty) / self.scale)
    }

    pub fn rect_to_screen(&self, world: Rect) -> Rect {
        Rect::new(
            self.to_screen(world.origin),
            Size::new(world.size.width * self.scale, world.size.height * self.scale),
        )
    }

    pub fn translated(&self, delta: Vector) -> Self {
        Transform2D::new(self.tx + delta.x, self.ty + delta.y, self.scale)
    }

    pub fn with_translation(&self, tx: f64, ty: f64) -> Self {
        Transform2D::new(tx, ty, self.scale)
    }

    /// Zoom by `factor`, keeping the world point under `pivot` in place.
    pub fn compose_scale(&self, pivot: Point, factor: f64) -> Self {
        self.scaled_about(pivot, self.scale * factor)
    }

    /// Like [`compose_scale`](Self::compose_scale) but with an absolute
    /// target scale.
    pub fn scaled_about(&self, pivot: Point, new_scale: f64) -> Self {
        let anchor = self.to_world(pivot);
        Transform2D::new(
            pivot.x - anchor.x * new_scale,
            pivot.y - anchor.y * new_scale,
            new_scale,
        )
    }

    /// World-space rectangle currently shown by a viewport of the given size.
    pub fn visible_world(&self, viewport: Size) -> Rect {
        Rect::new(
            self.to_world(Point::ORIGIN),
            Size::new(viewport.width / self.scale, viewport.height / self.scale),
        )
    }
}

impl Default for Transform2D {
    fn default() -> Self {
        Transform2D::IDENTITY
    }
}
