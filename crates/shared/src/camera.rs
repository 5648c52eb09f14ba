use crate::models::{MapBounds, Point, Rect, Vector, ViewportBounds, ZoomLimits};
use crate::transform::Transform2D;

/// Owns the camera transform and keeps it inside the map and zoom limits.
///
/// Every mutating operation finishes with the scale in `[limits.min,
/// limits.max]` and the translation clamped so the map covers the viewport.
/// Bad input (NaN deltas, non-positive factors or sizes) is dropped rather
/// than reported.
#[derive(Debug, Clone)]
pub struct CameraController {
    transform: Transform2D,
    map: MapBounds,
    viewport: ViewportBounds,
    limits: ZoomLimits,
    max_scale: f64,
    initial_scale: f64,
}

impl CameraController {
    /// `map`, `max_scale` and `initial_scale` are assumed validated (see
    /// [`MapConfig::validate`](crate::config::MapConfig::validate)).
    pub fn new(map: MapBounds, viewport: ViewportBounds, max_scale: f64, initial_scale: f64) -> Self {
        let viewport = if viewport.is_positive() {
            viewport
        } else {
            tracing::warn!(%viewport, "Viewport has no area yet, using map size");
            map
        };
        let mut camera = CameraController {
            transform: Transform2D::IDENTITY,
            map,
            viewport,
            limits: ZoomLimits::covering(map, viewport, max_scale),
            max_scale,
            initial_scale,
        };
        camera.reset();
        camera
    }

    pub fn transform(&self) -> Transform2D {
        self.transform
    }

    pub fn limits(&self) -> ZoomLimits {
        self.limits
    }

    pub fn map(&self) -> MapBounds {
        self.map
    }

    pub fn viewport(&self) -> ViewportBounds {
        self.viewport
    }

    pub fn visible_world(&self) -> Rect {
        self.transform.visible_world(self.viewport)
    }

    /// Back to the configured initial scale with the map origin in the
    /// top-left corner.
    pub fn reset(&mut self) {
        let scale = self.limits.clamp(self.initial_scale);
        self.transform = Transform2D::new(0.0, 0.0, scale);
        self.clamp_translation();
    }

    pub fn pan(&mut self, delta: Vector) {
        if !delta.x.is_finite() || !delta.y.is_finite() {
            tracing::warn!(?delta, "Ignoring non-finite pan");
            return;
        }
        self.transform = self.transform.translated(delta);
        self.clamp_translation();
    }

    /// Zoom by `factor` about `pivot` (screen space).
    ///
    /// When the target scale is outside the limits the clamped scale is used
    /// and the pivot is still held in place at that scale. An overflowed
    /// factor (`+inf` or `0.0`) lands on the max or min limit.
    pub fn zoom(&mut self, pivot: Point, factor: f64) {
        if factor.is_nan() || factor < 0.0 || !pivot.x.is_finite() || !pivot.y.is_finite() {
            tracing::warn!(factor, ?pivot, "Ignoring invalid zoom");
            return;
        }
        let target = self.limits.clamp(self.transform.scale() * factor);
        self.transform = self.transform.scaled_about(pivot, target);
        self.clamp_translation();
    }

    pub fn resize(&mut self, viewport: ViewportBounds) {
        if !viewport.is_positive() {
            tracing::warn!(%viewport, "Ignoring resize to empty viewport");
            return;
        }
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.limits = ZoomLimits::covering(self.map, viewport, self.max_scale);
        if self.limits.max > self.max_scale {
            tracing::warn!(
                min = self.limits.min,
                ceiling = self.max_scale,
                "Viewport needs more zoom than the ceiling allows to cover it"
            );
        }

        let centre = Point::new(viewport.width / 2.0, viewport.height / 2.0);
        let scale = self.limits.clamp(self.transform.scale());
        self.transform = self.transform.scaled_about(centre, scale);
        self.clamp_translation();
    }

    /// Keep the map over the whole viewport on both axes, or centre it on an
    /// axis where it is smaller than the viewport.
    pub fn clamp_translation(&mut self) {
        let scale = self.transform.scale();
        let tx = clamp_axis(self.transform.tx(), self.map.width * scale, self.viewport.width);
        let ty = clamp_axis(self.transform.ty(), self.map.height * scale, self.viewport.height);
        self.transform = self.transform.with_translation(tx, ty);
    }
}

/// Clamp one translation component. `content` is the scaled map extent and
/// `view` the viewport extent on the same axis.
fn clamp_axis(t: f64, content: f64, view: f64) -> f64 {
    if content <= view {
        (view - content) / 2.0
    } else {
        t.clamp(view - content, 0.0)
    }
}
