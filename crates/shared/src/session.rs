use crate::camera::CameraController;
use crate::config::{ConfigError, MapConfig};
use crate::input::{Gesture, InputEvent, InputReducer, Intent};
use crate::models::{AssetState, Location, Point, Rect, ViewportBounds};
use crate::scene::{Scene, SceneItemKind};
use crate::transform::Transform2D;

/// One interactive map: camera, gesture state, scene and current selection.
///
/// Built once by whatever hosts the map and driven entirely through
/// [`handle`](Self::handle), [`tick`](Self::tick) and
/// [`resize`](Self::resize). Rendering reads [`frame`](Self::frame).
#[derive(Debug, Clone)]
pub struct MapSession {
    camera: CameraController,
    input: InputReducer,
    scene: Scene,
    selected: Option<String>,
}

/// Everything needed to draw one frame, in screen space.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub transform: Transform2D,
    pub items: Vec<FrameItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameItem {
    pub asset: String,
    pub screen: Rect,
    pub state: AssetState,
    /// Set for markers.
    pub location_id: Option<String>,
}

impl MapSession {
    pub fn new(mut config: MapConfig, viewport: ViewportBounds) -> Result<Self, ConfigError> {
        config.fill_location_ids();
        config.validate()?;

        let camera = CameraController::new(config.map, viewport, config.max_scale, config.initial_scale);
        let scene = Scene::new(
            config.map,
            &config.background,
            &config.locations,
            &config.marker,
            config.marker_size,
        );
        tracing::info!(
            map = %config.map,
            viewport = %camera.viewport(),
            locations = config.locations.len(),
            min_scale = camera.limits().min,
            max_scale = camera.limits().max,
            "Map session started"
        );

        Ok(MapSession {
            camera,
            input: InputReducer::new(config.input),
            scene,
            selected: None,
        })
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn transform(&self) -> Transform2D {
        self.camera.transform()
    }

    pub fn gesture(&self) -> Gesture {
        self.input.gesture()
    }

    pub fn is_gliding(&self) -> bool {
        self.input.is_gliding()
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        self.camera.transform().to_world(screen)
    }

    /// Feed one input event. Returns the location when the event was a
    /// click on a marker; that location also becomes the selection.
    pub fn handle(&mut self, event: InputEvent) -> Option<&Location> {
        let mut picked = None;
        for intent in self.input.handle(event) {
            match intent {
                Intent::Pan(delta) => self.camera.pan(delta),
                Intent::Zoom { pivot, factor } => self.camera.zoom(pivot, factor),
                Intent::Click(screen) => {
                    let world = self.screen_to_world(screen);
                    picked = self.scene.hit_test(world).map(|loc| loc.id.clone());
                    if picked.is_none() {
                        tracing::trace!(?world, "Click hit no marker");
                    }
                }
            }
        }
        let id = picked?;
        self.select(&id)
    }

    /// Advance animations. Returns whether the camera moved.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let Some(Intent::Pan(delta)) = self.input.tick(now_ms) else {
            return false;
        };
        let before = self.camera.transform();
        self.camera.pan(delta);
        self.camera.transform() != before
    }

    pub fn resize(&mut self, viewport: ViewportBounds) {
        self.camera.resize(viewport);
    }

    pub fn reset_view(&mut self) {
        self.input.cancel_inertia();
        self.camera.reset();
    }

    pub fn set_asset_state(&mut self, key: &str, state: AssetState) -> bool {
        self.scene.set_asset_state(key, state)
    }

    /// Select a location by id, e.g. from a deep link.
    pub fn select(&mut self, id: &str) -> Option<&Location> {
        let Some(loc) = self.scene.location(id) else {
            tracing::warn!(id, "No location with this id");
            return None;
        };
        tracing::debug!(id, name = %loc.name, "Location selected");
        self.selected = Some(loc.id.clone());
        self.scene.location(id)
    }

    pub fn selected(&self) -> Option<&Location> {
        self.selected.as_deref().and_then(|id| self.scene.location(id))
    }

    pub fn dismiss(&mut self) {
        self.selected = None;
    }

    pub fn frame(&self) -> Frame {
        let transform = self.camera.transform();
        let items = self
            .scene
            .items()
            .iter()
            .map(|item| FrameItem {
                asset: item.asset.clone(),
                screen: transform.rect_to_screen(item.bounds),
                state: self.scene.asset_state(&item.asset).unwrap_or_default(),
                location_id: match &item.kind {
                    SceneItemKind::Marker(loc) => Some(loc.id.clone()),
                    SceneItemKind::Background => None,
                },
            })
            .collect();
        Frame { transform, items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Size, Vector};

    fn session() -> MapSession {
        let mut s = MapSession::new(MapConfig::default(), Size::new(800.0, 600.0)).unwrap();
        s.set_asset_state("/bg.webp", AssetState::Ready);
        s.set_asset_state("/marker.webp", AssetState::Ready);
        s
    }

    fn click(s: &mut MapSession, x: f64, y: f64) -> Option<String> {
        let position = Point::new(x, y);
        s.handle(InputEvent::PointerDown {
            id: 1,
            position,
            time_ms: 0.0,
        });
        s.handle(InputEvent::PointerUp {
            id: 1,
            position,
            time_ms: 10.0,
        })
        .map(|loc| loc.id.clone())
    }

    #[test]
    fn test_click_on_marker_selects_it() {
        let mut s = session();
        assert_eq!(click(&mut s, 410.0, 230.0).as_deref(), Some("ruins"));
        assert_eq!(s.selected().map(|l| l.name.as_str()), Some("ruins"));
        s.dismiss();
        assert!(s.selected().is_none());
    }

    #[test]
    fn test_click_on_empty_map_selects_nothing() {
        let mut s = session();
        assert_eq!(click(&mut s, 500.0, 500.0), None);
        assert!(s.selected().is_none());
    }

    #[test]
    fn test_click_maps_through_transform() {
        let mut s = session();
        // Pan so the keep (990, 500) is on screen at (990 - 400, 500 - 200).
        s.handle(InputEvent::PointerDown {
            id: 1,
            position: Point::new(700.0, 500.0),
            time_ms: 0.0,
        });
        s.handle(InputEvent::PointerMove {
            id: 1,
            position: Point::new(300.0, 300.0),
            time_ms: 16.0,
        });
        s.handle(InputEvent::PointerUp {
            id: 1,
            position: Point::new(300.0, 300.0),
            time_ms: 500.0,
        });
        assert_eq!(s.transform().translation(), Vector::new(-400.0, -200.0));
        assert!(s.selected().is_none());

        assert_eq!(click(&mut s, 600.0, 310.0).as_deref(), Some("keep"));
    }

    #[test]
    fn test_drag_over_marker_does_not_select() {
        let mut s = session();
        s.handle(InputEvent::PointerDown {
            id: 1,
            position: Point::new(410.0, 230.0),
            time_ms: 0.0,
        });
        s.handle(InputEvent::PointerMove {
            id: 1,
            position: Point::new(380.0, 230.0),
            time_ms: 16.0,
        });
        let picked = s.handle(InputEvent::PointerUp {
            id: 1,
            position: Point::new(380.0, 230.0),
            time_ms: 32.0,
        });
        assert!(picked.is_none());
    }

    #[test]
    fn test_markers_not_clickable_until_loaded() {
        let mut s = MapSession::new(MapConfig::default(), Size::new(800.0, 600.0)).unwrap();
        assert_eq!(click(&mut s, 410.0, 230.0), None);
        s.set_asset_state("/marker.webp", AssetState::Unavailable);
        assert_eq!(click(&mut s, 410.0, 230.0), None);
    }

    #[test]
    fn test_wheel_zoom_clamps() {
        let mut s = session();
        for _ in 0..50 {
            s.handle(InputEvent::Wheel {
                position: Point::new(400.0, 300.0),
                delta_y: -500.0,
            });
        }
        assert!((s.transform().scale() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_extreme_wheel_lands_on_limits() {
        let mut s = session();
        s.handle(InputEvent::Wheel {
            position: Point::new(400.0, 300.0),
            delta_y: -400_000.0,
        });
        assert!((s.transform().scale() - 1.5).abs() < 1e-12);

        s.handle(InputEvent::Wheel {
            position: Point::new(400.0, 300.0),
            delta_y: 400_000.0,
        });
        assert!((s.transform().scale() - 600.0 / 1024.0).abs() < 1e-12);
        assert_eq!(s.transform().scale(), s.camera().limits().min);
    }

    #[test]
    fn test_resize_keeps_session_valid() {
        let mut s = session();
        s.resize(Size::new(1200.0, 900.0));
        let limits = s.camera().limits();
        assert!((limits.min - 900.0 / 1024.0).abs() < 1e-9);
        assert!(limits.contains(s.transform().scale()));
    }

    #[test]
    fn test_glide_moves_camera() {
        let mut s = session();
        s.handle(InputEvent::PointerDown {
            id: 1,
            position: Point::new(400.0, 300.0),
            time_ms: 0.0,
        });
        for (i, x) in [380.0, 360.0].into_iter().enumerate() {
            s.handle(InputEvent::PointerMove {
                id: 1,
                position: Point::new(x, 300.0),
                time_ms: 16.0 * (i + 1) as f64,
            });
        }
        s.handle(InputEvent::PointerUp {
            id: 1,
            position: Point::new(360.0, 300.0),
            time_ms: 40.0,
        });
        assert!(s.is_gliding());
        let before = s.transform().tx();
        assert!(s.tick(56.0));
        assert!(s.transform().tx() < before);

        s.reset_view();
        assert!(!s.is_gliding());
        assert!(!s.tick(72.0));
    }

    #[test]
    fn test_frame_places_items_in_screen_space() {
        let mut s = session();
        s.handle(InputEvent::Wheel {
            position: Point::ORIGIN,
            delta_y: 10_000.0,
        });
        let frame = s.frame();
        let scale = frame.transform.scale();
        assert!((scale - 600.0 / 1024.0).abs() < 1e-9);

        let ruins = frame
            .items
            .iter()
            .find(|item| item.location_id.as_deref() == Some("ruins"))
            .unwrap();
        assert_eq!(ruins.state, AssetState::Ready);
        assert!((ruins.screen.origin.x - 400.0 * scale).abs() < 1e-9);
        assert!((ruins.screen.size.width - 48.0 * scale).abs() < 1e-9);
        assert!(frame.items[0].location_id.is_none());
    }

    #[test]
    fn test_select_by_id() {
        let mut s = session();
        assert_eq!(s.select("keep").map(|l| l.x), Some(990.0));
        assert!(s.select("tower").is_none());
        assert_eq!(s.selected().map(|l| l.id.as_str()), Some("keep"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = MapConfig {
            map: Size::new(-1.0, 1024.0),
            ..MapConfig::default()
        };
        let err = MapSession::new(config, Size::new(800.0, 600.0)).unwrap_err();
        assert_eq!(err, ConfigError::MapSize(Size::new(-1.0, 1024.0)));
    }
}
