use std::collections::HashMap;

use crate::models::{AssetState, Location, MapBounds, Point, Rect, Size};

#[derive(Debug, Clone, PartialEq)]
pub enum SceneItemKind {
    Background,
    Marker(Location),
}

/// One drawable thing with its world-space box and the asset that draws it.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneItem {
    pub kind: SceneItemKind,
    pub bounds: Rect,
    pub asset: String,
}

impl SceneItem {
    pub fn location(&self) -> Option<&Location> {
        match &self.kind {
            SceneItemKind::Marker(loc) => Some(loc),
            SceneItemKind::Background => None,
        }
    }
}

/// Background plus markers, in draw order (background first).
///
/// Items whose asset hasn't loaded are absent: they are neither drawn nor
/// hit-tested.
#[derive(Debug, Clone)]
pub struct Scene {
    items: Vec<SceneItem>,
    assets: HashMap<String, AssetState>,
}

impl Scene {
    pub fn new(
        map: MapBounds,
        background: &str,
        locations: &[Location],
        marker: &str,
        marker_size: Size,
    ) -> Self {
        let mut items = Vec::with_capacity(locations.len() + 1);
        items.push(SceneItem {
            kind: SceneItemKind::Background,
            bounds: Rect::new(Point::ORIGIN, map),
            asset: background.to_string(),
        });
        items.extend(locations.iter().map(|loc| SceneItem {
            kind: SceneItemKind::Marker(loc.clone()),
            bounds: Rect::new(loc.position(), marker_size),
            asset: marker.to_string(),
        }));

        let assets = items
            .iter()
            .map(|item| (item.asset.clone(), AssetState::Pending))
            .collect();

        Scene { items, assets }
    }

    pub fn items(&self) -> &[SceneItem] {
        &self.items
    }

    /// Items ready to draw, in draw order.
    pub fn visible_items(&self) -> impl Iterator<Item = &SceneItem> {
        self.items.iter().filter(|item| self.is_ready(&item.asset))
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.items.iter().filter_map(SceneItem::location)
    }

    pub fn location(&self, id: &str) -> Option<&Location> {
        self.locations().find(|loc| loc.id == id)
    }

    /// Distinct asset keys, for the loader.
    pub fn asset_keys(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }

    pub fn asset_state(&self, key: &str) -> Option<AssetState> {
        self.assets.get(key).copied()
    }

    pub fn is_ready(&self, key: &str) -> bool {
        self.asset_state(key) == Some(AssetState::Ready)
    }

    /// Record a loader result. Returns whether anything changed; unknown
    /// keys are ignored.
    pub fn set_asset_state(&mut self, key: &str, state: AssetState) -> bool {
        let Some(current) = self.assets.get_mut(key) else {
            tracing::debug!(key, "Ignoring state for unknown asset");
            return false;
        };
        if *current == state {
            return false;
        }
        match state {
            AssetState::Unavailable => {
                tracing::warn!(key, "Asset unavailable, items using it will not be drawn")
            }
            _ => tracing::debug!(key, %state, "Asset state changed"),
        }
        *current = state;
        true
    }

    /// Topmost loaded marker whose box contains `world`.
    pub fn hit_test(&self, world: Point) -> Option<&Location> {
        self.items
            .iter()
            .rev()
            .filter(|item| item.bounds.contains(world) && self.is_ready(&item.asset))
            .find_map(SceneItem::location)
    }
}
