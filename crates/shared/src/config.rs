use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::{Location, MapBounds, Size};

pub const DEFAULT_MAP_WIDTH: f64 = 1792.0;
pub const DEFAULT_MAP_HEIGHT: f64 = 1024.0;
pub const DEFAULT_MAX_SCALE: f64 = 1.5;
pub const DEFAULT_MARKER_SIZE: f64 = 48.0;

/// Largest accepted map side (px). Keeps the derived zoom floor well above zero.
pub const MAX_MAP_EXTENT: f64 = 1_000_000.0;

/// Everything a map session needs, fixed for the session's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MapConfig {
    /// World size of the background image.
    pub map: MapBounds,
    pub background: String,
    pub marker: String,
    pub marker_size: Size,
    pub locations: Vec<Location>,
    /// Zoom ceiling. The floor is derived from the viewport.
    pub max_scale: f64,
    pub initial_scale: f64,
    pub input: InputConfig,
}

impl Default for MapConfig {
    fn default() -> Self {
        MapConfig {
            map: Size::new(DEFAULT_MAP_WIDTH, DEFAULT_MAP_HEIGHT),
            background: "/bg.webp".to_string(),
            marker: "/marker.webp".to_string(),
            marker_size: Size::new(DEFAULT_MARKER_SIZE, DEFAULT_MARKER_SIZE),
            locations: vec![
                Location::new("ruins", "ruins", 400.0, 220.0),
                Location::new("keep", "keep", 990.0, 500.0),
            ],
            max_scale: DEFAULT_MAX_SCALE,
            initial_scale: 1.0,
            input: InputConfig::default(),
        }
    }
}

/// Gesture tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputConfig {
    /// Multiplier on drag deltas.
    pub drag_sensitivity: f64,
    /// Exponent applied to the pinch distance ratio.
    pub pinch_sensitivity: f64,
    /// Wheel zoom factor is `exp(-delta_y * wheel_sensitivity)`.
    pub wheel_sensitivity: f64,
    /// Max pointer travel (px) for a release to count as a click.
    pub click_threshold: f64,
    pub inertia: InertiaConfig,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            drag_sensitivity: 1.0,
            pinch_sensitivity: 1.0,
            wheel_sensitivity: 0.002,
            click_threshold: 5.0,
            inertia: InertiaConfig::default(),
        }
    }
}

/// Post-drag glide. Velocity is multiplied by `friction` once per 60 Hz
/// frame and the glide stops below `min_speed` (px/ms).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InertiaConfig {
    pub enabled: bool,
    pub friction: f64,
    pub min_speed: f64,
}

impl Default for InertiaConfig {
    fn default() -> Self {
        InertiaConfig {
            enabled: true,
            friction: 0.95,
            min_speed: 0.01,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Read { path: String, message: String },
    Parse(String),
    MapSize(Size),
    MarkerSize(Size),
    MaxScale(f64),
    InitialScale(f64),
    DuplicateLocation(String),
    UnnamedLocation,
    Input { field: &'static str, value: f64 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Read { path, message } => write!(f, "Failed to read {}: {}", path, message),
            ConfigError::Parse(message) => write!(f, "Failed to parse map config: {}", message),
            ConfigError::MapSize(size) => write!(
                f,
                "Map size must be positive and at most {} px a side, got {}",
                MAX_MAP_EXTENT, size
            ),
            ConfigError::MarkerSize(size) => write!(f, "Marker size must be positive, got {}", size),
            ConfigError::MaxScale(v) => write!(f, "Max scale must be positive, got {}", v),
            ConfigError::InitialScale(v) => {
                write!(f, "Initial scale must be positive and not above max scale, got {}", v)
            }
            ConfigError::DuplicateLocation(id) => write!(f, "Duplicate location id '{}'", id),
            ConfigError::UnnamedLocation => write!(f, "Location needs a name or an id"),
            ConfigError::Input { field, value } => write!(f, "Invalid {}: {}", field, value),
        }
    }
}

impl std::error::Error for ConfigError {}

impl MapConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let mut config: MapConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.fill_location_ids();
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_json(&data)?;
        tracing::info!(
            path = %path.display(),
            locations = config.locations.len(),
            "Loaded map config"
        );
        Ok(config)
    }

    /// Locations without an id get one derived from their name.
    pub fn fill_location_ids(&mut self) {
        for loc in self.locations.iter_mut().filter(|l| l.id.is_empty()) {
            loc.id = loc.slug();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.map.is_positive()
            || self.map.width > MAX_MAP_EXTENT
            || self.map.height > MAX_MAP_EXTENT
        {
            return Err(ConfigError::MapSize(self.map));
        }
        if !self.marker_size.is_positive() {
            return Err(ConfigError::MarkerSize(self.marker_size));
        }
        if !self.max_scale.is_finite() || self.max_scale <= 0.0 {
            return Err(ConfigError::MaxScale(self.max_scale));
        }
        if !self.initial_scale.is_finite()
            || self.initial_scale <= 0.0
            || self.initial_scale > self.max_scale
        {
            return Err(ConfigError::InitialScale(self.initial_scale));
        }

        let mut seen = HashSet::new();
        for loc in &self.locations {
            if loc.id.is_empty() {
                return Err(ConfigError::UnnamedLocation);
            }
            if !seen.insert(loc.id.as_str()) {
                return Err(ConfigError::DuplicateLocation(loc.id.clone()));
            }
        }

        self.input.validate()
    }
}

impl InputConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("drag sensitivity", self.drag_sensitivity),
            ("pinch sensitivity", self.pinch_sensitivity),
            ("wheel sensitivity", self.wheel_sensitivity),
            ("click threshold", self.click_threshold),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Input { field, value });
            }
        }
        // A zero floor would never end a glide.
        let min_speed = self.inertia.min_speed;
        if !min_speed.is_finite() || min_speed <= 0.0 {
            return Err(ConfigError::Input {
                field: "inertia min speed",
                value: min_speed,
            });
        }
        let friction = self.inertia.friction;
        if !(friction > 0.0 && friction < 1.0) {
            return Err(ConfigError::Input {
                field: "inertia friction",
                value: friction,
            });
        }
        Ok(())
    }
}
