//! Platform-free core of the map viewer: camera math, gesture recognition,
//! the marker scene and the session tying them together.

pub mod camera;
pub mod config;
pub mod input;
pub mod models;
pub mod scene;
pub mod session;
pub mod transform;

pub use config::{ConfigError, MapConfig};
pub use models::{AssetState, Location, Point, Size, Vector};
pub use session::{Frame, FrameItem, MapSession};
