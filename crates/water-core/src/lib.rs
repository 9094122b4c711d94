pub mod camera;
pub mod config;
pub mod constants;
pub mod decoration;
pub mod error;
pub mod feature;
pub mod geometry;
pub mod plane;
pub mod render_state;
pub mod scene;
pub mod surface;
pub mod texture;

pub static SCENE_WGSL: &str = include_str!("../shaders/scene.wgsl");
pub static WATER_WGSL: &str = include_str!("../shaders/water.wgsl");

pub use camera::Camera;
pub use config::*;
pub use error::*;
pub use feature::WaterFeature;
pub use geometry::{Geometry, MeshData, Vertex};
pub use render_state::*;
pub use scene::*;
pub use surface::*;
pub use texture::*;
