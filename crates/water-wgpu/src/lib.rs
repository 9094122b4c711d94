pub mod helpers;
pub mod renderer;
pub mod scene;
mod targets;
mod textures;

pub use helpers::DEPTH_FORMAT;
pub use renderer::{clamp_viewport, WgpuRenderer};
pub use scene::{Lighting, WgpuScene};
pub use targets::TARGET_FORMAT;
