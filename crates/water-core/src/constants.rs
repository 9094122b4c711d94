// Tuning constants shared by the core crate and the front-ends.

// Reflection surface defaults
pub const DEFAULT_TEXTURE_SIZE: u32 = 512;
pub const DEFAULT_SUN_DIRECTION: [f32; 3] = [0.70707, 0.70707, 0.0];
pub const DEFAULT_SUN_COLOR: [f32; 3] = [0.498, 0.498, 0.498]; // mid grey
pub const DEFAULT_WATER_COLOR: [f32; 3] = [0.498, 0.498, 0.498]; // mid grey
pub const DEFAULT_DISTORTION_SCALE: f32 = 20.0;
pub const DEFAULT_ALPHA: f32 = 1.0;
pub const DEFAULT_NORMAL_SIZE: f32 = 1.0; // normal map tiling factor
pub const DEFAULT_CLIP_BIAS: f32 = 0.0;

// Water feature
pub const WATER_PLANE_SIZE: f32 = 2000.0;
pub const WATER_PLANE_SEGMENTS: u32 = 8;
pub const WATER_LEVEL: f32 = 0.0;
pub const WAVE_SPEED: f32 = 0.6; // internal seconds per wall-clock second
pub const WATER_DISTORTION_SCALE: f32 = 3.7;
pub const WATER_SUN_COLOR: [f32; 3] = [1.0, 1.0, 1.0];
pub const WATER_COLOR: [f32; 3] = [0.0, 0.118, 0.059]; // deep green-blue
pub const WATER_NORMAL_MAP: &str = "assets/textures/waternormals.jpg";
pub const PLACEMENT_SEED: u64 = 42;

// Islands
pub const ISLAND_COUNT: usize = 6;
pub const ISLAND_MIN_RADIUS: f32 = 120.0;
pub const ISLAND_MAX_RADIUS: f32 = 600.0;
pub const ISLAND_MIN_HEIGHT: f32 = 8.0;
pub const ISLAND_MAX_HEIGHT: f32 = 30.0;
pub const ISLAND_MIN_SCALE: f32 = 20.0;
pub const ISLAND_MAX_SCALE: f32 = 60.0;
pub const ISLAND_COLOR: [f32; 3] = [0.76, 0.70, 0.50];

// Debris
pub const DEBRIS_COUNT: usize = 24;
pub const DEBRIS_MIN_RADIUS: f32 = 20.0;
pub const DEBRIS_MAX_RADIUS: f32 = 250.0;
pub const DEBRIS_MIN_SCALE: f32 = 0.8;
pub const DEBRIS_MAX_SCALE: f32 = 3.0;
pub const DEBRIS_BOB_AMPLITUDE: f32 = 0.35;
pub const DEBRIS_BOB_SPEED: f32 = 1.2; // radians per internal second
pub const DEBRIS_DRIFT_SPEED: f32 = 0.15;
pub const DEBRIS_DRIFT_OFFSET: [f32; 3] = [6.0, 0.0, 6.0];

// Weighted debris palette: (probability, rgb)
pub const DEBRIS_CRATE: (f32, [f32; 3]) = (0.5, [0.45, 0.30, 0.16]);
pub const DEBRIS_BUOY: (f32, [f32; 3]) = (0.2, [0.85, 0.25, 0.15]);
pub const DEBRIS_LOG: (f32, [f32; 3]) = (0.3, [0.36, 0.25, 0.14]);
