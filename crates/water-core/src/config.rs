//! Configuration consumed by [`crate::WaterFeature`].
//!
//! Values default to the tuned numbers in [`crate::constants`]; hosts override
//! individual fields with struct update syntax.

use glam::Vec3;

use crate::constants::*;

/// Which faces of the water plane are rasterised.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// Geometry primitive used for a decoration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Shape {
    Box,
    Sphere,
    #[default]
    Cylinder,
}

#[derive(Clone, Debug)]
pub struct WaterConfig {
    pub size: f32,
    pub segments: u32,
    pub level: f32,
    pub wave_speed: f32,
    pub distortion_scale: f32,
    pub sun_direction: Vec3,
    pub sun_color: Vec3,
    pub water_color: Vec3,
    pub alpha: f32,
    pub fog: bool,
    pub side: Side,
    pub normal_map: String,
    pub texture_width: u32,
    pub texture_height: u32,
    pub clip_bias: f32,
    pub seed: u64,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            size: WATER_PLANE_SIZE,
            segments: WATER_PLANE_SEGMENTS,
            level: WATER_LEVEL,
            wave_speed: WAVE_SPEED,
            distortion_scale: WATER_DISTORTION_SCALE,
            sun_direction: Vec3::from(DEFAULT_SUN_DIRECTION),
            sun_color: Vec3::from(WATER_SUN_COLOR),
            water_color: Vec3::from(WATER_COLOR),
            alpha: DEFAULT_ALPHA,
            fog: true,
            side: Side::Front,
            normal_map: WATER_NORMAL_MAP.to_string(),
            texture_width: DEFAULT_TEXTURE_SIZE,
            texture_height: DEFAULT_TEXTURE_SIZE,
            clip_bias: DEFAULT_CLIP_BIAS,
            seed: PLACEMENT_SEED,
        }
    }
}

#[derive(Clone, Debug)]
pub struct IslandConfig {
    pub count: usize,
    pub shape: Shape,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_height: f32,
    pub max_height: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub color: Vec3,
}

impl Default for IslandConfig {
    fn default() -> Self {
        Self {
            count: ISLAND_COUNT,
            shape: Shape::Cylinder,
            min_radius: ISLAND_MIN_RADIUS,
            max_radius: ISLAND_MAX_RADIUS,
            min_height: ISLAND_MIN_HEIGHT,
            max_height: ISLAND_MAX_HEIGHT,
            min_scale: ISLAND_MIN_SCALE,
            max_scale: ISLAND_MAX_SCALE,
            color: Vec3::from(ISLAND_COLOR),
        }
    }
}

/// One weighted entry of the debris palette.
#[derive(Clone, Debug, PartialEq)]
pub struct DebrisKind {
    pub shape: Shape,
    pub probability: f32,
    pub color: Vec3,
}

#[derive(Clone, Debug)]
pub struct DebrisConfig {
    pub count: usize,
    /// Probabilities should sum to at most 1; the last entry absorbs any
    /// remainder.
    pub kinds: Vec<DebrisKind>,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub bob_amplitude: f32,
    pub bob_speed: f32,
    pub drift_speed: f32,
    pub drift_offset: Vec3,
}

impl Default for DebrisConfig {
    fn default() -> Self {
        let kind = |shape, (probability, color): (f32, [f32; 3])| DebrisKind {
            shape,
            probability,
            color: Vec3::from(color),
        };
        Self {
            count: DEBRIS_COUNT,
            kinds: vec![
                kind(Shape::Box, DEBRIS_CRATE),
                kind(Shape::Sphere, DEBRIS_BUOY),
                kind(Shape::Cylinder, DEBRIS_LOG),
            ],
            min_radius: DEBRIS_MIN_RADIUS,
            max_radius: DEBRIS_MAX_RADIUS,
            min_scale: DEBRIS_MIN_SCALE,
            max_scale: DEBRIS_MAX_SCALE,
            bob_amplitude: DEBRIS_BOB_AMPLITUDE,
            bob_speed: DEBRIS_BOB_SPEED,
            drift_speed: DEBRIS_DRIFT_SPEED,
            drift_offset: Vec3::from(DEBRIS_DRIFT_OFFSET),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct FeatureConfig {
    pub water: WaterConfig,
    pub islands: IslandConfig,
    pub debris: DebrisConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_debris_probabilities_do_not_exceed_one() {
        let total: f32 = DebrisConfig::default()
            .kinds
            .iter()
            .map(|k| k.probability)
            .sum();
        assert!(total <= 1.0 + 1e-6, "total probability {total}");
    }

    #[test]
    fn default_ranges_are_ordered() {
        let islands = IslandConfig::default();
        assert!(islands.min_radius <= islands.max_radius);
        assert!(islands.min_height <= islands.max_height);
        let debris = DebrisConfig::default();
        assert!(debris.min_radius <= debris.max_radius);
        assert!(debris.min_scale <= debris.max_scale);
    }
}
