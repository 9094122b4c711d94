//! Procedural islands and floating debris around the water plane.
//!
//! Placement consumes draws from the caller's generator in a fixed order so a
//! seeded generator always produces the same layout.

use std::f32::consts::TAU;

use glam::{Mat4, Quat, Vec2, Vec3};
use rand::Rng;

use crate::config::{DebrisConfig, DebrisKind, IslandConfig, Shape};
use crate::scene::MeshId;

const FALLBACK_DEBRIS_COLOR: Vec3 = Vec3::splat(0.5);

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Point at `angle` radians around the Y axis, `radius` from the origin.
pub fn polar_position(angle: f32, radius: f32, y: f32) -> Vec3 {
    Vec3::new(angle.cos() * radius, y, angle.sin() * radius)
}

/// Walk `kinds` accumulating probability and return the first entry whose
/// running total reaches `draw`. Zero-probability entries are never chosen
/// by the walk; the last entry is the fallback when rounding leaves `draw`
/// above the total.
pub fn pick_weighted(kinds: &[DebrisKind], draw: f32) -> Option<&DebrisKind> {
    let mut cumulative = 0.0;
    for kind in kinds {
        if kind.probability <= 0.0 {
            continue;
        }
        cumulative += kind.probability;
        if cumulative >= draw {
            return Some(kind);
        }
    }
    kinds.last()
}

/// Animation constants shared by every debris item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebrisMotion {
    pub amplitude: f32,
    pub bob_speed: f32,
    pub drift_speed: f32,
    pub drift_offset: Vec3,
}

impl From<&DebrisConfig> for DebrisMotion {
    fn from(config: &DebrisConfig) -> Self {
        Self {
            amplitude: config.bob_amplitude,
            bob_speed: config.bob_speed,
            drift_speed: config.drift_speed,
            drift_offset: config.drift_offset,
        }
    }
}

/// Per-item animation state captured at placement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebrisState {
    pub initial_position: Vec3,
    pub phase: f32,
    pub direction: Vec2,
}

/// Debris position at `time`, recomputed from the initial position.
pub fn debris_position(state: &DebrisState, motion: &DebrisMotion, time: f32) -> Vec3 {
    let bob = motion.amplitude * (time * motion.bob_speed + state.phase).sin();
    let (drift_sin, drift_cos) = (time * motion.drift_speed).sin_cos();
    state.initial_position
        + Vec3::new(
            drift_cos * state.direction.x * motion.drift_offset.x,
            bob,
            drift_sin * state.direction.y * motion.drift_offset.z,
        )
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DecorationKind {
    Island,
    Debris(DebrisState),
}

/// A decoration before it is attached to the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    pub shape: Shape,
    pub position: Vec3,
    pub scale: Vec3,
    pub color: Vec3,
    pub kind: DecorationKind,
}

impl Placement {
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, Quat::IDENTITY, self.position)
    }
}

pub fn place_islands<G: Rng>(
    config: &IslandConfig,
    level: f32,
    rng: &mut G,
) -> Vec<Placement> {
    (0..config.count)
        .map(|_| {
            let angle = rng.gen::<f32>() * TAU;
            let radius = lerp(config.min_radius, config.max_radius, rng.gen());
            let scale = lerp(config.min_scale, config.max_scale, rng.gen());
            let height = lerp(config.min_height, config.max_height, rng.gen());
            Placement {
                shape: config.shape,
                position: polar_position(angle, radius, level),
                scale: Vec3::new(scale, height, scale),
                color: config.color,
                kind: DecorationKind::Island,
            }
        })
        .collect()
}

pub fn place_debris<G: Rng>(
    config: &DebrisConfig,
    level: f32,
    rng: &mut G,
) -> Vec<Placement> {
    (0..config.count)
        .map(|_| {
            let angle = rng.gen::<f32>() * TAU;
            let radius = lerp(config.min_radius, config.max_radius, rng.gen());
            let scale = lerp(config.min_scale, config.max_scale, rng.gen());
            let (shape, color) = match pick_weighted(&config.kinds, rng.gen()) {
                Some(kind) => (kind.shape, kind.color),
                None => (Shape::default(), FALLBACK_DEBRIS_COLOR),
            };
            let phase = rng.gen::<f32>() * TAU;
            let direction = Vec2::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0));
            let position = polar_position(angle, radius, level);
            Placement {
                shape,
                position,
                scale: Vec3::splat(scale),
                color,
                kind: DecorationKind::Debris(DebrisState {
                    initial_position: position,
                    phase,
                    direction,
                }),
            }
        })
        .collect()
}

/// A placed decoration attached to the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct Decoration {
    pub mesh: MeshId,
    pub placement: Placement,
}

impl Decoration {
    /// Move debris to its position at `time`; islands stay put.
    /// Returns the new transform when the decoration moved.
    pub fn animate(&mut self, motion: &DebrisMotion, time: f32) -> Option<Mat4> {
        match self.placement.kind {
            DecorationKind::Island => None,
            DecorationKind::Debris(state) => {
                self.placement.position = debris_position(&state, motion, time);
                Some(self.placement.transform())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn lerp_hits_endpoints() {
        assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
        assert_eq!(lerp(2.0, 6.0, 0.25), 3.0);
    }

    #[test]
    fn islands_stay_inside_configured_ring() {
        let config = IslandConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        let islands = place_islands(&config, 1.5, &mut rng);
        assert_eq!(islands.len(), config.count);
        for island in &islands {
            let r = Vec2::new(island.position.x, island.position.z).length();
            assert!(r >= config.min_radius - 1e-3 && r <= config.max_radius + 1e-3);
            assert_eq!(island.position.y, 1.5);
            assert!(island.scale.y >= config.min_height && island.scale.y <= config.max_height);
            assert_eq!(island.shape, config.shape);
        }
    }

    #[test]
    fn same_seed_gives_same_layout() {
        let config = DebrisConfig::default();
        let a = place_debris(&config, 0.0, &mut StdRng::seed_from_u64(42));
        let b = place_debris(&config, 0.0, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn empty_palette_falls_back_to_cylinder() {
        let config = DebrisConfig {
            count: 3,
            kinds: Vec::new(),
            ..DebrisConfig::default()
        };
        let debris = place_debris(&config, 0.0, &mut StdRng::seed_from_u64(1));
        assert!(debris.iter().all(|d| d.shape == Shape::Cylinder));
    }
}
