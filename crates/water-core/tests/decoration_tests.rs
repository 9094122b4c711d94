// Weighted debris selection and debris animation.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::{rngs::StdRng, Rng, SeedableRng};
use water_core::decoration::{debris_position, pick_weighted, DebrisMotion, DebrisState};
use water_core::{DebrisConfig, DebrisKind, Shape};

fn kind(shape: Shape, probability: f32) -> DebrisKind {
    DebrisKind {
        shape,
        probability,
        color: Vec3::ONE,
    }
}

fn motion() -> DebrisMotion {
    DebrisMotion::from(&DebrisConfig::default())
}

fn state(phase: f32, direction: Vec2) -> DebrisState {
    DebrisState {
        initial_position: Vec3::new(12.0, 0.0, -40.0),
        phase,
        direction,
    }
}

#[test]
fn zero_draw_picks_first_weighted_kind() {
    let kinds = [
        kind(Shape::Sphere, 0.0),
        kind(Shape::Box, 0.4),
        kind(Shape::Cylinder, 0.6),
    ];
    assert_eq!(pick_weighted(&kinds, 0.0).unwrap().shape, Shape::Box);
}

#[test]
fn draw_just_below_one_picks_last_kind() {
    let kinds = DebrisConfig::default().kinds;
    let last = kinds.last().unwrap().shape;
    assert_eq!(pick_weighted(&kinds, 1.0 - f32::EPSILON).unwrap().shape, last);
}

#[test]
fn draw_beyond_total_mass_falls_back_to_last_kind() {
    let kinds = [kind(Shape::Box, 0.2), kind(Shape::Sphere, 0.3)];
    assert_eq!(pick_weighted(&kinds, 0.9).unwrap().shape, Shape::Sphere);
    assert!(pick_weighted(&[], 0.5).is_none());
}

#[test]
fn selection_frequencies_follow_probabilities() {
    let kinds = DebrisConfig::default().kinds;
    let mut rng = StdRng::seed_from_u64(2024);
    let trials = 20_000;
    let mut counts = [0usize; 3];
    for _ in 0..trials {
        let picked = pick_weighted(&kinds, rng.gen()).unwrap();
        let slot = kinds.iter().position(|k| k == picked).unwrap();
        counts[slot] += 1;
    }

    let tolerance = 4.0 / (trials as f32).sqrt();
    for (count, kind) in counts.iter().zip(&kinds) {
        let freq = *count as f32 / trials as f32;
        assert!(
            (freq - kind.probability).abs() < tolerance,
            "{:?}: {freq} vs {}",
            kind.shape,
            kind.probability
        );
    }
}

#[test]
fn bobbing_repeats_every_bob_period() {
    let motion = DebrisMotion {
        drift_offset: Vec3::ZERO,
        ..motion()
    };
    let s = state(1.1, Vec2::new(0.4, -0.7));
    let period = TAU / motion.bob_speed;
    for t in [0.0, 0.7, 3.2] {
        let a = debris_position(&s, &motion, t);
        let b = debris_position(&s, &motion, t + period);
        assert!((a - b).length() < 1e-4, "t={t}: {a} vs {b}");
    }
}

#[test]
fn drift_repeats_every_drift_period() {
    let motion = DebrisMotion {
        amplitude: 0.0,
        ..motion()
    };
    let s = state(0.3, Vec2::new(-0.9, 0.5));
    let period = TAU / motion.drift_speed;
    for t in [0.0, 2.5] {
        let a = debris_position(&s, &motion, t);
        let b = debris_position(&s, &motion, t + period);
        assert!((a - b).length() < 1e-3, "t={t}: {a} vs {b}");
    }
}

#[test]
fn start_position_is_initial_plus_phase_and_drift_terms() {
    let motion = motion();
    let s = state(0.8, Vec2::new(0.5, -0.25));
    let p = debris_position(&s, &motion, 0.0);
    assert_eq!(p.x, s.initial_position.x + s.direction.x * motion.drift_offset.x);
    assert_eq!(p.y, s.initial_position.y + motion.amplitude * s.phase.sin());
    assert_eq!(p.z, s.initial_position.z);

    let at_rest = state(0.0, Vec2::new(0.0, 0.6));
    assert_eq!(debris_position(&at_rest, &motion, 0.0), at_rest.initial_position);
}
