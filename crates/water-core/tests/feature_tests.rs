// Lifecycle of the water feature against the recording backend.

mod common;

use common::{MockContext, MockScene};
use glam::Vec3;
use pollster::block_on;
use water_core::decoration::DecorationKind;
use water_core::{
    Camera, DebrisConfig, FeatureConfig, IslandConfig, Material, SceneGraph, WaterFeature,
    WrapMode,
};

fn small_config() -> FeatureConfig {
    FeatureConfig {
        islands: IslandConfig {
            count: 2,
            ..IslandConfig::default()
        },
        debris: DebrisConfig {
            count: 5,
            ..DebrisConfig::default()
        },
        ..FeatureConfig::default()
    }
}

fn viewer() -> Camera {
    Camera::new(
        Vec3::new(0.0, 20.0, 60.0),
        Vec3::ZERO,
        Vec3::Y,
        16.0 / 9.0,
        55f32.to_radians(),
        0.1,
        5000.0,
    )
}

fn initialized(ctx: &mut MockContext, scene: &mut MockScene) -> WaterFeature {
    let mut feature = WaterFeature::new(small_config());
    block_on(feature.initialize(ctx, scene));
    feature
}

#[test]
fn normal_map_is_loaded_once_and_tiled() {
    let mut ctx = MockContext::default();
    let mut scene = MockScene::default();
    let feature = initialized(&mut ctx, &mut scene);

    assert_eq!(ctx.texture_loads, vec![feature.config().water.normal_map.clone()]);
    let surface = feature.surface().unwrap();
    let texture = surface.normal_map().unwrap();
    assert_eq!(ctx.wrap_modes, vec![(texture, WrapMode::Repeat)]);
    assert_eq!(surface.uniforms().flags[1], 1.0);
}

#[test]
fn failed_normal_map_builds_flat_surface() {
    let mut ctx = MockContext {
        fail_texture: true,
        ..MockContext::default()
    };
    let mut scene = MockScene::default();
    let mut feature = initialized(&mut ctx, &mut scene);

    assert_eq!(ctx.texture_loads.len(), 1);
    assert!(ctx.wrap_modes.is_empty());
    let surface = feature.surface().unwrap();
    assert!(surface.normal_map().is_none());
    assert_eq!(surface.uniforms().flags[1], 0.0);

    let water = feature.water_mesh().unwrap();
    match &scene.meshes[&water].desc.material {
        Material::Water(material) => assert!(material.normal_map.is_none()),
        other => panic!("unexpected water material {other:?}"),
    }

    assert!(feature.update(0.016, &mut ctx, &mut scene, &viewer()).is_ok());
    assert_eq!(ctx.renders.len(), 1);
}

#[test]
fn water_mesh_is_hidden_only_during_reflection_pass() {
    let mut ctx = MockContext::default();
    let mut scene = MockScene::default();
    let mut feature = initialized(&mut ctx, &mut scene);
    let water = feature.water_mesh().unwrap();

    feature
        .update(0.016, &mut ctx, &mut scene, &viewer())
        .unwrap();

    let call = &ctx.renders[0];
    assert!(!call.visible.contains(&water));
    assert_eq!(call.visible.len(), feature.decorations().len());
    assert!(scene.is_visible(water));
}

#[test]
fn update_before_initialize_skips_reflection() {
    let mut ctx = MockContext::default();
    let mut scene = MockScene::default();
    let mut feature = WaterFeature::new(small_config());

    assert!(feature
        .update(0.5, &mut ctx, &mut scene, &viewer())
        .is_ok());
    assert!(ctx.renders.is_empty());
    assert!(!feature.is_initialized());
}

#[test]
fn time_advances_by_wave_speed() {
    let mut ctx = MockContext::default();
    let mut scene = MockScene::default();
    let mut feature = initialized(&mut ctx, &mut scene);
    let speed = feature.config().water.wave_speed;

    for _ in 0..4 {
        feature
            .update(0.25, &mut ctx, &mut scene, &viewer())
            .unwrap();
    }
    assert!((feature.time() - speed).abs() < 1e-5);
    assert_eq!(feature.surface().unwrap().shading.time, feature.time());

    let water = feature.water_mesh().unwrap();
    let pushed = scene.meshes[&water].water_uniforms.unwrap();
    assert_eq!(pushed.sun_direction_time[3], feature.time());
}

#[test]
fn render_failure_propagates_after_restoring_visibility() {
    let mut ctx = MockContext::default();
    let mut scene = MockScene::default();
    let mut feature = initialized(&mut ctx, &mut scene);
    let water = feature.water_mesh().unwrap();
    ctx.fail_render = true;

    let result = feature.update(0.016, &mut ctx, &mut scene, &viewer());
    assert!(result.is_err());
    assert!(scene.is_visible(water));
    assert_eq!(ctx.target, None);
}

#[test]
fn decorations_are_placed_and_debris_drifts() {
    let mut ctx = MockContext::default();
    let mut scene = MockScene::default();
    let mut feature = initialized(&mut ctx, &mut scene);

    assert_eq!(feature.decorations().len(), 7);
    assert_eq!(scene.meshes.len(), 8);

    let before: Vec<_> = feature
        .decorations()
        .iter()
        .map(|d| scene.meshes[&d.mesh].transform)
        .collect();
    feature
        .update(1.0, &mut ctx, &mut scene, &viewer())
        .unwrap();

    for (decoration, old) in feature.decorations().iter().zip(before) {
        let now = scene.meshes[&decoration.mesh].transform;
        match decoration.placement.kind {
            DecorationKind::Island => assert_eq!(now, old),
            DecorationKind::Debris(_) => assert_eq!(now, decoration.placement.transform()),
        }
    }
}

#[test]
fn same_seed_places_same_decorations() {
    let layout = || {
        let mut ctx = MockContext::default();
        let mut scene = MockScene::default();
        let feature = initialized(&mut ctx, &mut scene);
        feature
            .decorations()
            .iter()
            .map(|d| d.placement.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(layout(), layout());
}

#[test]
fn second_initialize_is_ignored() {
    let mut ctx = MockContext::default();
    let mut scene = MockScene::default();
    let mut feature = initialized(&mut ctx, &mut scene);
    let meshes = scene.meshes.len();

    block_on(feature.initialize(&mut ctx, &mut scene));
    assert_eq!(scene.meshes.len(), meshes);
    assert_eq!(ctx.targets.len(), 1);
    assert_eq!(ctx.texture_loads.len(), 1);
}

#[test]
fn cleanup_releases_everything_and_is_idempotent() {
    let mut ctx = MockContext::default();
    let mut scene = MockScene::default();
    let mut feature = initialized(&mut ctx, &mut scene);
    let target = feature.surface().unwrap().color_target();

    feature.cleanup(&mut ctx, &mut scene);
    assert!(scene.meshes.is_empty());
    assert_eq!(scene.removed.len(), 8);
    assert_eq!(ctx.disposed, vec![target]);
    assert!(feature.decorations().is_empty());
    assert!(feature.surface().is_none());

    feature.cleanup(&mut ctx, &mut scene);
    assert_eq!(ctx.disposed.len(), 1);
    assert_eq!(scene.removed.len(), 8);
}

#[test]
fn cleanup_before_initialize_is_a_no_op() {
    let mut ctx = MockContext::default();
    let mut scene = MockScene::default();
    let mut feature = WaterFeature::new(FeatureConfig::default());

    feature.cleanup(&mut ctx, &mut scene);
    assert!(ctx.disposed.is_empty());
    assert!(scene.removed.is_empty());
}
