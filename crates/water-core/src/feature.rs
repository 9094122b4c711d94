//! Water feature: owns the reflection surface, the visible water mesh and the
//! decorations floating around it, and runs their per-frame update.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3};
use rand::{rngs::StdRng, SeedableRng};

use crate::camera::Camera;
use crate::config::FeatureConfig;
use crate::decoration::{place_debris, place_islands, DebrisMotion, Decoration, Placement};
use crate::error::RenderResult;
use crate::geometry::Geometry;
use crate::render_state::RenderContext;
use crate::scene::{Material, MeshDescriptor, MeshId, SceneGraph, WorldTransform};
use crate::surface::{ReflectionSurface, SurfaceOptions};
use crate::texture::{TextureLoader, WrapMode};

/// World matrix of a water plane at height `level`: the XY plane generator
/// output laid flat so its face normal points up.
pub fn plane_world_matrix(level: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, level, 0.0)) * Mat4::from_rotation_x(-FRAC_PI_2)
}

struct WaterMesh {
    id: MeshId,
    // Static after placement; the surface holds a weak reference to it.
    world: WorldTransform,
}

pub struct WaterFeature {
    config: FeatureConfig,
    motion: DebrisMotion,
    rng: StdRng,
    time: f32,
    surface: Option<ReflectionSurface>,
    water: Option<WaterMesh>,
    decorations: Vec<Decoration>,
}

impl WaterFeature {
    pub fn new(config: FeatureConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.water.seed);
        let motion = DebrisMotion::from(&config.debris);
        Self {
            config,
            motion,
            rng,
            time: 0.0,
            surface: None,
            water: None,
            decorations: Vec::new(),
        }
    }

    /// Load the normal map, build the reflection surface and water mesh, then
    /// place decorations.
    ///
    /// A normal map that fails to load is not an error: the surface is built
    /// without one.
    pub async fn initialize<R>(&mut self, ctx: &mut R, scene: &mut R::Scene)
    where
        R: RenderContext + TextureLoader,
    {
        if self.surface.is_some() {
            log::warn!("[water] initialize called on an initialized feature; ignoring");
            return;
        }

        let water = &self.config.water;
        let normal_map = match ctx.load_texture(&water.normal_map).await {
            Ok(texture) => {
                ctx.set_wrap_mode(texture, WrapMode::Repeat);
                Some(texture)
            }
            Err(err) => {
                log::warn!(
                    "[water] normal map '{}' unavailable, using flat surface: {err}",
                    water.normal_map
                );
                None
            }
        };

        let mut surface = ReflectionSurface::new(
            ctx,
            SurfaceOptions {
                texture_width: water.texture_width,
                texture_height: water.texture_height,
                normal_map,
                sun_direction: water.sun_direction,
                sun_color: water.sun_color,
                water_color: water.water_color,
                distortion_scale: water.distortion_scale,
                alpha: water.alpha,
                side: water.side,
                fog: water.fog,
                clip_bias: water.clip_bias,
                ..SurfaceOptions::default()
            },
        );

        let world = WorldTransform::new(plane_world_matrix(water.level));
        let id = scene.add_mesh(MeshDescriptor {
            label: "water".to_string(),
            geometry: Geometry::Plane {
                size: water.size,
                segments: water.segments,
            },
            material: Material::Water(surface.material()),
            transform: world.get(),
        });
        surface.bind_world_transform(world.downgrade());
        scene.set_water_uniforms(id, &surface.uniforms());

        log::info!(
            "[water] initialized {}x{} plane ({} segments) at y={}",
            water.size,
            water.size,
            water.segments,
            water.level
        );
        self.surface = Some(surface);
        self.water = Some(WaterMesh { id, world });

        self.create_decorations(scene);
    }

    fn create_decorations<S: SceneGraph + ?Sized>(&mut self, scene: &mut S) {
        if !self.decorations.is_empty() {
            return;
        }
        let level = self.config.water.level;
        let islands = place_islands(&self.config.islands, level, &mut self.rng);
        let debris = place_debris(&self.config.debris, level, &mut self.rng);
        log::info!(
            "[decor] placing {} islands and {} debris",
            islands.len(),
            debris.len()
        );

        let labelled = islands
            .into_iter()
            .enumerate()
            .map(|(i, p)| (format!("island-{i}"), p))
            .chain(
                debris
                    .into_iter()
                    .enumerate()
                    .map(|(i, p)| (format!("debris-{i}"), p)),
            );
        for (label, placement) in labelled {
            let mesh = scene.add_mesh(decoration_descriptor(label, &placement));
            self.decorations.push(Decoration { mesh, placement });
        }
    }

    /// Advance time by `dt` seconds, render the reflection and animate debris.
    ///
    /// Without a surface the reflection pass is skipped. A failed pass is
    /// returned after the water mesh is visible again and decorations moved.
    pub fn update<R: RenderContext + ?Sized>(
        &mut self,
        dt: f32,
        ctx: &mut R,
        scene: &mut R::Scene,
        camera: &Camera,
    ) -> RenderResult<()> {
        self.time += dt * self.config.water.wave_speed;

        let mut result = Ok(());
        if let (Some(surface), Some(water)) = (self.surface.as_mut(), self.water.as_ref()) {
            surface.update_time(self.time);
            surface.update_texture_matrix(camera);
            scene.set_visible(water.id, false);
            result = surface.render(ctx, scene, camera);
            scene.set_visible(water.id, true);
            scene.set_water_uniforms(water.id, &surface.uniforms());
        }

        for decoration in &mut self.decorations {
            if let Some(transform) = decoration.animate(&self.motion, self.time) {
                scene.set_transform(decoration.mesh, transform);
            }
        }
        result
    }

    /// Remove every mesh from the scene and release the mirror target.
    /// Safe to call repeatedly and before initialization.
    pub fn cleanup<R: RenderContext + ?Sized>(&mut self, ctx: &mut R, scene: &mut R::Scene) {
        let had_water = self.water.is_some();
        if let Some(water) = self.water.take() {
            scene.remove_mesh(water.id);
        }
        let decorations = self.decorations.len();
        for decoration in self.decorations.drain(..) {
            scene.remove_mesh(decoration.mesh);
        }
        if let Some(surface) = self.surface.take() {
            surface.dispose(ctx);
        }
        if had_water || decorations > 0 {
            log::info!("[water] cleaned up water mesh and {decorations} decorations");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&ReflectionSurface> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut ReflectionSurface> {
        self.surface.as_mut()
    }

    pub fn water_mesh(&self) -> Option<MeshId> {
        self.water.as_ref().map(|w| w.id)
    }

    pub fn water_world_matrix(&self) -> Option<Mat4> {
        self.water.as_ref().map(|w| w.world.get())
    }

    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }
}

fn decoration_descriptor(label: String, placement: &Placement) -> MeshDescriptor {
    MeshDescriptor {
        label,
        geometry: Geometry::for_shape(placement.shape),
        material: Material::Flat {
            color: placement.color,
            emissive: 0.0,
        },
        transform: placement.transform(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_world_matrix_faces_up() {
        let world = plane_world_matrix(2.5);
        let normal = world.transform_vector3(Vec3::Z);
        assert!((normal - Vec3::Y).length() < 1e-5);
        assert!((world.w_axis.y - 2.5).abs() < 1e-6);
    }
}
