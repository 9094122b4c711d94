//! Planar reflection surface: off-screen mirror target, mirror camera and the
//! world-to-texture transform the water shader samples through.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use crate::camera::Camera;
use crate::config::Side;
use crate::constants::*;
use crate::error::RenderResult;
use crate::plane::{
    apply_oblique_clip, extract_rotation, plane_from_normal_and_point, reflect_point,
    reflect_vector, transform_plane, TEXTURE_BIAS,
};
use crate::render_state::{
    FilterMode, RenderContext, RenderStateGuard, RenderTargetDescriptor, RenderTargetId, Viewport,
};
use crate::scene::{WaterMaterial, WorldTransformRef};
use crate::texture::TextureId;

/// Construction options for [`ReflectionSurface`].
#[derive(Clone, Debug)]
pub struct SurfaceOptions {
    pub texture_width: u32,
    pub texture_height: u32,
    pub normal_map: Option<TextureId>,
    pub sun_direction: Vec3,
    pub sun_color: Vec3,
    pub water_color: Vec3,
    pub eye: Vec3,
    pub distortion_scale: f32,
    pub alpha: f32,
    /// Tiling factor of the normal map.
    pub size: f32,
    pub time: f32,
    pub side: Side,
    pub fog: bool,
    pub clip_bias: f32,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            texture_width: DEFAULT_TEXTURE_SIZE,
            texture_height: DEFAULT_TEXTURE_SIZE,
            normal_map: None,
            sun_direction: Vec3::from(DEFAULT_SUN_DIRECTION),
            sun_color: Vec3::from(DEFAULT_SUN_COLOR),
            water_color: Vec3::from(DEFAULT_WATER_COLOR),
            eye: Vec3::ZERO,
            distortion_scale: DEFAULT_DISTORTION_SCALE,
            alpha: DEFAULT_ALPHA,
            size: DEFAULT_NORMAL_SIZE,
            time: 0.0,
            side: Side::Front,
            fog: false,
            clip_bias: DEFAULT_CLIP_BIAS,
        }
    }
}

/// Externally driven inputs of the water shading stage.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadingParams {
    pub time: f32,
    pub size: f32,
    pub distortion_scale: f32,
    pub alpha: f32,
    pub sun_direction: Vec3,
    pub sun_color: Vec3,
    pub water_color: Vec3,
    pub eye: Vec3,
    pub normal_map: Option<TextureId>,
    pub side: Side,
    pub fog: bool,
}

/// GPU layout of the water uniform block (`water.wgsl`, group 1).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct WaterUniforms {
    /// Local plane position -> reflection texture coordinates.
    pub texture_matrix: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub sun_color_alpha: [f32; 4],
    pub sun_direction_time: [f32; 4],
    pub eye_size: [f32; 4],
    pub water_color_distortion: [f32; 4],
    /// x: fog enabled, y: normal map bound.
    pub flags: [f32; 4],
}

pub struct ReflectionSurface {
    color_target: RenderTargetId,
    target_size: (u32, u32),
    mirror_camera: Camera,
    texture_matrix: Mat4,
    world_transform: Option<WorldTransformRef>,
    clip_bias: f32,
    facing_away: bool,
    pub shading: ShadingParams,
}

impl ReflectionSurface {
    pub fn new<R: RenderContext + ?Sized>(ctx: &mut R, options: SurfaceOptions) -> Self {
        let color_target = ctx.create_render_target(&RenderTargetDescriptor {
            label: "water_reflection",
            width: options.texture_width,
            height: options.texture_height,
            filter: FilterMode::Linear,
        });
        log::debug!(
            "[reflection] created {}x{} mirror target {:?} (normal map: {:?})",
            options.texture_width,
            options.texture_height,
            color_target,
            options.normal_map
        );
        Self {
            color_target,
            target_size: (options.texture_width, options.texture_height),
            mirror_camera: Camera::default(),
            texture_matrix: Mat4::IDENTITY,
            world_transform: None,
            clip_bias: options.clip_bias,
            facing_away: false,
            shading: ShadingParams {
                time: options.time,
                size: options.size,
                distortion_scale: options.distortion_scale,
                alpha: options.alpha,
                sun_direction: options.sun_direction.normalize_or_zero(),
                sun_color: options.sun_color,
                water_color: options.water_color,
                eye: options.eye,
                normal_map: options.normal_map,
                side: options.side,
                fog: options.fog,
            },
        }
    }

    /// Point the surface at the world matrix of the mesh that displays it.
    pub fn bind_world_transform(&mut self, transform: WorldTransformRef) {
        self.world_transform = Some(transform);
    }

    /// World matrix of the bound mesh, identity when unbound or expired.
    pub fn world_matrix(&self) -> Mat4 {
        self.world_transform
            .as_ref()
            .and_then(WorldTransformRef::get)
            .unwrap_or(Mat4::IDENTITY)
    }

    /// Recompute the mirror camera and texture matrix for `camera`.
    ///
    /// The plane faces along its local +Z axis. When the camera sits behind
    /// the plane the previous mirror pose and matrices are kept (only the far
    /// plane follows the camera) and the next [`ReflectionSurface::render`]
    /// does nothing.
    pub fn update_texture_matrix(&mut self, camera: &Camera) {
        let world = self.world_matrix();
        let plane_position = world.w_axis.truncate();
        let camera_position = camera.world_position();
        let normal = (extract_rotation(world) * Vec3::Z).normalize();
        self.mirror_camera.zfar = camera.zfar;

        self.facing_away = (plane_position - camera_position).dot(normal) > 0.0;
        if self.facing_away {
            return;
        }

        let camera_world = camera.world_matrix();
        let look_at = camera_position + camera_world.transform_vector3(Vec3::NEG_Z);
        let eye = reflect_point(camera_position, plane_position, normal);
        let target = reflect_point(look_at, plane_position, normal);
        let up = reflect_vector(camera_world.transform_vector3(Vec3::Y), normal);

        let projection = camera.projection_matrix();
        self.mirror_camera.look_at(eye, target, up);
        self.mirror_camera.set_projection_matrix(projection);

        let view = self.mirror_camera.view_matrix();
        self.texture_matrix = TEXTURE_BIAS * projection * view;

        let clip_plane = transform_plane(plane_from_normal_and_point(normal, plane_position), view);
        let mut oblique = projection;
        apply_oblique_clip(&mut oblique, clip_plane, self.clip_bias);
        self.mirror_camera.set_projection_matrix(oblique);
    }

    /// Draw `scene` from the mirror camera into the owned target.
    ///
    /// The caller hides the water mesh around this call. Renderer target,
    /// XR flag, shadow auto-update and viewport are restored on every exit.
    pub fn render<R: RenderContext + ?Sized>(
        &mut self,
        ctx: &mut R,
        scene: &R::Scene,
        camera: &Camera,
    ) -> RenderResult<()> {
        self.shading.eye = camera.world_position();
        if self.facing_away {
            log::trace!("[reflection] camera behind water plane, skipping pass");
            return Ok(());
        }

        let mut guard = RenderStateGuard::acquire(ctx);
        guard.set_xr_enabled(false);
        guard.set_shadow_auto_update(false);
        guard.set_render_target(Some(self.color_target));
        guard.set_viewport(Viewport::new(
            self.target_size.0 as f32,
            self.target_size.1 as f32,
        ));
        if !guard.auto_clear() {
            guard.clear_depth()?;
        }
        guard.render(scene, &self.mirror_camera)
    }

    pub fn update_time(&mut self, time: f32) {
        self.shading.time = time;
    }

    /// Release the mirror target.
    pub fn dispose<R: RenderContext + ?Sized>(self, ctx: &mut R) {
        log::debug!("[reflection] disposing mirror target {:?}", self.color_target);
        ctx.dispose_render_target(self.color_target);
    }

    pub fn color_target(&self) -> RenderTargetId {
        self.color_target
    }

    pub fn mirror_camera(&self) -> &Camera {
        &self.mirror_camera
    }

    /// World position -> reflection texture coordinates (xy in \[0, 1\] when
    /// inside the mirror frustum).
    pub fn texture_matrix(&self) -> Mat4 {
        self.texture_matrix
    }

    /// Local plane position -> reflection texture coordinates.
    pub fn model_texture_matrix(&self) -> Mat4 {
        self.texture_matrix * self.world_matrix()
    }

    pub fn is_facing_away(&self) -> bool {
        self.facing_away
    }

    pub fn normal_map(&self) -> Option<TextureId> {
        self.shading.normal_map
    }

    pub fn material(&self) -> WaterMaterial {
        WaterMaterial {
            mirror_target: self.color_target,
            normal_map: self.shading.normal_map,
            side: self.shading.side,
            fog: self.shading.fog,
        }
    }

    pub fn uniforms(&self) -> WaterUniforms {
        let s = &self.shading;
        WaterUniforms {
            texture_matrix: self.model_texture_matrix().to_cols_array_2d(),
            model: self.world_matrix().to_cols_array_2d(),
            sun_color_alpha: s.sun_color.extend(s.alpha).to_array(),
            sun_direction_time: s.sun_direction.extend(s.time).to_array(),
            eye_size: s.eye.extend(s.size).to_array(),
            water_color_distortion: s.water_color.extend(s.distortion_scale).to_array(),
            flags: [
                if s.fog { 1.0 } else { 0.0 },
                if s.normal_map.is_some() { 1.0 } else { 0.0 },
                0.0,
                0.0,
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_block_is_vec4_aligned() {
        assert_eq!(std::mem::size_of::<WaterUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<WaterUniforms>(), 208);
    }

    #[test]
    fn default_options_use_documented_values() {
        let options = SurfaceOptions::default();
        assert_eq!((options.texture_width, options.texture_height), (512, 512));
        assert!((options.distortion_scale - 20.0).abs() < 1e-6);
        assert!((options.sun_direction.x - 0.70707).abs() < 1e-6);
        assert!(options.normal_map.is_none());
    }
}
