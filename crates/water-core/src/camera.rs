//! Perspective camera shared by the host frame loop and the mirror pass.
//!
//! Projection matrices follow the OpenGL clip convention (z in \[-1, 1\]) so
//! the oblique near-plane math stays in its textbook form. Backends that use a
//! \[0, 1\] depth range convert with [`Camera::view_projection`].

use glam::{Mat4, Vec3, Vec4};

/// Remaps OpenGL clip-space depth (\[-1, 1\]) to the wgpu range (\[0, 1\]).
pub const GL_TO_WGPU: Mat4 = Mat4::from_cols(
    Vec4::new(1.0, 0.0, 0.0, 0.0),
    Vec4::new(0.0, 1.0, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 0.5, 0.0),
    Vec4::new(0.0, 0.0, 0.5, 1.0),
);

/// Simple right-handed camera description with perspective projection.
///
/// The projection matrix is cached rather than derived on demand: the mirror
/// camera replaces it with a copy of the real camera's matrix and then rewrites
/// its third row.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
    projection: Mat4,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Vec3::ZERO,
            Vec3::NEG_Z,
            Vec3::Y,
            1.0,
            std::f32::consts::FRAC_PI_4,
            0.1,
            1000.0,
        )
    }
}

impl Camera {
    pub fn new(
        eye: Vec3,
        target: Vec3,
        up: Vec3,
        aspect: f32,
        fovy_radians: f32,
        znear: f32,
        zfar: f32,
    ) -> Self {
        let mut camera = Self {
            eye,
            target,
            up,
            aspect,
            fovy_radians,
            znear,
            zfar,
            projection: Mat4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Recompute the cached projection from `fovy_radians`, `aspect`, `znear`
    /// and `zfar`.
    pub fn update_projection_matrix(&mut self) {
        self.projection =
            Mat4::perspective_rh_gl(self.fovy_radians, self.aspect, self.znear, self.zfar);
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn set_projection_matrix(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.eye = eye;
        self.target = target;
        self.up = up;
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Camera-to-world transform, built from the same basis as
    /// [`Camera::view_matrix`] so no matrix inversion is involved.
    pub fn world_matrix(&self) -> Mat4 {
        let forward = (self.target - self.eye).normalize();
        let side = forward.cross(self.up).normalize();
        let up = side.cross(forward);
        Mat4::from_cols(
            side.extend(0.0),
            up.extend(0.0),
            (-forward).extend(0.0),
            self.eye.extend(1.0),
        )
    }

    pub fn world_position(&self) -> Vec3 {
        self.eye
    }

    /// View-projection in wgpu clip space.
    pub fn view_projection(&self) -> Mat4 {
        GL_TO_WGPU * self.projection * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_matrix_is_inverse_of_view() {
        let camera = Camera::new(
            Vec3::new(3.0, 4.0, 5.0),
            Vec3::new(-1.0, 0.5, 0.0),
            Vec3::Y,
            1.5,
            1.0,
            0.1,
            100.0,
        );
        let product = camera.view_matrix() * camera.world_matrix();
        let identity = Mat4::IDENTITY.to_cols_array();
        for (a, b) in product.to_cols_array().iter().zip(identity.iter()) {
            assert!((a - b).abs() < 1e-5, "{a} vs {b}");
        }
    }

    #[test]
    fn wgpu_projection_maps_near_and_far_to_unit_depth() {
        let camera = Camera::default();
        let vp = camera.view_projection();
        let near = vp * Vec4::new(0.0, 0.0, -camera.znear, 1.0);
        let far = vp * Vec4::new(0.0, 0.0, -camera.zfar, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-3);
    }
}
