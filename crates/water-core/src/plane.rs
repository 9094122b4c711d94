//! Plane reflection and oblique near-plane clipping helpers.
//!
//! Planes are stored as `Vec4(nx, ny, nz, d)` with `n · p + d = 0` for every
//! point `p` on the plane.

use glam::{Mat3, Mat4, Vec3, Vec4};

/// Maps clip-space x/y/z in \[-1, 1\] to texture space \[0, 1\].
///
/// `v` is flipped because wgpu textures have their origin in the top-left
/// corner.
pub const TEXTURE_BIAS: Mat4 = Mat4::from_cols(
    Vec4::new(0.5, 0.0, 0.0, 0.0),
    Vec4::new(0.0, -0.5, 0.0, 0.0),
    Vec4::new(0.0, 0.0, 0.5, 0.0),
    Vec4::new(0.5, 0.5, 0.5, 1.0),
);

/// `-1`, `0` or `1`. Unlike `f32::signum`, zero maps to zero.
#[inline]
pub fn sign(x: f32) -> f32 {
    if x < 0.0 {
        -1.0
    } else if x > 0.0 {
        1.0
    } else {
        0.0
    }
}

#[inline]
pub fn reflect_vector(v: Vec3, normal: Vec3) -> Vec3 {
    v - 2.0 * v.dot(normal) * normal
}

/// Mirror `point` across the plane through `plane_point` with unit `normal`.
#[inline]
pub fn reflect_point(point: Vec3, plane_point: Vec3, normal: Vec3) -> Vec3 {
    plane_point + reflect_vector(point - plane_point, normal)
}

pub fn plane_from_normal_and_point(normal: Vec3, point: Vec3) -> Vec4 {
    let n = normal.normalize();
    n.extend(-n.dot(point))
}

/// Signed distance of `point` to `plane` (positive on the normal side).
#[inline]
pub fn distance_to_plane(plane: Vec4, point: Vec3) -> f32 {
    plane.truncate().dot(point) + plane.w
}

/// Transform a plane by an affine matrix.
pub fn transform_plane(plane: Vec4, matrix: Mat4) -> Vec4 {
    let normal = plane.truncate();
    let reference = matrix.transform_point3(normal * -plane.w);
    let normal_matrix = Mat3::from_mat4(matrix).inverse().transpose();
    let n = (normal_matrix * normal).normalize();
    n.extend(-reference.dot(n))
}

/// Pure rotation part of an affine transform (columns with scale removed).
pub fn extract_rotation(matrix: Mat4) -> Mat3 {
    Mat3::from_cols(
        matrix.x_axis.truncate().normalize(),
        matrix.y_axis.truncate().normalize(),
        matrix.z_axis.truncate().normalize(),
    )
}

/// Rewrite the third row of an OpenGL-style projection so that its near clip
/// plane coincides with `clip_plane` (given in view space).
///
/// `q` is the view-space point of the frustum corner opposite the clip plane,
/// obtained by un-projecting the signed clip-space corner. Scaling the plane by
/// `2 / dot(plane, q)` and subtracting the fourth row makes that corner land on
/// the far plane while the plane itself lands on the near plane. Only the
/// entries of row 2 change.
pub fn apply_oblique_clip(projection: &mut Mat4, clip_plane: Vec4, clip_bias: f32) {
    let corner = Vec4::new(sign(clip_plane.x), sign(clip_plane.y), 1.0, 1.0);
    let q = projection.inverse() * corner;
    let scaled = clip_plane * (2.0 / clip_plane.dot(q));
    let row = scaled - projection.row(3);

    projection.x_axis.z = row.x;
    projection.y_axis.z = row.y;
    projection.z_axis.z = row.z - clip_bias;
    projection.w_axis.z = row.w;
}
