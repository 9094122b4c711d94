//! CPU-side mesh generation for the water plane and decoration primitives.
//!
//! All generators emit counter-clockwise front faces and `u32` indices.

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::config::Shape;

const SPHERE_SEGMENTS: u32 = 16;
const SPHERE_RINGS: u32 = 12;
const CYLINDER_SEGMENTS: u32 = 16;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    fn new(position: Vec3, normal: Vec3, uv: [f32; 2]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Description of a mesh shape; [`Geometry::build`] produces the buffers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Geometry {
    /// Square in the local XY plane facing +Z, centred on the origin.
    Plane { size: f32, segments: u32 },
    /// Unit cube centred on the origin.
    Box,
    /// UV sphere of radius 0.5.
    Sphere { segments: u32, rings: u32 },
    /// Capped cylinder of radius 0.5 and height 1 along Y.
    Cylinder { segments: u32 },
}

impl Geometry {
    pub fn for_shape(shape: Shape) -> Self {
        match shape {
            Shape::Box => Geometry::Box,
            Shape::Sphere => Geometry::Sphere {
                segments: SPHERE_SEGMENTS,
                rings: SPHERE_RINGS,
            },
            Shape::Cylinder => Geometry::Cylinder {
                segments: CYLINDER_SEGMENTS,
            },
        }
    }

    pub fn build(&self) -> MeshData {
        match *self {
            Geometry::Plane { size, segments } => plane(size, segments),
            Geometry::Box => unit_box(),
            Geometry::Sphere { segments, rings } => sphere(segments, rings),
            Geometry::Cylinder { segments } => cylinder(segments),
        }
    }
}

fn plane(size: f32, segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    if segments == 0 {
        return mesh;
    }
    let half = size * 0.5;
    let step = size / segments as f32;
    let row = segments + 1;

    for iy in 0..=segments {
        let y = iy as f32 * step - half;
        for ix in 0..=segments {
            let x = ix as f32 * step - half;
            mesh.vertices.push(Vertex::new(
                Vec3::new(x, -y, 0.0),
                Vec3::Z,
                [
                    ix as f32 / segments as f32,
                    1.0 - iy as f32 / segments as f32,
                ],
            ));
        }
    }

    for iy in 0..segments {
        for ix in 0..segments {
            let a = ix + row * iy;
            let b = ix + row * (iy + 1);
            let c = ix + 1 + row * (iy + 1);
            let d = ix + 1 + row * iy;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    mesh
}

fn unit_box() -> MeshData {
    // (normal, u, v) with u x v == normal.
    const FACES: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];
    const CORNERS: [(f32, f32); 4] = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)];

    let mut mesh = MeshData::default();
    for (n, u, v) in FACES {
        let base = mesh.vertices.len() as u32;
        for (cu, cv) in CORNERS {
            let position = n * 0.5 + u * cu + v * cv;
            mesh.vertices
                .push(Vertex::new(position, n, [cu + 0.5, 0.5 - cv]));
        }
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    mesh
}

fn sphere(segments: u32, rings: u32) -> MeshData {
    let mut mesh = MeshData::default();
    if segments < 3 || rings < 2 {
        return mesh;
    }
    let radius = 0.5;
    let row = segments + 1;

    for iy in 0..=rings {
        let v = iy as f32 / rings as f32;
        for ix in 0..=segments {
            let u = ix as f32 / segments as f32;
            let (sin_phi, cos_phi) = (u * TAU).sin_cos();
            let (sin_theta, cos_theta) = (v * PI).sin_cos();
            let normal = Vec3::new(-cos_phi * sin_theta, cos_theta, sin_phi * sin_theta);
            mesh.vertices
                .push(Vertex::new(normal * radius, normal, [u, 1.0 - v]));
        }
    }

    // Pole rows collapse to a point; skip their degenerate half of each quad.
    for iy in 0..rings {
        for ix in 0..segments {
            let a = row * iy + ix + 1;
            let b = row * iy + ix;
            let c = row * (iy + 1) + ix;
            let d = row * (iy + 1) + ix + 1;
            if iy != 0 {
                mesh.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != rings - 1 {
                mesh.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    mesh
}

fn cylinder(segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    if segments < 3 {
        return mesh;
    }
    let radius = 0.5;
    let half_height = 0.5;
    let row = segments + 1;

    for (iy, y) in [half_height, -half_height].into_iter().enumerate() {
        for ix in 0..=segments {
            let u = ix as f32 / segments as f32;
            let (sin, cos) = (u * TAU).sin_cos();
            let normal = Vec3::new(sin, 0.0, cos);
            mesh.vertices.push(Vertex::new(
                Vec3::new(radius * sin, y, radius * cos),
                normal,
                [u, iy as f32],
            ));
        }
    }
    for ix in 0..segments {
        let a = ix;
        let b = row + ix;
        let c = row + ix + 1;
        let d = ix + 1;
        mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
    }

    for (y, normal) in [(half_height, Vec3::Y), (-half_height, Vec3::NEG_Y)] {
        let center = mesh.vertices.len() as u32;
        mesh.vertices
            .push(Vertex::new(Vec3::new(0.0, y, 0.0), normal, [0.5, 0.5]));
        let ring = center + 1;
        for ix in 0..=segments {
            let (sin, cos) = (ix as f32 / segments as f32 * TAU).sin_cos();
            mesh.vertices.push(Vertex::new(
                Vec3::new(radius * sin, y, radius * cos),
                normal,
                [0.5 + 0.5 * sin, 0.5 + 0.5 * cos],
            ));
        }
        for ix in 0..segments {
            let (i, j) = (ring + ix, ring + ix + 1);
            if normal.y > 0.0 {
                mesh.indices.extend_from_slice(&[i, j, center]);
            } else {
                mesh.indices.extend_from_slice(&[j, i, center]);
            }
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every non-degenerate triangle must wind counter-clockwise around the
    /// normals of its vertices.
    fn assert_outward_winding(mesh: &MeshData) {
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.vertices[i as usize]);
            let pa = Vec3::from(a.position);
            let face = (Vec3::from(b.position) - pa).cross(Vec3::from(c.position) - pa);
            if face.length() < 1e-6 {
                continue;
            }
            let normal = Vec3::from(a.normal) + Vec3::from(b.normal) + Vec3::from(c.normal);
            assert!(face.dot(normal) > 0.0, "inward triangle {tri:?}");
        }
    }

    #[test]
    fn plane_has_expected_grid() {
        let mesh = Geometry::Plane {
            size: 10.0,
            segments: 4,
        }
        .build();
        assert_eq!(mesh.vertices.len(), 25);
        assert_eq!(mesh.indices.len(), 4 * 4 * 6);
        for v in &mesh.vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
            assert!(v.position[0].abs() <= 5.0 + 1e-5);
            assert!(v.position[1].abs() <= 5.0 + 1e-5);
        }
        assert_outward_winding(&mesh);
    }

    #[test]
    fn zero_segment_plane_is_empty() {
        let mesh = Geometry::Plane {
            size: 100.0,
            segments: 0,
        }
        .build();
        assert!(mesh.is_empty());
        assert!(mesh.vertices.is_empty());
    }

    #[test]
    fn box_faces_point_outward() {
        let mesh = Geometry::Box.build();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert_outward_winding(&mesh);
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = Geometry::for_shape(Shape::Sphere).build();
        for v in &mesh.vertices {
            let r = Vec3::from(v.position).length();
            assert!((r - 0.5).abs() < 1e-5, "radius {r}");
        }
        assert_outward_winding(&mesh);
    }

    #[test]
    fn cylinder_caps_and_sides_point_outward() {
        let mesh = Geometry::for_shape(Shape::Cylinder).build();
        assert_eq!(mesh.triangle_count(), CYLINDER_SEGMENTS as usize * 4);
        assert_outward_winding(&mesh);
    }
}
