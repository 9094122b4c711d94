//! Scene-graph seam between the water feature and the host engine.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use glam::{Mat4, Vec3};

use crate::config::Side;
use crate::geometry::Geometry;
use crate::render_state::RenderTargetId;
use crate::surface::WaterUniforms;
use crate::texture::TextureId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(pub u32);

/// Material of the reflective plane. Samples the mirror target through the
/// per-frame [`WaterUniforms`].
#[derive(Clone, Debug, PartialEq)]
pub struct WaterMaterial {
    pub mirror_target: RenderTargetId,
    pub normal_map: Option<TextureId>,
    pub side: Side,
    pub fog: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Material {
    Water(WaterMaterial),
    /// Sun + ambient lit colour. `emissive` in \[0, 1\] blends towards the
    /// unlit colour.
    Flat { color: Vec3, emissive: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct MeshDescriptor {
    pub label: String,
    pub geometry: Geometry,
    pub material: Material,
    pub transform: Mat4,
}

/// Meshes the host renders. Implemented by the graphics backend.
pub trait SceneGraph {
    fn add_mesh(&mut self, desc: MeshDescriptor) -> MeshId;
    /// Detach the mesh and release its geometry and material.
    fn remove_mesh(&mut self, mesh: MeshId);
    fn set_visible(&mut self, mesh: MeshId, visible: bool);
    fn is_visible(&self, mesh: MeshId) -> bool;
    fn set_transform(&mut self, mesh: MeshId, transform: Mat4);
    fn set_water_uniforms(&mut self, mesh: MeshId, uniforms: &WaterUniforms);
}

/// Shared, owner-controlled world matrix of a mesh.
///
/// The owner keeps the strong handle and is the only writer; readers hold a
/// [`WorldTransformRef`] obtained with [`WorldTransform::downgrade`].
#[derive(Clone, Debug, Default)]
pub struct WorldTransform(Rc<Cell<Mat4>>);

impl WorldTransform {
    pub fn new(matrix: Mat4) -> Self {
        Self(Rc::new(Cell::new(matrix)))
    }

    pub fn get(&self) -> Mat4 {
        self.0.get()
    }

    pub fn set(&self, matrix: Mat4) {
        self.0.set(matrix);
    }

    pub fn downgrade(&self) -> WorldTransformRef {
        WorldTransformRef(Rc::downgrade(&self.0))
    }
}

/// Read-only, non-owning view of a [`WorldTransform`].
#[derive(Clone, Debug, Default)]
pub struct WorldTransformRef(Weak<Cell<Mat4>>);

impl WorldTransformRef {
    /// `None` once the owning transform has been dropped.
    pub fn get(&self) -> Option<Mat4> {
        self.0.upgrade().map(|cell| cell.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_follows_owner_and_expires() {
        let owner = WorldTransform::new(Mat4::IDENTITY);
        let reader = owner.downgrade();
        let moved = Mat4::from_translation(Vec3::new(0.0, 3.0, 0.0));
        owner.set(moved);
        assert_eq!(reader.get(), Some(moved));
        drop(owner);
        assert_eq!(reader.get(), None);
    }

    #[test]
    fn default_reference_is_unbound() {
        assert_eq!(WorldTransformRef::default().get(), None);
    }
}
