use std::collections::BTreeMap;

use glam::{Mat4, Vec3};
use water_core::{MeshDescriptor, MeshId, SceneGraph, WaterUniforms};

/// Global lighting shared by every mesh in the scene.
#[derive(Clone, Debug)]
pub struct Lighting {
    /// Direction towards the sun.
    pub sun_direction: Vec3,
    pub sun_color: Vec3,
    pub ambient: f32,
    pub fog_color: Vec3,
    /// Exponential-squared fog density; 0 disables fog.
    pub fog_density: f32,
    pub clear_color: wgpu::Color,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            sun_direction: Vec3::new(0.70707, 0.70707, 0.0),
            sun_color: Vec3::ONE,
            ambient: 0.35,
            fog_color: Vec3::new(0.62, 0.72, 0.82),
            fog_density: 0.0012,
            clear_color: wgpu::Color {
                r: 0.62,
                g: 0.72,
                b: 0.82,
                a: 1.0,
            },
        }
    }
}

pub(crate) struct SceneMesh {
    pub(crate) desc: MeshDescriptor,
    pub(crate) visible: bool,
    pub(crate) transform: Mat4,
    pub(crate) water: Option<WaterUniforms>,
}

/// CPU-side scene graph rendered by [`crate::WgpuRenderer`].
///
/// Ids are never reused, so the renderer can key its GPU cache on them.
#[derive(Default)]
pub struct WgpuScene {
    pub(crate) meshes: BTreeMap<MeshId, SceneMesh>,
    next_id: u32,
    pub lighting: Lighting,
}

impl WgpuScene {
    pub fn new(lighting: Lighting) -> Self {
        Self {
            lighting,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn contains(&self, mesh: MeshId) -> bool {
        self.meshes.contains_key(&mesh)
    }
}

impl SceneGraph for WgpuScene {
    fn add_mesh(&mut self, desc: MeshDescriptor) -> MeshId {
        let id = MeshId(self.next_id);
        self.next_id += 1;
        log::debug!("[gpu] scene add {:?} '{}'", id, desc.label);
        let transform = desc.transform;
        self.meshes.insert(
            id,
            SceneMesh {
                desc,
                visible: true,
                transform,
                water: None,
            },
        );
        id
    }

    fn remove_mesh(&mut self, mesh: MeshId) {
        if self.meshes.remove(&mesh).is_none() {
            log::warn!("[gpu] remove of unknown mesh {:?}", mesh);
        }
    }

    fn set_visible(&mut self, mesh: MeshId, visible: bool) {
        if let Some(m) = self.meshes.get_mut(&mesh) {
            m.visible = visible;
        }
    }

    fn is_visible(&self, mesh: MeshId) -> bool {
        self.meshes.get(&mesh).is_some_and(|m| m.visible)
    }

    fn set_transform(&mut self, mesh: MeshId, transform: Mat4) {
        if let Some(m) = self.meshes.get_mut(&mesh) {
            m.transform = transform;
        }
    }

    fn set_water_uniforms(&mut self, mesh: MeshId, uniforms: &WaterUniforms) {
        if let Some(m) = self.meshes.get_mut(&mesh) {
            m.water = Some(*uniforms);
        }
    }
}
