// Recording backend used by the host-side integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use water_core::{
    AssetError, Camera, MeshDescriptor, MeshId, RenderContext, RenderError, RenderResult,
    RenderTargetDescriptor, RenderTargetId, SceneGraph, TextureId, TextureLoader, Viewport,
    WaterUniforms, WrapMode,
};

pub struct MockMesh {
    pub desc: MeshDescriptor,
    pub visible: bool,
    pub transform: glam::Mat4,
    pub water_uniforms: Option<WaterUniforms>,
}

#[derive(Default)]
pub struct MockScene {
    pub meshes: BTreeMap<MeshId, MockMesh>,
    pub removed: Vec<MeshId>,
    pub next_id: u32,
}

impl MockScene {
    pub fn visible_meshes(&self) -> Vec<MeshId> {
        self.meshes
            .iter()
            .filter(|(_, m)| m.visible)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl SceneGraph for MockScene {
    fn add_mesh(&mut self, desc: MeshDescriptor) -> MeshId {
        let id = MeshId(self.next_id);
        self.next_id += 1;
        let transform = desc.transform;
        self.meshes.insert(
            id,
            MockMesh {
                desc,
                visible: true,
                transform,
                water_uniforms: None,
            },
        );
        id
    }

    fn remove_mesh(&mut self, mesh: MeshId) {
        if self.meshes.remove(&mesh).is_some() {
            self.removed.push(mesh);
        }
    }

    fn set_visible(&mut self, mesh: MeshId, visible: bool) {
        if let Some(m) = self.meshes.get_mut(&mesh) {
            m.visible = visible;
        }
    }

    fn is_visible(&self, mesh: MeshId) -> bool {
        self.meshes.get(&mesh).map(|m| m.visible).unwrap_or(false)
    }

    fn set_transform(&mut self, mesh: MeshId, transform: glam::Mat4) {
        if let Some(m) = self.meshes.get_mut(&mesh) {
            m.transform = transform;
        }
    }

    fn set_water_uniforms(&mut self, mesh: MeshId, uniforms: &WaterUniforms) {
        if let Some(m) = self.meshes.get_mut(&mesh) {
            m.water_uniforms = Some(*uniforms);
        }
    }
}

/// Renderer state observed at the moment `render` was called.
#[derive(Clone, Debug)]
pub struct RenderCall {
    pub target: Option<RenderTargetId>,
    pub xr_enabled: bool,
    pub shadow_auto_update: bool,
    pub viewport: Viewport,
    pub camera: Camera,
    pub visible: Vec<MeshId>,
}

pub struct MockContext {
    pub targets: BTreeMap<RenderTargetId, RenderTargetDescriptor>,
    pub disposed: Vec<RenderTargetId>,
    pub target: Option<RenderTargetId>,
    pub xr_enabled: bool,
    pub shadow_auto_update: bool,
    pub viewport: Viewport,
    pub auto_clear: bool,
    pub depth_clears: usize,
    pub renders: Vec<RenderCall>,
    pub fail_render: bool,
    pub fail_texture: bool,
    pub texture_loads: Vec<String>,
    pub wrap_modes: Vec<(TextureId, WrapMode)>,
    pub next_target: u32,
    pub next_texture: u32,
}

impl Default for MockContext {
    fn default() -> Self {
        Self {
            targets: BTreeMap::new(),
            disposed: Vec::new(),
            target: None,
            xr_enabled: true,
            shadow_auto_update: true,
            viewport: Viewport::new(800.0, 600.0),
            auto_clear: true,
            depth_clears: 0,
            renders: Vec::new(),
            fail_render: false,
            fail_texture: false,
            texture_loads: Vec::new(),
            wrap_modes: Vec::new(),
            next_target: 1,
            next_texture: 1,
        }
    }
}

impl RenderContext for MockContext {
    type Scene = MockScene;

    fn create_render_target(&mut self, desc: &RenderTargetDescriptor) -> RenderTargetId {
        let id = RenderTargetId(self.next_target);
        self.next_target += 1;
        self.targets.insert(id, desc.clone());
        id
    }

    fn dispose_render_target(&mut self, target: RenderTargetId) {
        self.targets.remove(&target);
        self.disposed.push(target);
    }

    fn render_target(&self) -> Option<RenderTargetId> {
        self.target
    }

    fn set_render_target(&mut self, target: Option<RenderTargetId>) {
        self.target = target;
    }

    fn xr_enabled(&self) -> bool {
        self.xr_enabled
    }

    fn set_xr_enabled(&mut self, enabled: bool) {
        self.xr_enabled = enabled;
    }

    fn shadow_auto_update(&self) -> bool {
        self.shadow_auto_update
    }

    fn set_shadow_auto_update(&mut self, enabled: bool) {
        self.shadow_auto_update = enabled;
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn auto_clear(&self) -> bool {
        self.auto_clear
    }

    fn clear_depth(&mut self) -> RenderResult<()> {
        self.depth_clears += 1;
        Ok(())
    }

    fn render(&mut self, scene: &MockScene, camera: &Camera) -> RenderResult<()> {
        self.renders.push(RenderCall {
            target: self.target,
            xr_enabled: self.xr_enabled,
            shadow_auto_update: self.shadow_auto_update,
            viewport: self.viewport,
            camera: camera.clone(),
            visible: scene.visible_meshes(),
        });
        if self.fail_render {
            return Err(RenderError::Backend("injected failure".to_string()));
        }
        Ok(())
    }
}

impl TextureLoader for MockContext {
    async fn load_texture(&mut self, path: &str) -> Result<TextureId, AssetError> {
        self.texture_loads.push(path.to_string());
        if self.fail_texture {
            return Err(AssetError::Decode {
                path: path.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        Ok(id)
    }

    fn set_wrap_mode(&mut self, texture: TextureId, wrap: WrapMode) {
        self.wrap_modes.push((texture, wrap));
    }
}

pub fn approx_vec3(a: glam::Vec3, b: glam::Vec3, eps: f32) -> bool {
    (a - b).abs().max_element() < eps
}
