use bytemuck::{Pod, Zeroable};
use fnv::FnvHashMap;
use smallvec::SmallVec;
use wgpu::util::DeviceExt;
use water_core::{
    AssetError, Camera, FilterMode, Material, MeshId, RenderContext, RenderError, RenderResult,
    RenderTargetDescriptor, RenderTargetId, Side, TextureId, TextureLoader, Viewport,
    WaterMaterial, WaterUniforms, WrapMode,
};

use crate::helpers;
use crate::scene::{SceneMesh, WgpuScene};
use crate::targets::{FrameDepth, OffscreenTarget, TARGET_FORMAT};
use crate::textures::{self, LoadedTexture};

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct FrameUniforms {
    view_proj: [[f32; 4]; 4],
    eye: [f32; 4],
    sun_dir_ambient: [f32; 4],
    sun_color: [f32; 4],
    fog: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ObjectUniforms {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum PipelineKind {
    Flat,
    Water(Side),
}

struct GpuGeometry {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

struct GpuMesh {
    kind: PipelineKind,
    // None for empty geometry.
    geometry: Option<GpuGeometry>,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    textures: Option<wgpu::BindGroup>,
}

/// Clamp `viewport` to a `width` x `height` target. An empty or fully
/// outside viewport covers the whole target.
pub fn clamp_viewport(viewport: Viewport, width: u32, height: u32) -> Viewport {
    let (tw, th) = (width as f32, height as f32);
    let x = viewport.x.clamp(0.0, tw);
    let y = viewport.y.clamp(0.0, th);
    let w = viewport.width.min(tw - x);
    let h = viewport.height.min(th - y);
    if w <= 0.0 || h <= 0.0 {
        Viewport::new(tw, th)
    } else {
        Viewport {
            x,
            y,
            width: w,
            height: h,
        }
    }
}

/// wgpu implementation of the water backend traits.
///
/// Every [`RenderContext::render`] call records and submits its own command
/// buffer, so uniform writes made for one pass never leak into another.
/// There is no stereo or shadow path; those flags are tracked for callers.
pub struct WgpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    frame_format: wgpu::TextureFormat,
    frame_size: (u32, u32),
    frame_view: Option<wgpu::TextureView>,
    frame_depth: FrameDepth,

    targets: FnvHashMap<RenderTargetId, OffscreenTarget>,
    next_target: u32,
    textures: FnvHashMap<TextureId, LoadedTexture>,
    next_texture: u32,
    flat_normal: LoadedTexture,

    clamp_linear: wgpu::Sampler,
    clamp_nearest: wgpu::Sampler,
    repeat_linear: wgpu::Sampler,

    object_bgl: wgpu::BindGroupLayout,
    water_textures_bgl: wgpu::BindGroupLayout,
    flat_layout: wgpu::PipelineLayout,
    water_layout: wgpu::PipelineLayout,
    scene_shader: wgpu::ShaderModule,
    water_shader: wgpu::ShaderModule,
    pipelines: FnvHashMap<(wgpu::TextureFormat, PipelineKind), wgpu::RenderPipeline>,
    meshes: FnvHashMap<MeshId, GpuMesh>,

    frame_uniforms: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,

    active_target: Option<RenderTargetId>,
    xr_enabled: bool,
    shadow_auto_update: bool,
    viewport: Viewport,
    auto_clear: bool,
    pending_depth_clear: bool,
}

impl WgpuRenderer {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        frame_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(water_core::SCENE_WGSL.into()),
        });
        let water_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("water_shader"),
            source: wgpu::ShaderSource::Wgsl(water_core::WATER_WGSL.into()),
        });

        let frame_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("frame_bgl"),
            entries: &[helpers::uniform_entry(0)],
        });
        let object_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bgl"),
            entries: &[helpers::uniform_entry(0)],
        });
        let water_textures_bgl =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("water_textures_bgl"),
                entries: &[
                    helpers::texture_entry(0), // mirror
                    helpers::sampler_entry(1),
                    helpers::texture_entry(2), // normal map
                    helpers::sampler_entry(3),
                ],
            });
        let flat_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("flat_pl"),
            bind_group_layouts: &[&frame_bgl, &object_bgl],
            push_constant_ranges: &[],
        });
        let water_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("water_pl"),
            bind_group_layouts: &[&frame_bgl, &object_bgl, &water_textures_bgl],
            push_constant_ranges: &[],
        });

        let frame_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame_uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bg"),
            layout: &frame_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniforms.as_entire_binding(),
            }],
        });

        let clamp_linear = helpers::create_sampler(
            &device,
            "clamp_linear",
            wgpu::AddressMode::ClampToEdge,
            wgpu::FilterMode::Linear,
        );
        let clamp_nearest = helpers::create_sampler(
            &device,
            "clamp_nearest",
            wgpu::AddressMode::ClampToEdge,
            wgpu::FilterMode::Nearest,
        );
        let repeat_linear = helpers::create_sampler(
            &device,
            "repeat_linear",
            wgpu::AddressMode::Repeat,
            wgpu::FilterMode::Linear,
        );

        let flat_normal = textures::flat_normal(&device, &queue);
        let frame_depth = FrameDepth::new(&device, width, height);

        Self {
            device,
            queue,
            frame_format,
            frame_size: (width.max(1), height.max(1)),
            frame_view: None,
            frame_depth,
            targets: FnvHashMap::default(),
            next_target: 1,
            textures: FnvHashMap::default(),
            next_texture: 1,
            flat_normal,
            clamp_linear,
            clamp_nearest,
            repeat_linear,
            object_bgl,
            water_textures_bgl,
            flat_layout,
            water_layout,
            scene_shader,
            water_shader,
            pipelines: FnvHashMap::default(),
            meshes: FnvHashMap::default(),
            frame_uniforms,
            frame_bind_group,
            active_target: None,
            xr_enabled: false,
            shadow_auto_update: true,
            viewport: Viewport::new(width as f32, height as f32),
            auto_clear: true,
            pending_depth_clear: false,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.frame_size = (width, height);
        self.frame_depth.recreate(&self.device, width, height);
        self.viewport = Viewport::new(width as f32, height as f32);
    }

    /// Make `view` the target used while no render target is bound.
    pub fn begin_frame(&mut self, view: wgpu::TextureView) {
        self.frame_view = Some(view);
    }

    pub fn end_frame(&mut self) {
        self.frame_view = None;
    }

    pub fn set_auto_clear(&mut self, auto_clear: bool) {
        self.auto_clear = auto_clear;
    }

    fn ensure_pipeline(&mut self, format: wgpu::TextureFormat, kind: PipelineKind) {
        if self.pipelines.contains_key(&(format, kind)) {
            return;
        }
        let pipeline = match kind {
            PipelineKind::Flat => helpers::make_mesh_pipeline(
                &self.device,
                "flat_pipeline",
                &self.flat_layout,
                &self.scene_shader,
                format,
                Some(wgpu::Face::Back),
                None,
            ),
            PipelineKind::Water(side) => helpers::make_mesh_pipeline(
                &self.device,
                "water_pipeline",
                &self.water_layout,
                &self.water_shader,
                format,
                helpers::cull_mode(side),
                Some(wgpu::BlendState::ALPHA_BLENDING),
            ),
        };
        log::debug!("[gpu] built {:?} pipeline for {:?}", kind, format);
        self.pipelines.insert((format, kind), pipeline);
    }

    fn water_textures(&self, material: &WaterMaterial) -> RenderResult<wgpu::BindGroup> {
        let target = self
            .targets
            .get(&material.mirror_target)
            .ok_or(RenderError::UnknownTarget(material.mirror_target))?;
        let normal = match material.normal_map {
            Some(id) => self
                .textures
                .get(&id)
                .ok_or(RenderError::UnknownTexture(id))?,
            None => &self.flat_normal,
        };
        let mirror_sampler = match target.filter {
            FilterMode::Linear => &self.clamp_linear,
            FilterMode::Nearest => &self.clamp_nearest,
        };
        let normal_sampler = match normal.wrap {
            WrapMode::Repeat => &self.repeat_linear,
            WrapMode::ClampToEdge => &self.clamp_linear,
        };
        Ok(self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("water_textures_bg"),
            layout: &self.water_textures_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&target.color_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(mirror_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&normal.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(normal_sampler),
                },
            ],
        }))
    }

    fn upload_mesh(&self, mesh: &SceneMesh) -> RenderResult<GpuMesh> {
        let data = mesh.desc.geometry.build();
        let geometry = (!data.is_empty()).then(|| GpuGeometry {
            vertex_buffer: self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(mesh.desc.label.as_str()),
                    contents: bytemuck::cast_slice(&data.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
            index_buffer: self
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(mesh.desc.label.as_str()),
                    contents: bytemuck::cast_slice(&data.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
            index_count: data.indices.len() as u32,
        });

        let (kind, uniform_size, textures) = match &mesh.desc.material {
            Material::Flat { .. } => (
                PipelineKind::Flat,
                std::mem::size_of::<ObjectUniforms>(),
                None,
            ),
            Material::Water(water) => (
                PipelineKind::Water(water.side),
                std::mem::size_of::<WaterUniforms>(),
                Some(self.water_textures(water)?),
            ),
        };
        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("object_uniforms"),
            size: uniform_size as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("object_bg"),
            layout: &self.object_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        Ok(GpuMesh {
            kind,
            geometry,
            uniform_buffer,
            bind_group,
            textures,
        })
    }

    /// Drop GPU data of removed meshes and upload newly added ones.
    fn sync_meshes(&mut self, scene: &WgpuScene) -> RenderResult<()> {
        let before = self.meshes.len();
        self.meshes.retain(|id, _| scene.meshes.contains_key(id));
        if self.meshes.len() != before {
            log::debug!("[gpu] released {} meshes", before - self.meshes.len());
        }
        for (id, mesh) in &scene.meshes {
            if !self.meshes.contains_key(id) {
                let gpu = self.upload_mesh(mesh)?;
                self.meshes.insert(*id, gpu);
            }
        }
        Ok(())
    }

    fn write_uniforms(&self, scene: &WgpuScene, camera: &Camera) {
        let lighting = &scene.lighting;
        let frame = FrameUniforms {
            view_proj: camera.view_projection().to_cols_array_2d(),
            eye: camera.eye.extend(1.0).to_array(),
            sun_dir_ambient: lighting
                .sun_direction
                .normalize_or_zero()
                .extend(lighting.ambient)
                .to_array(),
            sun_color: lighting.sun_color.extend(1.0).to_array(),
            fog: lighting.fog_color.extend(lighting.fog_density).to_array(),
        };
        self.queue
            .write_buffer(&self.frame_uniforms, 0, bytemuck::bytes_of(&frame));

        for (id, mesh) in scene.meshes.iter().filter(|(_, m)| m.visible) {
            let Some(gpu) = self.meshes.get(id) else {
                continue;
            };
            match (&mesh.desc.material, &mesh.water) {
                (Material::Flat { color, emissive }, _) => {
                    let object = ObjectUniforms {
                        model: mesh.transform.to_cols_array_2d(),
                        color: color.extend(*emissive).to_array(),
                    };
                    self.queue
                        .write_buffer(&gpu.uniform_buffer, 0, bytemuck::bytes_of(&object));
                }
                (Material::Water(_), Some(water)) => {
                    self.queue
                        .write_buffer(&gpu.uniform_buffer, 0, bytemuck::bytes_of(water));
                }
                (Material::Water(_), None) => {}
            }
        }
    }
}

impl RenderContext for WgpuRenderer {
    type Scene = WgpuScene;

    fn create_render_target(&mut self, desc: &RenderTargetDescriptor) -> RenderTargetId {
        let id = RenderTargetId(self.next_target);
        self.next_target += 1;
        self.targets
            .insert(id, OffscreenTarget::new(&self.device, desc));
        log::info!(
            "[gpu] render target {:?} '{}' {}x{}",
            id,
            desc.label,
            desc.width,
            desc.height
        );
        id
    }

    fn dispose_render_target(&mut self, target: RenderTargetId) {
        if self.targets.remove(&target).is_none() {
            log::warn!("[gpu] dispose of unknown render target {:?}", target);
        }
    }

    fn render_target(&self) -> Option<RenderTargetId> {
        self.active_target
    }

    fn set_render_target(&mut self, target: Option<RenderTargetId>) {
        self.active_target = target;
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
        self.pending_depth_clear = true;
        Ok(())
    }

    fn render(&mut self, scene: &WgpuScene, camera: &Camera) -> RenderResult<()> {
        let (format, (width, height)) = match self.active_target {
            Some(id) => {
                let target = self.targets.get(&id).ok_or(RenderError::UnknownTarget(id))?;
                (TARGET_FORMAT, (target.width, target.height))
            }
            None if self.frame_view.is_some() => (self.frame_format, self.frame_size),
            None => return Err(RenderError::NoActiveTarget),
        };

        self.sync_meshes(scene)?;
        let draws: SmallVec<[(MeshId, PipelineKind); 64]> = scene
            .meshes
            .iter()
            .filter(|(_, m)| {
                m.visible && !(matches!(m.desc.material, Material::Water(_)) && m.water.is_none())
            })
            .filter_map(|(id, _)| {
                let gpu = self.meshes.get(id)?;
                gpu.geometry.as_ref().map(|_| (*id, gpu.kind))
            })
            .collect();
        for (_, kind) in &draws {
            self.ensure_pipeline(format, *kind);
        }
        self.write_uniforms(scene, camera);

        let (color_view, depth_view) = match self.active_target {
            Some(id) => {
                let target = self.targets.get(&id).ok_or(RenderError::UnknownTarget(id))?;
                (&target.color_view, &target.depth_view)
            }
            None => (
                self.frame_view.as_ref().ok_or(RenderError::NoActiveTarget)?,
                &self.frame_depth.view,
            ),
        };
        let color_load = if self.auto_clear {
            wgpu::LoadOp::Clear(scene.lighting.clear_color)
        } else {
            wgpu::LoadOp::Load
        };
        let depth_load = if self.auto_clear || self.pending_depth_clear {
            wgpu::LoadOp::Clear(1.0)
        } else {
            wgpu::LoadOp::Load
        };
        let viewport = clamp_viewport(self.viewport, width, height);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("scene_encoder"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_viewport(
                viewport.x,
                viewport.y,
                viewport.width,
                viewport.height,
                0.0,
                1.0,
            );
            rpass.set_bind_group(0, &self.frame_bind_group, &[]);
            for (id, kind) in &draws {
                let (Some(gpu), Some(pipeline)) =
                    (self.meshes.get(id), self.pipelines.get(&(format, *kind)))
                else {
                    continue;
                };
                let Some(geometry) = &gpu.geometry else {
                    continue;
                };
                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(1, &gpu.bind_group, &[]);
                if let Some(textures) = &gpu.textures {
                    rpass.set_bind_group(2, textures, &[]);
                }
                rpass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
                rpass.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..geometry.index_count, 0, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        self.pending_depth_clear = false;
        Ok(())
    }
}

impl TextureLoader for WgpuRenderer {
    async fn load_texture(&mut self, path: &str) -> Result<TextureId, AssetError> {
        let image = textures::decode_rgba(path)?;
        let (width, height) = image.dimensions();
        let max = self.device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 || width > max || height > max {
            return Err(AssetError::Decode {
                path: path.to_string(),
                reason: format!("{width}x{height} exceeds the device limit of {max}"),
            });
        }
        let texture =
            textures::upload_rgba(&self.device, &self.queue, path, width, height, image.as_raw());
        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(id, texture);
        log::info!("[gpu] loaded texture '{}' {}x{} as {:?}", path, width, height, id);
        Ok(id)
    }

    fn set_wrap_mode(&mut self, texture: TextureId, wrap: WrapMode) {
        match self.textures.get_mut(&texture) {
            Some(loaded) => loaded.wrap = wrap,
            None => log::warn!("[gpu] wrap mode for unknown texture {:?}", texture),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_blocks_are_vec4_aligned() {
        assert_eq!(std::mem::size_of::<FrameUniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<ObjectUniforms>() % 16, 0);
    }

    #[test]
    fn viewport_is_clamped_to_target() {
        let v = clamp_viewport(Viewport::new(1920.0, 1080.0), 512, 512);
        assert_eq!(v, Viewport::new(512.0, 512.0));

        let inner = Viewport {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 50.0,
        };
        assert_eq!(clamp_viewport(inner, 512, 512), inner);
    }

    #[test]
    fn empty_viewport_covers_target() {
        assert_eq!(
            clamp_viewport(Viewport::default(), 256, 128),
            Viewport::new(256.0, 128.0)
        );
    }
}
