use water_core::{FilterMode, RenderTargetDescriptor};

use crate::helpers;

/// Format of every off-screen color target.
pub const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Off-screen color target with its own depth buffer.
///
/// Color is kept in Rgba16Float so the reflected scene survives sampling
/// without banding.
pub(crate) struct OffscreenTarget {
    #[allow(dead_code)]
    pub(crate) color: wgpu::Texture,
    pub(crate) color_view: wgpu::TextureView,
    #[allow(dead_code)]
    pub(crate) depth: wgpu::Texture,
    pub(crate) depth_view: wgpu::TextureView,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) filter: FilterMode,
}

impl OffscreenTarget {
    pub(crate) fn new(device: &wgpu::Device, desc: &RenderTargetDescriptor) -> Self {
        let (color, color_view) = helpers::create_color_texture(
            device,
            desc.label,
            desc.width,
            desc.height,
            TARGET_FORMAT,
            wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        );
        let (depth, depth_view) =
            helpers::create_depth_texture(device, desc.label, desc.width, desc.height);
        Self {
            color,
            color_view,
            depth,
            depth_view,
            width: desc.width.max(1),
            height: desc.height.max(1),
            filter: desc.filter,
        }
    }
}

/// Depth buffer paired with the host's swapchain image.
pub(crate) struct FrameDepth {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
}

impl FrameDepth {
    pub(crate) fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (texture, view) = helpers::create_depth_texture(device, "frame_depth", width, height);
        Self { texture, view }
    }

    pub(crate) fn recreate(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        (self.texture, self.view) =
            helpers::create_depth_texture(device, "frame_depth", width, height);
    }
}
