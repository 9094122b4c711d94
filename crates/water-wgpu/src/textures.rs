use water_core::{AssetError, WrapMode};

/// Sampled texture owned by the renderer.
pub(crate) struct LoadedTexture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) wrap: WrapMode,
}

pub(crate) fn decode_rgba(path: &str) -> Result<image::RgbaImage, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_string(),
        source,
    })?;
    let decoded = image::load_from_memory(&bytes).map_err(|err| AssetError::Decode {
        path: path.to_string(),
        reason: err.to_string(),
    })?;
    Ok(decoded.to_rgba8())
}

/// Upload tightly packed RGBA8 texels. Normal maps hold vectors, not colours,
/// so the format is linear.
pub(crate) fn upload_rgba(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    texels: &[u8],
) -> LoadedTexture {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        texels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    LoadedTexture {
        texture,
        view,
        wrap: WrapMode::ClampToEdge,
    }
}

/// 1x1 normal pointing straight out of the surface. Bound when the water
/// material has no normal map.
pub(crate) fn flat_normal(device: &wgpu::Device, queue: &wgpu::Queue) -> LoadedTexture {
    let mut texture = upload_rgba(device, queue, "flat_normal", 1, 1, &[128, 128, 255, 255]);
    texture.wrap = WrapMode::Repeat;
    texture
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_an_io_error() {
        let err = decode_rgba("does/not/exist.jpg").unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let dir = std::env::temp_dir().join("water_wgpu_decode_test.png");
        std::fs::write(&dir, b"not an image").unwrap();
        let err = decode_rgba(dir.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
        let _ = std::fs::remove_file(&dir);
    }
}
