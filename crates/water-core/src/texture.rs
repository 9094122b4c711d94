use crate::error::AssetError;

/// Backend handle for a sampled texture (e.g. the water normal map).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
}

/// Asynchronous texture source. Implemented by the graphics backend.
#[allow(async_fn_in_trait)]
pub trait TextureLoader {
    async fn load_texture(&mut self, path: &str) -> Result<TextureId, AssetError>;

    /// Change the addressing mode used when the texture is sampled.
    fn set_wrap_mode(&mut self, texture: TextureId, wrap: WrapMode);
}
