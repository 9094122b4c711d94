use thiserror::Error;

use crate::render_state::RenderTargetId;
use crate::texture::TextureId;

/// Failures while fetching or decoding a texture asset.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },
}

/// Failures raised by a rendering backend during a render call.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no render target is bound and no frame view is available")]
    NoActiveTarget,
    #[error("render target {0:?} does not exist")]
    UnknownTarget(RenderTargetId),
    #[error("texture {0:?} is not loaded")]
    UnknownTexture(TextureId),
    #[error("backend error: {0}")]
    Backend(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
