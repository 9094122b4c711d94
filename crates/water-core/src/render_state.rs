//! Renderer-side state the reflection pass borrows for one render call.

use std::ops::{Deref, DerefMut};

use crate::camera::Camera;
use crate::error::RenderResult;
use crate::scene::SceneGraph;

/// Backend handle for an off-screen color target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderTargetId(pub u32);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width,
            height,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RenderTargetDescriptor {
    pub label: &'static str,
    pub width: u32,
    pub height: u32,
    pub filter: FilterMode,
}

/// The slice of a graphics backend the water code drives.
///
/// `None` as a render target means "the host's frame (swapchain) view".
pub trait RenderContext {
    type Scene: SceneGraph;

    fn create_render_target(&mut self, desc: &RenderTargetDescriptor) -> RenderTargetId;
    fn dispose_render_target(&mut self, target: RenderTargetId);

    fn render_target(&self) -> Option<RenderTargetId>;
    fn set_render_target(&mut self, target: Option<RenderTargetId>);

    fn xr_enabled(&self) -> bool;
    fn set_xr_enabled(&mut self, enabled: bool);

    fn shadow_auto_update(&self) -> bool;
    fn set_shadow_auto_update(&mut self, enabled: bool);

    fn viewport(&self) -> Viewport;
    fn set_viewport(&mut self, viewport: Viewport);

    fn auto_clear(&self) -> bool;
    fn clear_depth(&mut self) -> RenderResult<()>;

    /// Draw every visible mesh of `scene` from `camera` into the active target.
    fn render(&mut self, scene: &Self::Scene, camera: &Camera) -> RenderResult<()>;
}

/// Snapshot of the global renderer state that a nested pass may change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderStateSnapshot {
    pub target: Option<RenderTargetId>,
    pub xr_enabled: bool,
    pub shadow_auto_update: bool,
    pub viewport: Viewport,
}

impl RenderStateSnapshot {
    pub fn capture<R: RenderContext + ?Sized>(ctx: &R) -> Self {
        Self {
            target: ctx.render_target(),
            xr_enabled: ctx.xr_enabled(),
            shadow_auto_update: ctx.shadow_auto_update(),
            viewport: ctx.viewport(),
        }
    }

    pub fn restore<R: RenderContext + ?Sized>(&self, ctx: &mut R) {
        ctx.set_xr_enabled(self.xr_enabled);
        ctx.set_shadow_auto_update(self.shadow_auto_update);
        ctx.set_render_target(self.target);
        ctx.set_viewport(self.viewport);
    }
}

/// RAII guard that restores the captured renderer state when dropped.
///
/// Restoration runs on every exit path: normal return, `?` propagation and
/// unwinding.
pub struct RenderStateGuard<'a, R: RenderContext + ?Sized> {
    ctx: &'a mut R,
    saved: RenderStateSnapshot,
}

impl<'a, R: RenderContext + ?Sized> RenderStateGuard<'a, R> {
    pub fn acquire(ctx: &'a mut R) -> Self {
        let saved = RenderStateSnapshot::capture(ctx);
        Self { ctx, saved }
    }

    pub fn saved(&self) -> &RenderStateSnapshot {
        &self.saved
    }
}

impl<R: RenderContext + ?Sized> Deref for RenderStateGuard<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.ctx
    }
}

impl<R: RenderContext + ?Sized> DerefMut for RenderStateGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.ctx
    }
}

impl<R: RenderContext + ?Sized> Drop for RenderStateGuard<'_, R> {
    fn drop(&mut self) {
        self.saved.restore(self.ctx);
    }
}
