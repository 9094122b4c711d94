use instant::Instant;
use winit::{event::*, event_loop::EventLoop, window::WindowBuilder};

use glam::{Mat4, Vec3};
use water_core::{
    Camera, FeatureConfig, Geometry, Material, MeshDescriptor, RenderContext, SceneGraph,
    WaterFeature,
};
use water_wgpu::{Lighting, WgpuRenderer, WgpuScene};

const ORBIT_RADIUS: f32 = 60.0;
const ORBIT_HEIGHT: f32 = 12.0;
const ORBIT_SPEED: f32 = 0.05;
const MARKER_COLORS: [[f32; 3]; 3] = [[1.0, 0.35, 0.2], [0.3, 0.9, 0.4], [0.3, 0.5, 1.0]];

struct GpuState<'w> {
    window: &'w winit::window::Window,
    surface: wgpu::Surface<'w>,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    scene: WgpuScene,
    feature: WaterFeature,
    camera: Camera,
    start: Instant,
    last_frame: Instant,
}

impl<'w> GpuState<'w> {
    async fn new(window: &'w winit::window::Window) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window)?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                    label: None,
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow::anyhow!("Surface reports no formats"))?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            desired_maximum_frame_latency: 2,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        log::info!(
            "[native] surface {}x{} {:?}",
            config.width,
            config.height,
            format
        );

        let mut renderer = WgpuRenderer::new(device, queue, format, config.width, config.height);
        let feature_config = FeatureConfig::default();
        let mut scene = WgpuScene::new(Lighting {
            sun_direction: feature_config.water.sun_direction,
            ..Lighting::default()
        });
        add_markers(&mut scene);

        let mut feature = WaterFeature::new(feature_config);
        feature.initialize(&mut renderer, &mut scene).await;

        let camera = Camera::new(
            Vec3::new(ORBIT_RADIUS, ORBIT_HEIGHT, 0.0),
            Vec3::ZERO,
            Vec3::Y,
            config.width as f32 / config.height as f32,
            std::f32::consts::FRAC_PI_4,
            0.5,
            2000.0,
        );

        let now = Instant::now();
        Ok(Self {
            window,
            surface,
            config,
            renderer,
            scene,
            feature,
            camera,
            start: now,
            last_frame: now,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(self.renderer.device(), &self.config);
        self.renderer.resize(new_size.width, new_size.height);
        self.camera.aspect = new_size.width as f32 / new_size.height as f32;
        self.camera.update_projection_matrix();
    }

    fn orbit_camera(&mut self) {
        let angle = self.start.elapsed().as_secs_f32() * ORBIT_SPEED * std::f32::consts::TAU;
        let eye = Vec3::new(
            angle.cos() * ORBIT_RADIUS,
            ORBIT_HEIGHT,
            angle.sin() * ORBIT_RADIUS,
        );
        self.camera.look_at(eye, Vec3::new(0.0, 2.0, 0.0), Vec3::Y);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.orbit_camera();

        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.renderer.begin_frame(view);

        if let Err(err) = self
            .feature
            .update(dt, &mut self.renderer, &mut self.scene, &self.camera)
        {
            log::warn!("[native] reflection pass failed: {err}");
        }
        self.renderer.set_render_target(None);
        if let Err(err) = self.renderer.render(&self.scene, &self.camera) {
            log::error!("[native] main pass failed: {err}");
        }

        self.renderer.end_frame();
        frame.present();
        Ok(())
    }

    fn shutdown(&mut self) {
        self.feature.cleanup(&mut self.renderer, &mut self.scene);
    }
}

/// Emissive spheres above the water so the reflection has something bright to
/// show regardless of the decoration layout.
fn add_markers(scene: &mut WgpuScene) {
    for (i, color) in MARKER_COLORS.iter().enumerate() {
        let angle = i as f32 * std::f32::consts::TAU / MARKER_COLORS.len() as f32;
        let position = Vec3::new(angle.cos() * 15.0, 6.0, angle.sin() * 15.0);
        scene.add_mesh(MeshDescriptor {
            label: format!("marker-{i}"),
            geometry: Geometry::Sphere {
                segments: 24,
                rings: 16,
            },
            material: Material::Flat {
                color: Vec3::from(*color),
                emissive: 0.8,
            },
            transform: Mat4::from_scale_rotation_translation(
                Vec3::splat(2.0),
                glam::Quat::IDENTITY,
                position,
            ),
        });
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let event_loop = EventLoop::new()?;
    let window = WindowBuilder::new()
        .with_title("Reflective water (native)")
        .build(&event_loop)?;

    let mut state = pollster::block_on(GpuState::new(&window))?;

    event_loop.run(move |event, elwt| match event {
        Event::WindowEvent {
            event: WindowEvent::Resized(size),
            ..
        } => state.resize(size),
        Event::WindowEvent {
            event: WindowEvent::CloseRequested,
            ..
        } => {
            state.shutdown();
            elwt.exit();
        }
        Event::AboutToWait => match state.render() {
            Ok(_) => state.window.request_redraw(),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                state.resize(state.window.inner_size())
            }
            Err(wgpu::SurfaceError::OutOfMemory) => elwt.exit(),
            Err(err) => log::warn!("[native] surface error: {err:?}"),
        },
        _ => {}
    })?;
    Ok(())
}
