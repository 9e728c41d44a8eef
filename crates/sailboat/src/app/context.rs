use std::sync::Arc;
use wgpu::{Device, Queue, Surface, SurfaceConfiguration, TextureView};
use winit::window::Window;

use super::camera::FlyCamera;
use super::uniforms::{uniform_entry, SceneSlot, UniformBuffer};
use crate::gpu::{self, RenderError};

pub struct GpuContext {
    pub device: Arc<Device>,
    pub queue: Arc<Queue>,
    pub surface: Surface<'static>,
    pub config: SurfaceConfiguration,
    pub depth_view: TextureView,
    pub scene_bind_group_layout: wgpu::BindGroupLayout,
    pub scene_bind_group: wgpu::BindGroup,
    pub scene_uniforms: UniformBuffer<SceneSlot>,
}

impl GpuContext {
    pub async fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        log::info!("Using GPU: {:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Sailboat Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: Self::required_limits().using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await?;

        device.on_uncaptured_error(Box::new(|error| {
            log::error!("GPU uncaptured error: {:?}", error);
            if matches!(error, wgpu::Error::OutOfMemory { .. }) {
                gpu::mark_device_lost();
            }
        }));
        device.set_device_lost_callback(|reason, message| {
            log::error!("GPU device lost ({:?}): {}", reason, message);
            gpu::mark_device_lost();
        });
        gpu::reset_device_lost();

        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let surface_format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| caps.formats.first().copied())
            .ok_or(RenderError::UnsupportedSurface)?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);

        let depth_view = Self::create_depth_view(&device, config.width, config.height);

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("scene_bind_group_layout"),
                entries: &[uniform_entry::<SceneSlot>(
                    0,
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                )],
            });

        let scene_uniforms = UniformBuffer::<SceneSlot>::new(&device, "scene_uniform_buffer");

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("scene_bind_group"),
            layout: &scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_uniforms.binding(),
            }],
        });

        Ok(Self {
            device,
            queue,
            surface,
            config,
            depth_view,
            scene_bind_group_layout,
            scene_bind_group,
            scene_uniforms,
        })
    }

    pub fn required_limits() -> wgpu::Limits {
        wgpu::Limits {
            max_storage_buffers_per_shader_stage: 4,
            ..wgpu::Limits::default()
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = Self::create_depth_view(&self.device, width, height);
    }

    /// Reapply the current configuration after the surface was lost or outdated.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    /// Stage the camera matrices into the scene block.
    pub fn set_camera(&mut self, camera: &FlyCamera) {
        let aspect = self.aspect();
        let view = camera.view_matrix();
        let projection = camera.projection_matrix(aspect);
        let view_proj = camera.view_projection(aspect);

        let scene = &mut self.scene_uniforms;
        scene.set(SceneSlot::View, view);
        scene.set(SceneSlot::Projection, projection);
        scene.set(SceneSlot::ViewProj, view_proj);
        scene.set(SceneSlot::InverseViewProj, view_proj.inverse());
        scene.set(SceneSlot::CameraPosition, camera.position);
    }

    /// Upload the scene block if anything changed this frame.
    pub fn flush_scene(&mut self) {
        self.scene_uniforms.flush(&self.queue);
    }

    pub fn depth_format(&self) -> wgpu::TextureFormat {
        wgpu::TextureFormat::Depth32Float
    }

    fn create_depth_view(device: &Device, width: u32, height: u32) -> TextureView {
        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[wgpu::TextureFormat::Depth32Float],
        });

        depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_context_required_limits() {
        let limits = GpuContext::required_limits();
        // both water stages bind two storage buffers
        assert!(limits.max_storage_buffers_per_shader_stage >= 2);
        assert_eq!(
            limits.max_uniform_buffer_binding_size,
            wgpu::Limits::default().max_uniform_buffer_binding_size
        );
    }
}
