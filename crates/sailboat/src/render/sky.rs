//! Sky gradient and sun disc. Both read only the scene block.

use crate::app::{GpuContext, PipelinePreset};
use crate::gpu::RenderError;

const SKYBOX_SHADER: &str = include_str!("../gpu/shaders/skybox.wgsl");
const SUN_SHADER: &str = include_str!("../gpu/shaders/sun.wgsl");

pub struct SkyRenderer {
    sky_pipeline: wgpu::RenderPipeline,
    sun_pipeline: wgpu::RenderPipeline,
}

impl SkyRenderer {
    pub fn new(ctx: &GpuContext) -> Result<Self, RenderError> {
        let sky_pipeline = ctx.create_pipeline(PipelinePreset::Background, "Skybox", SKYBOX_SHADER, &[], &[])?;
        let sun_pipeline = ctx.create_pipeline(PipelinePreset::Transparent, "Sun", SUN_SHADER, &[], &[])?;
        Ok(Self {
            sky_pipeline,
            sun_pipeline,
        })
    }

    /// Full-screen triangle behind the scene.
    pub fn draw_sky(&self, pass: &mut wgpu::RenderPass<'_>, scene: &wgpu::BindGroup) {
        pass.set_pipeline(&self.sky_pipeline);
        pass.set_bind_group(0, scene, &[]);
        pass.draw(0..3, 0..1);
    }

    pub fn draw_sun(&self, pass: &mut wgpu::RenderPass<'_>, scene: &wgpu::BindGroup) {
        pass.set_pipeline(&self.sun_pipeline);
        pass.set_bind_group(0, scene, &[]);
        pass.draw(0..6, 0..1);
    }
}
