//! Instanced billboards for the wind particles.

use ocean_sim::ParticlePool;

use crate::app::vertex::ParticleInstance;
use crate::app::{GpuContext, PipelinePreset};
use crate::gpu::RenderError;

const PARTICLE_SHADER: &str = include_str!("../gpu/shaders/particle.wgsl");

/// Vertices per billboard quad.
const QUAD_VERTICES: u32 = 6;

/// Instance records for every live particle, in pool order.
pub fn collect_instances(pool: &ParticlePool, size: f32, out: &mut Vec<ParticleInstance>) {
    out.clear();
    out.extend(pool.alive().map(|p| ParticleInstance::new(p, size)));
}

pub struct ParticleRenderer {
    pipeline: wgpu::RenderPipeline,
    instance_buffer: wgpu::Buffer,
    capacity: usize,
    instances: Vec<ParticleInstance>,
}

impl ParticleRenderer {
    /// `capacity` is the pool size; the instance buffer never grows.
    pub fn new(ctx: &GpuContext, capacity: usize) -> Result<Self, RenderError> {
        let pipeline = ctx.create_pipeline(
            PipelinePreset::Transparent,
            "Wind Particles",
            PARTICLE_SHADER,
            &[ParticleInstance::desc()],
            &[],
        )?;
        let capacity = capacity.max(1);
        let instance_buffer = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Wind Particle Instances"),
            size: (capacity * std::mem::size_of::<ParticleInstance>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        Ok(Self {
            pipeline,
            instance_buffer,
            capacity,
            instances: Vec::with_capacity(capacity),
        })
    }

    /// Copy the live particles into the instance buffer.
    pub fn upload(&mut self, queue: &wgpu::Queue, pool: &ParticlePool, size: f32) {
        collect_instances(pool, size, &mut self.instances);
        self.instances.truncate(self.capacity);
        if !self.instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.instances));
        }
    }

    pub fn live_count(&self) -> u32 {
        self.instances.len() as u32
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, scene: &wgpu::BindGroup) {
        let count = self.live_count();
        if count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, scene, &[]);
        pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        pass.draw(0..QUAD_VERTICES, 0..count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    #[test]
    fn test_only_live_particles_become_instances() {
        let mut pool = ParticlePool::new(4);
        {
            let particles = pool.particles_mut();
            particles[1].life = 2.0;
            particles[1].position = Vec3::new(1.0, 2.0, 3.0);
            particles[1].color = Vec4::new(1.0, 1.0, 1.0, 0.5);
            particles[3].life = 0.1;
        }
        let mut out = Vec::new();
        collect_instances(&pool, 0.2, &mut out);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].position, [1.0, 2.0, 3.0]);
        assert_eq!(out[0].color[3], 0.5);
        assert!(out.iter().all(|i| i.size == 0.2));
    }

    #[test]
    fn test_collect_reuses_buffer() {
        let mut pool = ParticlePool::new(2);
        pool.particles_mut()[0].life = 1.0;
        let mut out = vec![ParticleInstance::new(&pool.particles()[0], 1.0); 5];
        collect_instances(&pool, 1.0, &mut out);
        assert_eq!(out.len(), 1);

        pool.particles_mut()[0].life = 0.0;
        collect_instances(&pool, 1.0, &mut out);
        assert!(out.is_empty());
    }
}
