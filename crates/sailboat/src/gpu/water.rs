//! GPU backend of the water surface.
//!
//! Two compute stages rewrite the lattice every frame: heights, then normals
//! from those heights. Both run against the same bind group; the vertex and
//! normal buffers double as vertex buffers for the water draw, so nothing is
//! ever read back to the host.

use ocean_sim::water::{
    next_backend_id, run_water_frame, WaterCompute, WaterLattice, WaterReady, WaterStamp,
};
use wgpu::util::DeviceExt;

use crate::app::uniforms::{uniform_entry, UniformBuffer, WaterComputeSlot};
use crate::app::vertex::WaterVertex;
use crate::app::{GpuContext, PipelinePreset};
use crate::gpu::{compile_shader, RenderError};

const HEIGHT_SHADER: &str = include_str!("shaders/water_height.wgsl");
const NORMAL_SHADER: &str = include_str!("shaders/water_normals.wgsl");
const SURFACE_SHADER: &str = include_str!("shaders/water.wgsl");

/// One of the two compute stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum WaterStage {
    Heights,
    Normals,
}

/// Create a storage buffer bind group layout entry.
fn storage_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: false },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Water lattice buffers, compute pipelines and the surface draw.
pub struct GpuWaterField {
    id: u64,
    /// Height dispatches recorded so far
    frame: u64,
    grid_res: u32,
    index_count: u32,
    vertices: wgpu::Buffer,
    normals: wgpu::Buffer,
    indices: wgpu::Buffer,
    params: UniformBuffer<WaterComputeSlot>,
    compute_bind_group: wgpu::BindGroup,
    height_pipeline: wgpu::ComputePipeline,
    normal_pipeline: wgpu::ComputePipeline,
    render_pipeline: wgpu::RenderPipeline,
}

impl GpuWaterField {
    pub fn new(ctx: &GpuContext, lattice: &WaterLattice) -> Result<Self, RenderError> {
        let device = &ctx.device;
        let grid_res = lattice.grid_res();

        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Water Vertex Buffer"),
            contents: bytemuck::cast_slice(lattice.vertices()),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::VERTEX,
        });
        let flat = vec![[0.0f32, 1.0, 0.0, 0.0]; lattice.vertex_count()];
        let normals = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Water Normal Buffer"),
            contents: bytemuck::cast_slice(&flat),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Water Index Buffer"),
            contents: bytemuck::cast_slice(lattice.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        let mut params = UniformBuffer::<WaterComputeSlot>::new(device, "Water Params Buffer");
        params.set(WaterComputeSlot::GridRes, grid_res);
        params.set(WaterComputeSlot::GridSize, lattice.grid_size());
        params.flush(&ctx.queue);

        let compute_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Water Compute Layout"),
            entries: &[
                uniform_entry::<WaterComputeSlot>(0, wgpu::ShaderStages::COMPUTE),
                storage_entry(1), // vertices
                storage_entry(2), // normals
            ],
        });
        let compute_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Water Compute Bind Group"),
            layout: &compute_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: params.binding() },
                wgpu::BindGroupEntry { binding: 1, resource: vertices.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: normals.as_entire_binding() },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Water Compute Pipeline Layout"),
            bind_group_layouts: &[&compute_layout],
            push_constant_ranges: &[],
        });

        let height_shader = compile_shader(device, "Water Height Shader", HEIGHT_SHADER)?;
        let normal_shader = compile_shader(device, "Water Normal Shader", NORMAL_SHADER)?;

        let create_compute = |label: &str, module: &wgpu::ShaderModule| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(&pipeline_layout),
                module,
                entry_point: Some("main"),
                compilation_options: Default::default(),
                cache: None,
            })
        };
        let height_pipeline = create_compute("Water Height Pipeline", &height_shader);
        let normal_pipeline = create_compute("Water Normal Pipeline", &normal_shader);

        let render_pipeline = ctx.create_pipeline(
            PipelinePreset::DoubleSided,
            "Water Surface",
            SURFACE_SHADER,
            &[WaterVertex::position_desc(), WaterVertex::normal_desc()],
            &[],
        )?;

        log::info!(
            "Water lattice: {}x{} vertices over {} units",
            grid_res,
            grid_res,
            lattice.grid_size()
        );

        Ok(Self {
            id: next_backend_id(),
            frame: 0,
            grid_res,
            index_count: lattice.index_count() as u32,
            vertices,
            normals,
            indices,
            params,
            compute_bind_group,
            height_pipeline,
            normal_pipeline,
            render_pipeline,
        })
    }

    /// Record this frame's height and normal stages into `encoder`.
    pub fn record_frame(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        time: f32,
    ) -> WaterReady {
        let grid_res = self.grid_res;
        let mut dispatch = GpuWaterDispatch::new(self, queue, encoder);
        run_water_frame(&mut dispatch, grid_res, time)
    }

    fn stamp(&self) -> WaterStamp {
        WaterStamp {
            backend: self.id,
            frame: self.frame,
        }
    }

    /// Draw the surface. `ready` must come from this field's latest
    /// [`record_frame`](Self::record_frame); any other token skips the draw.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, scene: &wgpu::BindGroup, ready: &WaterReady) {
        if !ready.is_current(self.stamp()) {
            log::warn!(
                "Skipping water draw: token {:?} does not match field {:?}",
                ready.stamp(),
                self.stamp()
            );
            return;
        }
        pass.set_pipeline(&self.render_pipeline);
        pass.set_bind_group(0, scene, &[]);
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.set_vertex_buffer(1, self.normals.slice(..));
        pass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    fn pipeline(&self, stage: WaterStage) -> &wgpu::ComputePipeline {
        match stage {
            WaterStage::Heights => &self.height_pipeline,
            WaterStage::Normals => &self.normal_pipeline,
        }
    }
}

/// [`WaterCompute`] over a command encoder.
///
/// Dispatches are queued until the next barrier, which closes them into one
/// compute pass. wgpu orders storage writes across pass boundaries, so every
/// barrier is a pass boundary.
pub(crate) struct GpuWaterDispatch<'a> {
    field: &'a mut GpuWaterField,
    queue: &'a wgpu::Queue,
    encoder: &'a mut wgpu::CommandEncoder,
    pending: Vec<(WaterStage, [u32; 2])>,
}

impl<'a> GpuWaterDispatch<'a> {
    fn new(
        field: &'a mut GpuWaterField,
        queue: &'a wgpu::Queue,
        encoder: &'a mut wgpu::CommandEncoder,
    ) -> Self {
        Self {
            field,
            queue,
            encoder,
            pending: Vec::with_capacity(2),
        }
    }
}

impl WaterCompute for GpuWaterDispatch<'_> {
    fn dispatch_heights(&mut self, time: f32, groups: [u32; 2]) {
        self.field.frame += 1;
        self.field.params.set(WaterComputeSlot::Time, time);
        self.field.params.flush(self.queue);
        self.pending.push((WaterStage::Heights, groups));
    }

    fn dispatch_normals(&mut self, groups: [u32; 2]) {
        self.pending.push((WaterStage::Normals, groups));
    }

    fn barrier(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let field = &*self.field;
        let mut pass = self.encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some("Water Stage"),
            timestamp_writes: None,
        });
        pass.set_bind_group(0, &field.compute_bind_group, &[]);
        for (stage, groups) in self.pending.drain(..) {
            pass.set_pipeline(field.pipeline(stage));
            pass.dispatch_workgroups(groups[0], groups[1], 1);
        }
    }

    fn stamp(&self) -> WaterStamp {
        self.field.stamp()
    }
}
