use wgpu::*;

use super::context::GpuContext;
use crate::gpu::{compile_shader, RenderError};

/// Fixed-function state shared by the scene's render pipelines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelinePreset {
    /// Closed lit meshes
    OpaqueMesh,
    /// Open surfaces seen from both sides (water, sail)
    DoubleSided,
    /// Alpha-blended billboards, depth-tested but not written
    Transparent,
    /// Drawn first behind everything, ignores depth
    Background,
}

impl PipelinePreset {
    fn topology(&self) -> PrimitiveTopology {
        PrimitiveTopology::TriangleList
    }

    fn cull_mode(&self) -> Option<Face> {
        match self {
            PipelinePreset::OpaqueMesh => Some(Face::Back),
            _ => None,
        }
    }

    fn blend(&self) -> Option<BlendState> {
        match self {
            PipelinePreset::Transparent => Some(BlendState::ALPHA_BLENDING),
            _ => None,
        }
    }

    fn depth_write_enabled(&self) -> bool {
        matches!(self, PipelinePreset::OpaqueMesh | PipelinePreset::DoubleSided)
    }

    fn depth_compare(&self) -> CompareFunction {
        match self {
            PipelinePreset::Background => CompareFunction::Always,
            _ => CompareFunction::Less,
        }
    }
}

impl GpuContext {
    /// Build a render pipeline whose group 0 is the scene block.
    ///
    /// The shader must export `vs_main` and `fs_main`.
    pub fn create_pipeline(
        &self,
        preset: PipelinePreset,
        label: &str,
        shader_source: &str,
        vertex_layouts: &[VertexBufferLayout],
        additional_bind_group_layouts: &[&BindGroupLayout],
    ) -> Result<RenderPipeline, RenderError> {
        let shader = compile_shader(&self.device, label, shader_source)?;

        let mut bind_group_layouts = vec![&self.scene_bind_group_layout];
        bind_group_layouts.extend(additional_bind_group_layouts);

        let pipeline_layout = self
            .device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some(label),
                bind_group_layouts: &bind_group_layouts,
                push_constant_ranges: &[],
            });

        let target = Some(ColorTargetState {
            format: self.config.format,
            blend: preset.blend(),
            write_mask: ColorWrites::ALL,
        });

        let depth_stencil = Some(DepthStencilState {
            format: self.depth_format(),
            depth_compare: preset.depth_compare(),
            depth_write_enabled: preset.depth_write_enabled(),
            stencil: StencilState::default(),
            bias: DepthBiasState::default(),
        });

        Ok(self.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),
            cache: None,
            vertex: VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: vertex_layouts,
            },
            primitive: PrimitiveState {
                topology: preset.topology(),
                strip_index_format: None,
                front_face: FrontFace::Ccw,
                cull_mode: preset.cull_mode(),
                unclipped_depth: false,
                polygon_mode: PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil,
            multisample: MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            fragment: Some(FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[target],
            }),
            multiview: None,
        }))
    }
}
