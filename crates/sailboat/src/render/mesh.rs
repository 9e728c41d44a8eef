//! Procedural boat and island meshes and their lit draw.

use glam::{Mat4, Vec3, Vec4};
use ocean_sim::config::IslandConfig;
use wgpu::util::DeviceExt;

use crate::app::uniforms::{uniform_entry, ModelSlot, UniformBuffer};
use crate::app::vertex::MeshVertex;
use crate::app::{GpuContext, PipelinePreset};
use crate::gpu::RenderError;

const MESH_SHADER: &str = include_str!("../gpu/shaders/mesh.wgsl");

const HULL: [f32; 3] = [0.55, 0.33, 0.2];
const DECK: [f32; 3] = [0.78, 0.62, 0.42];
const MAST: [f32; 3] = [0.35, 0.25, 0.15];
const SAIL: [f32; 3] = [0.95, 0.94, 0.9];
const SAND: [f32; 3] = [0.82, 0.74, 0.52];
const GRASS: [f32; 3] = [0.25, 0.5, 0.22];

/// CPU-side triangle mesh.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Flat-shaded triangle, wound counter-clockwise.
    fn triangle(&mut self, a: Vec3, b: Vec3, c: Vec3, color: [f32; 3]) {
        let normal = (b - a).cross(c - a).try_normalize().unwrap_or(Vec3::Y);
        let base = self.vertices.len() as u32;
        for p in [a, b, c] {
            self.vertices.push(MeshVertex {
                position: p.to_array(),
                normal: normal.to_array(),
                color,
            });
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }

    /// Triangle whose front face looks away from `inside`.
    fn outward_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3, inside: Vec3, color: [f32; 3]) {
        let centroid = (a + b + c) / 3.0;
        if (b - a).cross(c - a).dot(centroid - inside) >= 0.0 {
            self.triangle(a, b, c, color);
        } else {
            self.triangle(a, c, b, color);
        }
    }

    fn outward_quad(&mut self, quad: [Vec3; 4], inside: Vec3, color: [f32; 3]) {
        self.outward_triangle(quad[0], quad[1], quad[2], inside, color);
        self.outward_triangle(quad[0], quad[2], quad[3], inside, color);
    }

    /// Axis-aligned box from `min` to `max`.
    fn cuboid(&mut self, min: Vec3, max: Vec3, color: [f32; 3]) {
        let c = (min + max) * 0.5;
        let p = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
        let (x0, y0, z0, x1, y1, z1) = (min.x, min.y, min.z, max.x, max.y, max.z);
        self.outward_quad([p(x0, y0, z0), p(x1, y0, z0), p(x1, y1, z0), p(x0, y1, z0)], c, color);
        self.outward_quad([p(x0, y0, z1), p(x1, y0, z1), p(x1, y1, z1), p(x0, y1, z1)], c, color);
        self.outward_quad([p(x0, y0, z0), p(x0, y0, z1), p(x0, y1, z1), p(x0, y1, z0)], c, color);
        self.outward_quad([p(x1, y0, z0), p(x1, y0, z1), p(x1, y1, z1), p(x1, y1, z0)], c, color);
        self.outward_quad([p(x0, y1, z0), p(x1, y1, z0), p(x1, y1, z1), p(x0, y1, z1)], c, color);
        self.outward_quad([p(x0, y0, z0), p(x1, y0, z0), p(x1, y0, z1), p(x0, y0, z1)], c, color);
    }

    /// Band of a truncated cone between two rings, `segments` around.
    fn cone_band(&mut self, (r0, y0): (f32, f32), (r1, y1): (f32, f32), segments: u32, color: [f32; 3]) {
        let inside = Vec3::new(0.0, y0.min(y1) - 1.0, 0.0);
        let ring = |r: f32, y: f32, i: u32| {
            let a = i as f32 / segments as f32 * std::f32::consts::TAU;
            Vec3::new(a.cos() * r, y, a.sin() * r)
        };
        for i in 0..segments {
            let quad = [ring(r0, y0, i), ring(r0, y0, i + 1), ring(r1, y1, i + 1), ring(r1, y1, i)];
            if r1 <= f32::EPSILON {
                self.outward_triangle(quad[0], quad[1], quad[2], inside, color);
            } else {
                self.outward_quad(quad, inside, color);
            }
        }
    }
}

/// Hull, mast and sail. The bow points along -Z, the deck sits at y = 0.3.
pub fn boat_mesh() -> MeshData {
    let mut mesh = MeshData::default();

    let deck_y = 0.3;
    let keel_y = -0.35;
    let outline = [
        (0.0, -2.0),
        (0.6, -0.8),
        (0.7, 0.6),
        (0.5, 1.6),
        (-0.5, 1.6),
        (-0.7, 0.6),
        (-0.6, -0.8),
    ];
    let deck: Vec<Vec3> = outline.iter().map(|&(x, z)| Vec3::new(x, deck_y, z)).collect();
    let keel: Vec<Vec3> = outline
        .iter()
        .map(|&(x, z)| Vec3::new(x * 0.35, keel_y, z * 0.9))
        .collect();

    let centre = Vec3::new(0.0, (deck_y + keel_y) * 0.5, 0.0);
    let n = outline.len();
    for i in 0..n {
        let j = (i + 1) % n;
        mesh.outward_quad([deck[i], deck[j], keel[j], keel[i]], centre, HULL);
        mesh.outward_triangle(deck[i], deck[j], Vec3::new(0.0, deck_y, 0.0), centre, DECK);
        mesh.outward_triangle(keel[i], keel[j], Vec3::new(0.0, keel_y, 0.0), centre, HULL);
    }

    mesh.cuboid(Vec3::new(-0.04, deck_y, -0.24), Vec3::new(0.04, 3.0, -0.16), MAST);

    // sail is open: emit both faces
    let head = Vec3::new(0.0, 2.9, -0.2);
    let tack = Vec3::new(0.0, 0.55, -0.2);
    let clew = Vec3::new(0.0, 0.55, 1.3);
    let offset = Vec3::new(0.045, 0.0, 0.0);
    mesh.triangle(tack + offset, head + offset, clew + offset, SAIL);
    mesh.triangle(tack - offset, clew - offset, head - offset, SAIL);

    mesh
}

/// Two-tier cone: a sandy shore under a grassy peak. The base sits below the
/// water so wave troughs never expose it.
pub fn island_mesh(radius: f32, height: f32) -> MeshData {
    const SEGMENTS: u32 = 24;
    let mut mesh = MeshData::default();
    let shore = (radius * 0.8, height * 0.25);
    mesh.cone_band((radius, -1.0), shore, SEGMENTS, SAND);
    mesh.cone_band(shore, (0.0, height), SEGMENTS, GRASS);
    mesh
}

/// Mesh uploaded to the GPU with its own model block.
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    model: UniformBuffer<ModelSlot>,
    bind_group: wgpu::BindGroup,
}

impl GpuMesh {
    pub fn set_transform(&mut self, transform: Mat4) {
        self.model.set(ModelSlot::Model, transform);
    }

    pub fn flush(&mut self, queue: &wgpu::Queue) {
        self.model.flush(queue);
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_bind_group(1, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Pipeline and model layout shared by all lit meshes.
pub struct MeshRenderer {
    pipeline: wgpu::RenderPipeline,
    model_layout: wgpu::BindGroupLayout,
}

impl MeshRenderer {
    pub fn new(ctx: &GpuContext) -> Result<Self, RenderError> {
        let model_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Model Bind Group Layout"),
                entries: &[uniform_entry::<ModelSlot>(0, wgpu::ShaderStages::VERTEX)],
            });
        let pipeline = ctx.create_pipeline(
            PipelinePreset::OpaqueMesh,
            "Lit Mesh",
            MESH_SHADER,
            &[MeshVertex::desc()],
            &[&model_layout],
        )?;
        Ok(Self {
            pipeline,
            model_layout,
        })
    }

    pub fn upload(&self, ctx: &GpuContext, data: &MeshData, label: &str) -> GpuMesh {
        let device = &ctx.device;
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let mut model = UniformBuffer::<ModelSlot>::new(device, label);
        model.set(ModelSlot::Model, Mat4::IDENTITY);
        model.set(ModelSlot::Tint, Vec4::ONE);
        model.flush(&ctx.queue);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.model_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model.binding(),
            }],
        });

        GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
            model,
            bind_group,
        }
    }

    /// Island mesh placed at its configured position.
    pub fn upload_island(&self, ctx: &GpuContext, island: &IslandConfig) -> GpuMesh {
        let mut mesh = self.upload(ctx, &island_mesh(island.radius, island.height), "Island");
        let [x, z] = island.position;
        mesh.set_transform(Mat4::from_translation(Vec3::new(x, 0.0, z)));
        mesh.flush(&ctx.queue);
        mesh
    }

    pub fn draw<'m>(
        &self,
        pass: &mut wgpu::RenderPass<'_>,
        scene: &wgpu::BindGroup,
        meshes: impl IntoIterator<Item = &'m GpuMesh>,
    ) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, scene, &[]);
        for mesh in meshes {
            mesh.draw(pass);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check_well_formed(mesh: &MeshData) {
        assert!(!mesh.indices.is_empty());
        assert_eq!(mesh.indices.len() % 3, 0);
        let count = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
        for v in &mesh.vertices {
            let n = Vec3::from_array(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }

    /// Stored normals must agree with the counter-clockwise winding.
    fn check_winding(mesh: &MeshData) {
        for tri in mesh.indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| mesh.vertices[i as usize]);
            let pa = Vec3::from_array(a.position);
            let geometric = (Vec3::from_array(b.position) - pa).cross(Vec3::from_array(c.position) - pa);
            assert!(geometric.dot(Vec3::from_array(a.normal)) > 0.0);
        }
    }

    #[test]
    fn test_boat_mesh_well_formed() {
        let boat = boat_mesh();
        check_well_formed(&boat);
        check_winding(&boat);
    }

    #[test]
    fn test_boat_bow_points_negative_z() {
        let boat = boat_mesh();
        let min_z = boat.vertices.iter().map(|v| v.position[2]).fold(f32::MAX, f32::min);
        let max_z = boat.vertices.iter().map(|v| v.position[2]).fold(f32::MIN, f32::max);
        assert!((min_z + 2.0).abs() < 1e-6);
        assert!(max_z < -min_z);
    }

    #[test]
    fn test_hull_faces_point_outward() {
        let boat = boat_mesh();
        let deck_up = boat
            .vertices
            .iter()
            .filter(|v| v.color == DECK)
            .all(|v| v.normal[1] > 0.99);
        assert!(deck_up);
    }

    #[test]
    fn test_island_mesh_shape() {
        let island = island_mesh(4.0, 3.0);
        check_well_formed(&island);
        check_winding(&island);
        let top = island.vertices.iter().map(|v| v.position[1]).fold(f32::MIN, f32::max);
        let bottom = island.vertices.iter().map(|v| v.position[1]).fold(f32::MAX, f32::min);
        assert!((top - 3.0).abs() < 1e-6);
        assert!(bottom < -0.5);
        let widest = island
            .vertices
            .iter()
            .map(|v| (v.position[0].powi(2) + v.position[2].powi(2)).sqrt())
            .fold(0.0, f32::max);
        assert!((widest - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_island_sides_face_outward() {
        let island = island_mesh(2.0, 1.5);
        for v in &island.vertices {
            let radial = Vec3::new(v.position[0], 0.0, v.position[2]);
            if radial.length() > 1e-3 {
                assert!(Vec3::from_array(v.normal).dot(radial) > 0.0);
            }
        }
    }
}
