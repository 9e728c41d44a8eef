//! Wave function and the CPU backend of the water compute protocol.
//!
//! `water_height.wgsl` evaluates the same sum of sines as [`wave_height`]; keep
//! the two tables in step.

use glam::{Vec3, Vec4};

use super::lattice::{WaterLattice, WORKGROUP_SIZE};
use super::pipeline::{next_backend_id, WaterCompute, WaterStamp};

/// One directional sine wave.
#[derive(Clone, Copy, Debug)]
pub struct WaveComponent {
    /// Unit travel direction in the xz plane
    pub direction: [f32; 2],
    /// Radians per world unit
    pub wavenumber: f32,
    pub amplitude: f32,
    /// Radians per second
    pub speed: f32,
    pub phase: f32,
}

pub const WAVES: [WaveComponent; 4] = [
    WaveComponent { direction: [1.0, 0.0], wavenumber: 0.35, amplitude: 0.25, speed: 1.1, phase: 0.0 },
    WaveComponent { direction: [0.0, 1.0], wavenumber: 0.5, amplitude: 0.15, speed: 0.8, phase: 1.3 },
    WaveComponent { direction: [0.7071, 0.7071], wavenumber: 0.9, amplitude: 0.08, speed: 1.7, phase: 0.4 },
    WaveComponent { direction: [0.8575, -0.5145], wavenumber: 1.6, amplitude: 0.04, speed: 2.3, phase: 2.1 },
];

/// Surface displacement at world `(x, z)` and `time`. Stateless.
pub fn wave_height(x: f32, z: f32, time: f32) -> f32 {
    WAVES
        .iter()
        .map(|w| {
            let along = w.direction[0] * x + w.direction[1] * z;
            w.amplitude * (w.wavenumber * along + w.speed * time + w.phase).sin()
        })
        .sum()
}

/// Finite-difference normals over a `grid_res x grid_res` vertex field.
///
/// Neighbours are clamped at the lattice edges.
pub fn compute_normals(vertices: &[Vec4], grid_res: u32) -> Vec<Vec4> {
    let res = grid_res as i64;
    let sample = |x: i64, z: i64| -> Vec3 {
        let cx = x.clamp(0, res - 1);
        let cz = z.clamp(0, res - 1);
        vertices[(cz * res + cx) as usize].truncate()
    };

    let mut normals = Vec::with_capacity(vertices.len());
    for z in 0..res {
        for x in 0..res {
            let left = sample(x - 1, z);
            let right = sample(x + 1, z);
            let down = sample(x, z - 1);
            let up = sample(x, z + 1);
            let n = (up - down).cross(right - left).try_normalize().unwrap_or(Vec3::Y);
            normals.push(n.extend(0.0));
        }
    }
    normals
}

/// CPU implementation of the water stages.
///
/// Writes from a dispatch are staged and only become visible after
/// [`WaterCompute::barrier`], the way storage writes behave on the GPU. The
/// field also records which height frame each normals dispatch observed, so
/// ordering mistakes show up as stale frame numbers.
pub struct CpuWaterField {
    id: u64,
    grid_res: u32,
    vertices: Vec<Vec4>,
    normals: Vec<Vec4>,
    staged_vertices: Option<Vec<Vec4>>,
    staged_normals: Option<(Vec<Vec4>, u64)>,
    frame: u64,
    heights_frame: u64,
    normals_source_frame: u64,
}

impl CpuWaterField {
    pub fn new(lattice: &WaterLattice) -> Self {
        let vertices: Vec<Vec4> = lattice.vertices().iter().map(|v| Vec4::from_array(*v)).collect();
        let normals = vec![Vec4::new(0.0, 1.0, 0.0, 0.0); vertices.len()];
        Self {
            id: next_backend_id(),
            grid_res: lattice.grid_res(),
            vertices,
            normals,
            staged_vertices: None,
            staged_normals: None,
            frame: 0,
            heights_frame: 0,
            normals_source_frame: 0,
        }
    }

    /// Visible vertex records.
    pub fn vertices(&self) -> &[Vec4] {
        &self.vertices
    }

    /// Visible normals.
    pub fn normals(&self) -> &[Vec4] {
        &self.normals
    }

    /// Number of height dispatches issued so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Height dispatch whose writes are currently visible.
    pub fn heights_frame(&self) -> u64 {
        self.heights_frame
    }

    /// Height frame the visible normals were computed from.
    pub fn normals_source_frame(&self) -> u64 {
        self.normals_source_frame
    }

    fn invocations(&self, groups: [u32; 2]) -> impl Iterator<Item = usize> {
        let res = self.grid_res;
        let (gx, gz) = (groups[0] * WORKGROUP_SIZE, groups[1] * WORKGROUP_SIZE);
        (0..gz)
            .flat_map(move |z| (0..gx).map(move |x| (x, z)))
            .filter(move |&(x, z)| x < res && z < res)
            .map(move |(x, z)| (z * res + x) as usize)
    }
}

impl WaterCompute for CpuWaterField {
    fn dispatch_heights(&mut self, time: f32, groups: [u32; 2]) {
        self.frame += 1;
        let mut staged = self.vertices.clone();
        for index in self.invocations(groups) {
            let v = staged[index];
            staged[index] = Vec4::new(v.x, wave_height(v.x, v.z, time), v.z, 0.0);
        }
        self.staged_vertices = Some(staged);
    }

    fn dispatch_normals(&mut self, groups: [u32; 2]) {
        let all = compute_normals(&self.vertices, self.grid_res);
        let mut staged = self.normals.clone();
        for index in self.invocations(groups) {
            staged[index] = all[index];
        }
        self.staged_normals = Some((staged, self.heights_frame));
    }

    fn barrier(&mut self) {
        if let Some(vertices) = self.staged_vertices.take() {
            self.vertices = vertices;
            self.heights_frame = self.frame;
        }
        if let Some((normals, source)) = self.staged_normals.take() {
            self.normals = normals;
            self.normals_source_frame = source;
        }
    }

    fn stamp(&self) -> WaterStamp {
        WaterStamp {
            backend: self.id,
            frame: self.frame,
        }
    }
}
