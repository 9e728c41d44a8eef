//! Regular lattice backing the water surface.

/// Threads per workgroup side in both water compute stages.
pub const WORKGROUP_SIZE: u32 = 16;

/// Workgroups per side needed to cover `grid_res` vertices.
pub fn workgroup_count(grid_res: u32) -> u32 {
    grid_res.div_ceil(WORKGROUP_SIZE)
}

/// Vertex and index data for a `grid_res x grid_res` lattice.
///
/// Vertices are `[x, height, z, 0]`, row-major in z then x, spanning
/// `grid_size` world units centred on the origin.
#[derive(Clone, Debug)]
pub struct WaterLattice {
    grid_res: u32,
    grid_size: f32,
    vertices: Vec<[f32; 4]>,
    indices: Vec<u32>,
}

impl WaterLattice {
    pub fn new(grid_res: u32, grid_size: f32) -> Self {
        let res = grid_res as usize;
        let mut vertices = Vec::with_capacity(res * res);
        let mut indices = Vec::with_capacity(6 * res.saturating_sub(1).pow(2));
        let step = if grid_res > 1 {
            grid_size / (grid_res - 1) as f32
        } else {
            0.0
        };
        let half = grid_size * 0.5;

        for z in 0..grid_res {
            for x in 0..grid_res {
                vertices.push([x as f32 * step - half, 0.0, z as f32 * step - half, 0.0]);

                if x + 1 < grid_res && z + 1 < grid_res {
                    let top_left = z * grid_res + x;
                    let top_right = top_left + 1;
                    let bottom_left = top_left + grid_res;
                    let bottom_right = bottom_left + 1;
                    indices.extend_from_slice(&[top_left, bottom_left, top_right]);
                    indices.extend_from_slice(&[top_right, bottom_left, bottom_right]);
                }
            }
        }

        Self {
            grid_res,
            grid_size,
            vertices,
            indices,
        }
    }

    pub fn grid_res(&self) -> u32 {
        self.grid_res
    }

    pub fn grid_size(&self) -> f32 {
        self.grid_size
    }

    /// Distance between neighbouring vertices.
    pub fn spacing(&self) -> f32 {
        if self.grid_res > 1 {
            self.grid_size / (self.grid_res - 1) as f32
        } else {
            0.0
        }
    }

    pub fn vertices(&self) -> &[[f32; 4]] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}
