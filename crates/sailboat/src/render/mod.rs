//! Scene renderers layered over the shared scene block.

pub mod mesh;
pub mod particles;
pub mod sky;

pub use mesh::{boat_mesh, island_mesh, GpuMesh, MeshData, MeshRenderer};
pub use particles::ParticleRenderer;
pub use sky::SkyRenderer;
