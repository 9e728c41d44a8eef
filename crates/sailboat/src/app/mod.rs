//! Window, GPU context and per-frame plumbing shared by the scene.

pub mod camera;
pub mod context;
pub mod pipeline;
pub mod runner;
pub mod uniforms;
pub mod vertex;

pub use camera::{FlyCamera, InputState};
pub use context::GpuContext;
pub use pipeline::PipelinePreset;
pub use runner::{run, App};
pub use uniforms::{ModelSlot, SceneSlot, UniformBuffer, UniformSlot, WaterComputeSlot};
