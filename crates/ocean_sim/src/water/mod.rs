//! Animated water surface.
//!
//! The surface is a fixed lattice whose heights and normals are rewritten by
//! two compute stages each frame. This module holds the lattice, the pure wave
//! function both backends evaluate, and the dispatch protocol that keeps the
//! stages ordered.

pub mod field;
pub mod lattice;
pub mod pipeline;

pub use field::{compute_normals, wave_height, CpuWaterField, WaveComponent, WAVES};
pub use lattice::{workgroup_count, WaterLattice, WORKGROUP_SIZE};
pub use pipeline::{
    next_backend_id, run_water_frame, HeightPending, NormalsPending, Ready, WaterCompute, WaterFrame,
    WaterReady, WaterStamp,
};
