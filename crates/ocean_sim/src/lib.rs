//! CPU-side simulation for the sailboat scene.
//!
//! Owns everything the frame loop mutates on the host: the wind particle pool,
//! the boat pose, the sun state, and the water lattice plus the dispatch
//! protocol for its GPU stages.
//!
//! # Example
//!
//! ```
//! use ocean_sim::{BoatInput, SceneConfig, SimulationState};
//!
//! let mut config = SceneConfig::default();
//! config.particles.seed = Some(1);
//! let mut state = SimulationState::new(&config);
//!
//! let stats = state.step(1.0 / 60.0, &BoatInput::default());
//! assert!(stats.alive <= config.particles.count);
//! ```

pub mod boat;
pub mod celestial;
pub mod config;
pub mod particle;
pub mod state;
pub mod water;
pub mod wind;

pub use boat::{Boat, BoatInput};
pub use celestial::{SunCycle, SunState};
pub use config::{ConfigError, SceneConfig};
pub use particle::{Particle, ParticlePool};
pub use state::{FrameStats, SimulationState};
pub use water::{
    run_water_frame, CpuWaterField, WaterCompute, WaterFrame, WaterLattice, WaterReady, WaterStamp,
};
pub use wind::{WindField, WindSimulator};
