//! Per-frame simulation state owned by the frame loop.

use glam::Vec3;

use crate::boat::{Boat, BoatInput};
use crate::celestial::{SunCycle, SunState};
use crate::config::SceneConfig;
use crate::wind::{WindField, WindSimulator};

/// Summary of one [`SimulationState::step`].
#[derive(Clone, Copy, Debug)]
pub struct FrameStats {
    pub time: f32,
    pub spawned: Option<usize>,
    pub alive: usize,
    pub wind_direction: Vec3,
}

/// All mutable CPU-side scene state.
pub struct SimulationState {
    time: f32,
    spawn_probability: f64,
    wind: WindField,
    wind_direction: Vec3,
    particles: WindSimulator,
    boat: Boat,
    sun_cycle: SunCycle,
    sun: SunState,
}

impl SimulationState {
    pub fn new(config: &SceneConfig) -> Self {
        let wind = WindField::new(&config.wind);
        let sun_cycle = SunCycle::new(&config.sun);
        let sun = sun_cycle.compute(0.0);
        Self {
            time: 0.0,
            spawn_probability: config.particles.spawn_probability,
            wind_direction: wind.direction_at(0.0),
            wind,
            particles: WindSimulator::new(&config.particles, &config.wind),
            boat: Boat::new(&config.boat),
            sun_cycle,
            sun,
        }
    }

    /// Advance by `dt`: boat controls, then sun, then wind particles.
    pub fn step(&mut self, dt: f32, input: &BoatInput) -> FrameStats {
        let dt = dt.max(0.0);
        self.time += dt;

        self.boat.update(input, dt);

        self.sun = self.sun_cycle.compute(self.time);

        self.wind_direction = self.wind.direction_at(self.time);
        let anchor = self.boat.position();
        let spawned = self
            .particles
            .try_spawn(self.spawn_probability, self.wind_direction, anchor);
        let alive = self.particles.update(dt, self.time, self.wind_direction);

        FrameStats {
            time: self.time,
            spawned,
            alive,
            wind_direction: self.wind_direction,
        }
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn sun(&self) -> &SunState {
        &self.sun
    }

    pub fn wind(&self) -> &WindField {
        &self.wind
    }

    pub fn wind_direction(&self) -> Vec3 {
        self.wind_direction
    }

    pub fn particles(&self) -> &WindSimulator {
        &self.particles
    }

    pub fn boat(&self) -> &Boat {
        &self.boat
    }
}
