//! Wind field and the wind particle simulator.
//!
//! Particles are spawned in a "wind tunnel": a band perpendicular to the wind,
//! upwind of an anchor (the boat). They drift with the wind, oscillate
//! sideways with a per-particle phase and fade in and out at the ends of
//! their life.

use glam::{Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{ParticleConfig, WindConfig};
use crate::particle::{Particle, ParticlePool};

/// World up axis used to build the horizontal side axis.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Fraction of the wind direction given to a freshly spawned particle's velocity.
const SPAWN_VELOCITY_SCALE: f32 = 0.5;

/// Normalize a wind vector, substituting +Z when it has no length.
pub fn safe_direction(wind: Vec3) -> Vec3 {
    wind.try_normalize().unwrap_or(Vec3::Z)
}

/// Unit axis perpendicular to `wind` and world up (right-hand rule).
///
/// Wind parallel to up has no such axis; +X is used instead.
pub fn side_axis(wind: Vec3) -> Vec3 {
    wind.cross(WORLD_UP).try_normalize().unwrap_or(Vec3::X)
}

/// Base wind with slow large-scale gusts.
#[derive(Clone, Debug)]
pub struct WindField {
    base: Vec3,
    frequency: f32,
    max_angle: f32,
    scale_negative: f32,
    scale_positive: f32,
}

impl WindField {
    pub fn new(config: &WindConfig) -> Self {
        let base = config.direction();
        if base.length_squared() < 1e-12 {
            log::warn!("Zero wind direction configured, falling back to +Z");
        }
        Self {
            base: safe_direction(base),
            frequency: config.wave_frequency(),
            max_angle: config.max_gust_angle_deg.to_radians(),
            scale_negative: config.gust_scale_negative,
            scale_positive: config.gust_scale_positive,
        }
    }

    pub fn base_direction(&self) -> Vec3 {
        self.base
    }

    /// Gust swing about world up at `time` (radians). Negative and positive
    /// swings are scaled differently so the wind leans to one side.
    pub fn gust_angle(&self, time: f32) -> f32 {
        let angle = (time * self.frequency).sin() * self.max_angle;
        if angle < 0.0 {
            angle * self.scale_negative
        } else {
            angle * self.scale_positive
        }
    }

    /// Unit wind direction at `time`.
    pub fn direction_at(&self, time: f32) -> Vec3 {
        let w = self.base;
        let swing = side_axis(w) * (w.length() * self.gust_angle(time).sin());
        safe_direction(w + swing)
    }
}

/// Owns the particle pool and advances it every frame.
pub struct WindSimulator {
    pool: ParticlePool,
    config: ParticleConfig,
    wind_speed: f32,
    wave_frequency: f32,
    side_amplitude: f32,
    rng: StdRng,
}

impl WindSimulator {
    pub fn new(particles: &ParticleConfig, wind: &WindConfig) -> Self {
        let rng = match particles.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            pool: ParticlePool::new(particles.count),
            config: particles.clone(),
            wind_speed: wind.speed,
            wave_frequency: wind.wave_frequency(),
            side_amplitude: wind.side_amplitude,
            rng,
        }
    }

    /// Read-only view for the draw pass.
    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    /// With the given probability, claim a slot and respawn it.
    ///
    /// Returns the respawned slot, or `None` when the roll failed.
    pub fn try_spawn(&mut self, probability: f64, wind_direction: Vec3, anchor: Vec3) -> Option<usize> {
        if self.pool.is_empty() {
            return None;
        }
        let roll: f64 = self.rng.gen();
        if roll > probability {
            return None;
        }
        let slot = self.pool.find_slot();
        self.respawn(slot, wind_direction, anchor);
        log::debug!("Respawned wind particle {}", slot);
        Some(slot)
    }

    /// Reinitialize every field of the particle at `index`.
    pub fn respawn(&mut self, index: usize, wind_direction: Vec3, anchor: Vec3) {
        let w = safe_direction(wind_direction);
        let cfg = &self.config;

        let distance_against_wind = self.rng.gen_range(cfg.min_distance..=cfg.max_distance);
        let half_width = cfg.tunnel_width * 0.5;
        let distance_to_side = self.rng.gen_range(-half_width..=half_width);
        let height = self.rng.gen_range(cfg.min_height..=cfg.max_height);
        let tint = 0.8 + self.rng.gen_range(0.0..0.1f32);
        let seed = self.rng.gen_range(-std::f32::consts::PI..=std::f32::consts::PI);

        let against_wind = -w * distance_against_wind;
        let side_vec = side_axis(w) * distance_to_side;
        // side_vec is already scaled once, so the lateral offset is quadratic
        let side_offset = side_vec * distance_to_side;
        let mut offset = against_wind + side_offset;
        offset.y = height;

        let life = cfg.life;
        if let Some(p) = self.pool.particles_mut().get_mut(index) {
            *p = Particle {
                position: anchor + offset,
                velocity: w * SPAWN_VELOCITY_SCALE,
                color: Vec4::new(tint, tint, tint, 0.0),
                life,
                seed,
            };
        }
    }

    /// Advance all live particles by `dt` seconds at absolute `time`.
    ///
    /// Returns the number of particles still alive.
    pub fn update(&mut self, dt: f32, time: f32, wind_direction: Vec3) -> usize {
        let w = safe_direction(wind_direction);
        let side = side_axis(w);
        let full_life = self.config.life;
        let fade_window = self.config.fade_window;
        let fade = dt * self.config.fade_rate;

        let mut alive = 0;
        for p in self.pool.particles_mut() {
            p.life -= dt;
            if !p.is_alive() {
                continue;
            }
            alive += 1;

            let lateral = ((time + p.seed) * self.wave_frequency).sin() * self.side_amplitude;
            let direction = safe_direction(w + side * lateral);
            p.velocity = direction * self.wind_speed;
            p.position += p.velocity * dt;

            if p.life < fade_window {
                p.color.w -= fade;
            }
            if full_life - p.life <= fade_window {
                p.color.w += fade;
            }
            p.color.w = p.color.w.clamp(0.0, 1.0);
        }
        alive
    }
}
