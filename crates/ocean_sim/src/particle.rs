//! Wind particle records and the fixed-capacity pool they live in.

use glam::{Vec3, Vec4};

/// A single wind particle.
///
/// `life` is the number of seconds remaining. A particle with `life <= 0.0`
/// is dead and the rest of its fields are meaningless until it is respawned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// RGB tint, alpha is the fade factor
    pub color: Vec4,
    pub life: f32,
    /// Phase offset for the lateral oscillation, in [-PI, PI]
    pub seed: f32,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            color: Vec4::ONE,
            life: 0.0,
            seed: 0.0,
        }
    }
}

impl Particle {
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Fixed-size arena of particles with a reuse cursor.
///
/// The pool never grows or shrinks; dead slots are reclaimed by
/// [`ParticlePool::find_slot`].
pub struct ParticlePool {
    particles: Vec<Particle>,
    last_used: usize,
}

impl ParticlePool {
    /// Create a pool of `capacity` dead particles.
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: vec![Particle::default(); capacity],
            last_used: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.last_used
    }

    /// Move the reuse cursor. Values past the end are clamped to the last slot.
    pub fn set_cursor(&mut self, cursor: usize) {
        self.last_used = cursor.min(self.particles.len().saturating_sub(1));
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn alive(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.is_alive())
    }

    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    /// Pick the slot for the next respawn and move the cursor onto it.
    ///
    /// Scans `[cursor, len)` for a dead particle, then `[0, cursor)`. When every
    /// particle is alive, slot 0 is reused.
    pub fn find_slot(&mut self) -> usize {
        let cursor = self.last_used;
        let slot = self.particles[cursor..]
            .iter()
            .position(|p| !p.is_alive())
            .map(|offset| cursor + offset)
            .or_else(|| self.particles[..cursor].iter().position(|p| !p.is_alive()))
            .unwrap_or(0);
        self.last_used = slot;
        slot
    }
}
