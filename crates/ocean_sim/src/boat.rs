//! Boat pose driven by steering and throttle.

use glam::{Mat4, Vec3};

use crate::config::BoatConfig;
use crate::water::wave_height;

/// Externally supplied controls, each in [-1, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoatInput {
    /// Positive turns left (counter-clockwise seen from above)
    pub steer: f32,
    /// Positive moves the bow forward
    pub throttle: f32,
}

/// The boat's pose. The bow points along local -Z.
#[derive(Clone, Debug)]
pub struct Boat {
    pose: Mat4,
    turn_rate: f32,
    speed: f32,
    scale: f32,
    draft_offset: f32,
}

impl Boat {
    pub fn new(config: &BoatConfig) -> Self {
        Self {
            pose: Mat4::IDENTITY,
            turn_rate: config.turn_rate,
            speed: config.speed,
            scale: config.scale,
            draft_offset: config.draft_offset,
        }
    }

    pub fn pose(&self) -> Mat4 {
        self.pose
    }

    /// Translation column of the pose; the particle spawn anchor.
    pub fn position(&self) -> Vec3 {
        self.pose.w_axis.truncate()
    }

    pub fn heading(&self) -> Vec3 {
        self.pose
            .transform_vector3(Vec3::NEG_Z)
            .try_normalize()
            .unwrap_or(Vec3::NEG_Z)
    }

    /// Accumulate rotation, then translate along the new heading.
    pub fn update(&mut self, input: &BoatInput, dt: f32) {
        let steer = input.steer.clamp(-1.0, 1.0);
        let throttle = input.throttle.clamp(-1.0, 1.0);
        if steer != 0.0 {
            self.pose *= Mat4::from_rotation_y(steer * self.turn_rate * dt);
        }
        if throttle != 0.0 {
            self.pose *= Mat4::from_translation(Vec3::NEG_Z * (throttle * self.speed * dt));
        }
    }

    /// Render transform: the pose lifted onto the wave surface and scaled.
    pub fn model_matrix(&self, time: f32) -> Mat4 {
        let p = self.position();
        let lift = wave_height(p.x, p.z, time) + self.draft_offset;
        Mat4::from_translation(Vec3::Y * lift) * self.pose * Mat4::from_scale(Vec3::splat(self.scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boat() -> Boat {
        Boat::new(&BoatConfig::default())
    }

    #[test]
    fn test_idle_boat_stays_put() {
        let mut b = boat();
        b.update(&BoatInput::default(), 1.0);
        assert_eq!(b.pose(), Mat4::IDENTITY);
    }

    #[test]
    fn test_throttle_moves_forward() {
        let mut b = boat();
        b.update(&BoatInput { steer: 0.0, throttle: 1.0 }, 0.5);
        let p = b.position();
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_steer_then_throttle_follows_heading() {
        let mut b = boat();
        // quarter turn left: bow from -Z to -X
        let quarter = std::f32::consts::FRAC_PI_2 / 0.8;
        b.update(&BoatInput { steer: 1.0, throttle: 0.0 }, quarter);
        assert!((b.heading() - Vec3::NEG_X).length() < 1e-4);
        b.update(&BoatInput { steer: 0.0, throttle: 1.0 }, 1.0);
        assert!((b.position() - Vec3::new(-2.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_inputs_clamped() {
        let mut b = boat();
        b.update(&BoatInput { steer: 0.0, throttle: 10.0 }, 1.0);
        assert!((b.position().length() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_model_matrix_rides_waves() {
        let b = boat();
        let m = b.model_matrix(3.0);
        let expected = wave_height(0.0, 0.0, 3.0) + 0.1;
        assert!((m.w_axis.y - expected).abs() < 1e-6);
    }
}
