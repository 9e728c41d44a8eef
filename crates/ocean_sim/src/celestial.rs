//! Sun orbit and directional light derived from it.

use glam::Vec3;

use crate::config::SunConfig;

/// Ambient share of the blended sun colour.
pub const AMBIENT_SCALE: f32 = 0.2;
/// Diffuse share of the blended sun colour.
pub const DIFFUSE_SCALE: f32 = 0.8;
/// Specular share of the blended sun colour.
pub const SPECULAR_SCALE: f32 = 1.0;

/// Directional light state for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SunState {
    pub position: Vec3,
    /// Unit vector pointing from the sun towards the world origin
    pub direction: Vec3,
    /// Normalized height of the sun, in [-1, 1]
    pub altitude: f32,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

/// Hermite smoothstep, matching the WGSL builtin.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Time-parameterized sun on a circular orbit.
#[derive(Clone, Debug)]
pub struct SunCycle {
    radius: f32,
    period: f32,
    tilt: f32,
    sunset: Vec3,
    daylight: Vec3,
    band_low: f32,
    band_high: f32,
}

impl SunCycle {
    pub fn new(config: &SunConfig) -> Self {
        Self {
            radius: config.orbit_radius,
            period: config.period,
            tilt: config.orbit_tilt,
            sunset: Vec3::from_array(config.sunset_color),
            daylight: Vec3::from_array(config.daylight_color),
            band_low: config.band_low,
            band_high: config.band_high,
        }
    }

    /// Orbit angle at `time` (radians).
    pub fn angle(&self, time: f32) -> f32 {
        (time / self.period) * std::f32::consts::TAU
    }

    /// Point on a circle of the configured radius. The horizontal axis of the
    /// orbit plane leans towards +Z by the tilt.
    pub fn position(&self, time: f32) -> Vec3 {
        let angle = self.angle(time);
        let horizontal = Vec3::new(1.0, 0.0, self.tilt).normalize();
        (horizontal * angle.cos() + Vec3::Y * angle.sin()) * self.radius
    }

    /// Blend between the sunset and daylight colours by altitude.
    pub fn color_for_altitude(&self, altitude: f32) -> Vec3 {
        let t = smoothstep(self.band_low, self.band_high, altitude);
        self.sunset.lerp(self.daylight, t)
    }

    /// Full light state at `time`. Nothing is carried between calls.
    pub fn compute(&self, time: f32) -> SunState {
        let position = self.position(time);
        let unit = position.try_normalize().unwrap_or(Vec3::Y);
        let altitude = unit.y.clamp(-1.0, 1.0);
        let color = self.color_for_altitude(altitude);

        SunState {
            position,
            direction: -unit,
            altitude,
            ambient: color * AMBIENT_SCALE,
            diffuse: color * DIFFUSE_SCALE,
            specular: color * SPECULAR_SCALE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cycle() -> SunCycle {
        SunCycle::new(&SunConfig::default())
    }

    #[test]
    fn test_direction_points_to_origin() {
        let sun = cycle();
        for i in 0..16 {
            let state = sun.compute(i as f32 * 7.5);
            let expected = (-state.position).normalize();
            assert!((state.direction - expected).length() < 1e-5);
            assert!((state.direction.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_orbit_radius_in_xy() {
        let sun = cycle();
        let p = sun.position(30.0); // quarter period: straight up
        assert!(p.x.abs() < 1e-3);
        assert!((p.y - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_orbit_radius_constant() {
        let sun = cycle();
        for i in 0..24 {
            let t = i as f32 * 5.0 + 0.7;
            let r = sun.position(t).length();
            assert!((r - 60.0).abs() < 1e-3, "radius {r} at t={t}");
        }
    }

    #[test]
    fn test_orbit_keeps_tilt() {
        let sun = cycle();
        let p = sun.position(0.0);
        assert!(p.y.abs() < 1e-4);
        assert!((p.z / p.x - 0.35).abs() < 1e-5);
    }

    #[test]
    fn test_color_clamps_outside_band() {
        let sun = cycle();
        let low = Vec3::new(1.0, 0.45, 0.2);
        let high = Vec3::new(1.0, 0.97, 0.9);
        assert!((sun.color_for_altitude(-1.0) - low).length() < 1e-6);
        assert!((sun.color_for_altitude(1.0) - high).length() < 1e-6);
    }

    #[test]
    fn test_color_monotonic_in_band() {
        let sun = cycle();
        let mut prev = sun.color_for_altitude(-0.05).y;
        for i in 1..=50 {
            let alt = -0.05 + 0.65 * i as f32 / 50.0;
            let g = sun.color_for_altitude(alt).y;
            assert!(g >= prev - 1e-6, "green channel must not decrease");
            prev = g;
        }
    }

    #[test]
    fn test_light_ratios() {
        let sun = cycle();
        let state = sun.compute(30.0);
        let color = sun.color_for_altitude(state.altitude);
        assert!((state.ambient - color * 0.2).length() < 1e-6);
        assert!((state.diffuse - color * 0.8).length() < 1e-6);
        assert!((state.specular - color).length() < 1e-6);
    }

    #[test]
    fn test_smoothstep_edges() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    }
}
