//! Scene configuration.
//!
//! Every section falls back to its defaults when missing, so a config file only
//! needs to name what it changes. Vectors and colours are stored as plain
//! arrays (glam has no serde support enabled here).

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors produced while loading or validating a [`SceneConfig`].
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Config I/O error: {}", e),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

/// Base wind and large-scale gust parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    /// Direction the wind blows towards (normalized on use)
    pub direction: [f32; 3],
    /// Particle speed along the wind (units/s)
    pub speed: f32,
    /// Seconds for one full gust / lateral oscillation cycle
    pub wave_period: f32,
    /// Maximum gust swing about world-up (degrees)
    pub max_gust_angle_deg: f32,
    /// Lateral oscillation amplitude applied per particle
    pub side_amplitude: f32,
    /// Scale applied to negative gust swings
    pub gust_scale_negative: f32,
    /// Scale applied to positive gust swings
    pub gust_scale_positive: f32,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            direction: [1.0, 0.0, 1.0],
            speed: 1.5,
            wave_period: 50.0,
            max_gust_angle_deg: 25.0,
            side_amplitude: 0.35,
            gust_scale_negative: 0.4,
            gust_scale_positive: 0.6,
        }
    }
}

impl WindConfig {
    pub fn direction(&self) -> Vec3 {
        Vec3::from_array(self.direction)
    }

    /// Angular frequency of the gust and lateral oscillation (rad/s).
    pub fn wave_frequency(&self) -> f32 {
        std::f32::consts::TAU / self.wave_period
    }
}

/// Wind particle pool and spawn-tunnel parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub count: usize,
    /// Probability of one respawn per frame
    pub spawn_probability: f64,
    /// Seconds a respawned particle lives
    pub life: f32,
    /// Upwind distance range from the anchor
    pub min_distance: f32,
    pub max_distance: f32,
    /// Width of the band perpendicular to the wind
    pub tunnel_width: f32,
    pub min_height: f32,
    pub max_height: f32,
    /// Alpha change per second while fading in or out
    pub fade_rate: f32,
    /// Seconds at each end of life during which alpha fades
    pub fade_window: f32,
    /// Billboard edge length
    pub size: f32,
    /// Fixed RNG seed; entropy when absent
    pub seed: Option<u64>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 200,
            spawn_probability: 0.02,
            life: 5.0,
            min_distance: 0.5,
            max_distance: 3.0,
            tunnel_width: 3.5,
            min_height: -0.2,
            max_height: 0.6,
            fade_rate: 2.5,
            fade_window: 1.0,
            size: 0.1,
            seed: None,
        }
    }
}

/// Water lattice dimensions.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    /// Vertices per side
    pub grid_res: u32,
    /// World units spanned per side
    pub grid_size: f32,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            grid_res: 32,
            grid_size: 40.0,
        }
    }
}

/// Day/night cycle parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SunConfig {
    pub orbit_radius: f32,
    /// Seconds per full orbit
    pub period: f32,
    /// Lean of the orbit's horizontal axis towards +Z, relative to X
    pub orbit_tilt: f32,
    pub sunset_color: [f32; 3],
    pub daylight_color: [f32; 3],
    /// Altitude at which the blend starts leaving the sunset colour
    pub band_low: f32,
    /// Altitude at which the blend reaches the daylight colour
    pub band_high: f32,
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            orbit_radius: 60.0,
            period: 120.0,
            orbit_tilt: 0.35,
            sunset_color: [1.0, 0.45, 0.2],
            daylight_color: [1.0, 0.97, 0.9],
            band_low: -0.05,
            band_high: 0.6,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BoatConfig {
    /// Steering rate at full input (rad/s)
    pub turn_rate: f32,
    /// Forward speed at full throttle (units/s)
    pub speed: f32,
    /// Uniform model scale
    pub scale: f32,
    /// Height of the hull origin above the wave surface
    pub draft_offset: f32,
}

impl Default for BoatConfig {
    fn default() -> Self {
        Self {
            turn_rate: 0.8,
            speed: 2.0,
            scale: 0.5,
            draft_offset: 0.1,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub look_direction: [f32; 3],
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
    pub speed: f32,
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [8.27, 5.23, 11.14],
            look_direction: [-0.67, -0.16, -0.73],
            fov_deg: 45.0,
            near: 0.1,
            far: 200.0,
            speed: 2.5,
            sensitivity: 0.003,
        }
    }
}

/// A procedural cone island.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IslandConfig {
    pub position: [f32; 2],
    pub radius: f32,
    pub height: f32,
}

fn default_islands() -> Vec<IslandConfig> {
    vec![
        IslandConfig { position: [-12.0, -9.0], radius: 4.0, height: 3.0 },
        IslandConfig { position: [14.0, -6.0], radius: 2.5, height: 1.8 },
        IslandConfig { position: [-4.0, 15.0], radius: 3.0, height: 2.2 },
    ]
}

/// Complete scene configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub wind: WindConfig,
    pub particles: ParticleConfig,
    pub water: WaterConfig,
    pub sun: SunConfig,
    pub boat: BoatConfig,
    pub camera: CameraConfig,
    #[serde(default = "default_islands")]
    pub islands: Vec<IslandConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            wind: WindConfig::default(),
            particles: ParticleConfig::default(),
            water: WaterConfig::default(),
            sun: SunConfig::default(),
            boat: BoatConfig::default(),
            camera: CameraConfig::default(),
            islands: default_islands(),
        }
    }
}

impl SceneConfig {
    /// Every float field, named as in the config file.
    fn float_fields(&self) -> Vec<(String, f32)> {
        let (w, p, s, b, c) = (&self.wind, &self.particles, &self.sun, &self.boat, &self.camera);
        let mut fields: Vec<(String, f32)> = [
            ("wind.speed", w.speed),
            ("wind.wave_period", w.wave_period),
            ("wind.max_gust_angle_deg", w.max_gust_angle_deg),
            ("wind.side_amplitude", w.side_amplitude),
            ("wind.gust_scale_negative", w.gust_scale_negative),
            ("wind.gust_scale_positive", w.gust_scale_positive),
            ("particles.life", p.life),
            ("particles.min_distance", p.min_distance),
            ("particles.max_distance", p.max_distance),
            ("particles.tunnel_width", p.tunnel_width),
            ("particles.min_height", p.min_height),
            ("particles.max_height", p.max_height),
            ("particles.fade_rate", p.fade_rate),
            ("particles.fade_window", p.fade_window),
            ("particles.size", p.size),
            ("water.grid_size", self.water.grid_size),
            ("sun.orbit_radius", s.orbit_radius),
            ("sun.period", s.period),
            ("sun.orbit_tilt", s.orbit_tilt),
            ("sun.band_low", s.band_low),
            ("sun.band_high", s.band_high),
            ("boat.turn_rate", b.turn_rate),
            ("boat.speed", b.speed),
            ("boat.scale", b.scale),
            ("boat.draft_offset", b.draft_offset),
            ("camera.fov_deg", c.fov_deg),
            ("camera.near", c.near),
            ("camera.far", c.far),
            ("camera.speed", c.speed),
            ("camera.sensitivity", c.sensitivity),
        ]
        .into_iter()
        .map(|(name, v)| (name.to_string(), v))
        .collect();

        let arrays: [(&str, &[f32]); 5] = [
            ("wind.direction", &w.direction),
            ("sun.sunset_color", &s.sunset_color),
            ("sun.daylight_color", &s.daylight_color),
            ("camera.position", &c.position),
            ("camera.look_direction", &c.look_direction),
        ];
        for (name, values) in arrays {
            fields.extend(values.iter().enumerate().map(|(i, &v)| (format!("{name}[{i}]"), v)));
        }
        for (i, island) in self.islands.iter().enumerate() {
            fields.push((format!("islands[{i}].position[0]"), island.position[0]));
            fields.push((format!("islands[{i}].position[1]"), island.position[1]));
            fields.push((format!("islands[{i}].radius"), island.radius));
            fields.push((format!("islands[{i}].height"), island.height));
        }
        fields
    }

    /// Check ranges the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // NaN slips through every ordering check below
        if let Some((name, value)) = self.float_fields().into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")));
        }

        let p = &self.particles;
        if p.count == 0 {
            return Err(ConfigError::Invalid("particle count must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&p.spawn_probability) {
            return Err(ConfigError::Invalid(format!(
                "spawn probability {} outside [0, 1]",
                p.spawn_probability
            )));
        }
        if p.life <= 0.0 {
            return Err(ConfigError::Invalid("particle life must be positive".into()));
        }
        if p.min_distance > p.max_distance {
            return Err(ConfigError::Invalid(format!(
                "min_distance {} exceeds max_distance {}",
                p.min_distance, p.max_distance
            )));
        }
        if p.min_height > p.max_height {
            return Err(ConfigError::Invalid(format!(
                "min_height {} exceeds max_height {}",
                p.min_height, p.max_height
            )));
        }
        if p.tunnel_width < 0.0 {
            return Err(ConfigError::Invalid("tunnel width must not be negative".into()));
        }
        if self.water.grid_res < 2 {
            return Err(ConfigError::Invalid("water grid_res must be at least 2".into()));
        }
        if self.water.grid_size <= 0.0 {
            return Err(ConfigError::Invalid("water grid_size must be positive".into()));
        }
        if self.sun.period <= 0.0 {
            return Err(ConfigError::Invalid("sun period must be positive".into()));
        }
        if self.sun.band_low >= self.sun.band_high {
            return Err(ConfigError::Invalid(format!(
                "sun band [{}, {}] is empty",
                self.sun.band_low, self.sun.band_high
            )));
        }
        if self.wind.wave_period <= 0.0 {
            return Err(ConfigError::Invalid("wind wave period must be positive".into()));
        }
        if self.wind.direction().length_squared() < 1e-12 {
            return Err(ConfigError::Invalid("wind direction must be non-zero".into()));
        }
        Ok(())
    }

    /// Load configuration from JSON file
    pub fn load_json(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config: Self =
            serde_json::from_str(&json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn save_json(&self, path: &Path) -> Result<(), ConfigError> {
        let json =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load configuration from YAML file
    pub fn load_yaml(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        let config: Self =
            serde_yaml::from_str(&yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn save_yaml(&self, path: &Path) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Load by file extension: `.yaml`/`.yml` as YAML, anything else as JSON.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::load_yaml(path),
            _ => Self::load_json(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_islands_present() {
        let config = SceneConfig::default();
        assert_eq!(config.islands.len(), 3);
    }

    #[test]
    fn test_rejects_zero_particles() {
        let mut config = SceneConfig::default();
        config.particles.count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_bad_probability() {
        let mut config = SceneConfig::default();
        config.particles.spawn_probability = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_small_grid() {
        let mut config = SceneConfig::default();
        config.water.grid_res = 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_wind() {
        let mut config = SceneConfig::default();
        config.wind.direction = [0.0, 0.0, 0.0];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_fields() {
        let mut config = SceneConfig::default();
        config.particles.tunnel_width = f32::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SceneConfig::default();
        config.sun.daylight_color[1] = f32::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = SceneConfig::default();
        config.islands[2].radius = f32::NEG_INFINITY;
        match config.validate() {
            Err(ConfigError::Invalid(msg)) => assert!(msg.contains("islands[2].radius")),
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SceneConfig =
            serde_json::from_str(r#"{ "water": { "grid_res": 64 } }"#).unwrap();
        assert_eq!(config.water.grid_res, 64);
        assert_eq!(config.water.grid_size, 40.0);
        assert_eq!(config.particles.count, 200);
        assert_eq!(config.islands.len(), 3);
    }

    #[test]
    fn test_wave_frequency() {
        let wind = WindConfig::default();
        let expected = 2.0 * std::f32::consts::PI / 50.0;
        assert!((wind.wave_frequency() - expected).abs() < 1e-6);
    }
}
