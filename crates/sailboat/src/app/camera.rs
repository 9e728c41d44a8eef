use glam::{Mat4, Vec3};
use ocean_sim::config::CameraConfig;

/// Free-flying camera: WASD + Space/Shift to move, mouse to look.
pub struct FlyCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub speed: f32,
    pub sensitivity: f32,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Clone, Copy, Default)]
pub struct InputState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}

impl FlyCamera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            position: Vec3::from_array(config.position),
            yaw: 0.0,
            pitch: 0.0,
            speed: config.speed,
            sensitivity: config.sensitivity,
            fov: config.fov_deg.to_radians(),
            near: config.near,
            far: config.far,
        }
        .looking_along(Vec3::from_array(config.look_direction))
    }

    pub fn with_position(mut self, pos: Vec3) -> Self {
        self.position = pos;
        self
    }

    /// Point the camera along `direction`. A zero direction leaves it unchanged.
    pub fn looking_along(mut self, direction: Vec3) -> Self {
        if let Some(dir) = direction.try_normalize() {
            self.yaw = dir.z.atan2(dir.x);
            self.pitch = dir.y.clamp(-1.0, 1.0).asin().clamp(-PITCH_LIMIT, PITCH_LIMIT);
        }
        self
    }

    pub fn with_target(self, target: Vec3) -> Self {
        let direction = target - self.position;
        self.looking_along(direction)
    }

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
    }

    pub fn right(&self) -> Vec3 {
        Vec3::new(
            (self.yaw + std::f32::consts::FRAC_PI_2).cos(),
            0.0,
            (self.yaw + std::f32::consts::FRAC_PI_2).sin(),
        )
    }

    pub fn up(&self) -> Vec3 {
        Vec3::Y
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), self.up())
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov, aspect, self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    pub fn on_mouse_move(&mut self, delta_x: f32, delta_y: f32) {
        self.yaw += delta_x * self.sensitivity;
        // screen y grows downwards
        self.pitch -= delta_y * self.sensitivity;
        self.pitch = self.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    pub fn on_scroll(&mut self, delta: f32) {
        self.position += self.forward() * delta * self.speed * 0.1;
    }

    pub fn update(&mut self, input: &InputState, dt: f32) {
        let mut movement = Vec3::ZERO;

        if input.forward {
            movement += self.forward();
        }
        if input.back {
            movement -= self.forward();
        }
        if input.right {
            movement += self.right();
        }
        if input.left {
            movement -= self.right();
        }
        if input.up {
            movement += self.up();
        }
        if input.down {
            movement -= self.up();
        }

        if movement.length_squared() > 0.0 {
            self.position += movement.normalize() * self.speed * dt;
        }
    }
}

/// Pitch limit, ~89 degrees.
const PITCH_LIMIT: f32 = 1.5533;
