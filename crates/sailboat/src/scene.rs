//! The sailboat scene: one frame of simulation, uniforms, compute and draws.

use ocean_sim::{BoatInput, SceneConfig, SimulationState, SunState, WaterLattice};
use winit::keyboard::KeyCode;

use crate::app::{App, FlyCamera, GpuContext, SceneSlot, UniformBuffer};
use crate::gpu::water::GpuWaterField;
use crate::gpu::RenderError;
use crate::render::{boat_mesh, GpuMesh, MeshRenderer, ParticleRenderer, SkyRenderer};

/// Clear colour, only visible if the sky draw is missing.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.03,
    b: 0.06,
    a: 1.0,
};

/// Arrow-key state for the boat.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoatControls {
    pub left: bool,
    pub right: bool,
    pub ahead: bool,
    pub astern: bool,
}

impl BoatControls {
    /// Returns false for keys that do not steer the boat.
    pub fn apply_key(&mut self, code: KeyCode, pressed: bool) -> bool {
        match code {
            KeyCode::ArrowLeft => self.left = pressed,
            KeyCode::ArrowRight => self.right = pressed,
            KeyCode::ArrowUp => self.ahead = pressed,
            KeyCode::ArrowDown => self.astern = pressed,
            _ => return false,
        }
        true
    }

    pub fn input(&self) -> BoatInput {
        let axis = |pos: bool, neg: bool| pos as i32 as f32 - neg as i32 as f32;
        BoatInput {
            steer: axis(self.left, self.right),
            throttle: axis(self.ahead, self.astern),
        }
    }
}

/// Stage the frame time and light state into the scene block.
pub fn stage_lighting(scene: &mut UniformBuffer<SceneSlot>, time: f32, sun: &SunState) {
    scene.set(SceneSlot::Time, time);
    scene.set(SceneSlot::SunDirection, sun.direction);
    scene.set(SceneSlot::SunAltitude, sun.altitude);
    scene.set(SceneSlot::SunAmbient, sun.ambient);
    scene.set(SceneSlot::SunDiffuse, sun.diffuse);
    scene.set(SceneSlot::SunSpecular, sun.specular);
    scene.set(SceneSlot::SunPosition, sun.position);
}

pub struct SailScene {
    state: SimulationState,
    camera: FlyCamera,
    controls: BoatControls,
    particle_size: f32,

    water: GpuWaterField,
    sky: SkyRenderer,
    meshes: MeshRenderer,
    boat: GpuMesh,
    islands: Vec<GpuMesh>,
    particles: ParticleRenderer,
}

impl App for SailScene {
    fn init(ctx: &GpuContext, config: &SceneConfig) -> Result<Self, RenderError> {
        let lattice = WaterLattice::new(config.water.grid_res, config.water.grid_size);
        let water = GpuWaterField::new(ctx, &lattice)?;
        let sky = SkyRenderer::new(ctx)?;
        let meshes = MeshRenderer::new(ctx)?;
        let boat = meshes.upload(ctx, &boat_mesh(), "Boat");
        let islands = config
            .islands
            .iter()
            .map(|island| meshes.upload_island(ctx, island))
            .collect();
        let particles = ParticleRenderer::new(ctx, config.particles.count)?;

        Ok(Self {
            state: SimulationState::new(config),
            camera: FlyCamera::from_config(&config.camera),
            controls: BoatControls::default(),
            particle_size: config.particles.size,
            water,
            sky,
            meshes,
            boat,
            islands,
            particles,
        })
    }

    fn update(&mut self, ctx: &mut GpuContext, dt: f32) {
        let stats = self.state.step(dt, &self.controls.input());
        if let Some(index) = stats.spawned {
            log::trace!("t={:.2} spawned particle {} ({} alive)", stats.time, index, stats.alive);
        }

        stage_lighting(&mut ctx.scene_uniforms, stats.time, self.state.sun());

        self.boat
            .set_transform(self.state.boat().model_matrix(stats.time));
        self.boat.flush(&ctx.queue);

        self.particles
            .upload(&ctx.queue, self.state.particles().pool(), self.particle_size);
    }

    fn render(
        &mut self,
        ctx: &GpuContext,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) {
        let ready = self.water.record_frame(&ctx.queue, encoder, self.state.time());

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &ctx.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        let scene = &ctx.scene_bind_group;
        self.sky.draw_sky(&mut pass, scene);
        self.sky.draw_sun(&mut pass, scene);
        self.water.draw(&mut pass, scene, &ready);
        self.meshes.draw(&mut pass, scene, std::iter::once(&self.boat));
        self.meshes.draw(&mut pass, scene, &self.islands);
        self.particles.draw(&mut pass, scene);
    }

    fn on_key(&mut self, key: KeyCode, pressed: bool) {
        if !self.controls.apply_key(key, pressed) {
            log::debug!("Unbound key {:?}", key);
        }
    }

    fn camera(&self) -> &FlyCamera {
        &self.camera
    }

    fn camera_mut(&mut self) -> &mut FlyCamera {
        &mut self.camera
    }

    fn title() -> &'static str {
        "Sailboat"
    }
}
