//! wgpu front end for the ocean scene: GPU context, uniform channel, water
//! compute, scene renderers and the frame loop.

pub mod app;
pub mod gpu;
pub mod render;
pub mod scene;

pub use scene::SailScene;
