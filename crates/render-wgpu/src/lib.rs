//! wgpu render backend for the gallery.
//!
//! Draws a [`rooftop_render::DrawList`]: one lit flat-colour pipeline over a
//! handful of unit meshes, plus street centre lines on the ground.
//!
//! # Invariants
//! - The renderer never sees the game world, only draw lists and views.
//! - Render frame rate is independent of the simulation tick.

mod camera;
mod gpu;
mod mesh;
mod shaders;

pub use camera::GpuCamera;
pub use gpu::{MAX_INSTANCES, SKY_COLOR, WgpuRenderer};
pub use mesh::TORUS_TUBE;
