//! Rendering adapter: everything a backend needs to draw a frame, computed
//! from the game world without touching the GPU.
//!
//! # Invariants
//! - Renderers never mutate the world; render state derives from world state and view.
//! - A draw list is a flat set of primitive instances; backends only rasterize it.

mod camera;
mod draw;
mod renderer;

pub use camera::{CameraMode, RenderView};
pub use draw::{BULL_COLOR, DrawInstance, DrawList, INNER_COLOR, MeshKind, OUTER_COLOR, SPLAT_LIFT, build_draw_list};
pub use renderer::{DebugTextRenderer, Renderer};

pub fn crate_info() -> &'static str {
    "rooftop-render v0.1.0"
}
