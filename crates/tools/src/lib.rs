//! Developer tooling: read-only game inspection and frame timing.
//!
//! # Invariants
//! - Tools never mutate the game world.

mod inspector;
mod timer;

pub use inspector::{GameInspector, GameSummary, TargetInfo};
pub use timer::FrameTimer;

pub fn crate_info() -> &'static str {
    "rooftop-tools v0.1.0"
}
