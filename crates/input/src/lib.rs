//! Embodiment: keyboard and mouse input mapped to shared actions and per-tick
//! input frames.
//!
//! # Invariants
//! - The simulation consumes [`InputFrame`]s, never raw device events.
//! - Edge-triggered actions fire once per press, however long the key is held.

pub mod action;
pub mod bindings;
pub mod state;

pub use action::{Action, Key, MouseButton};
pub use bindings::Bindings;
pub use state::{InputFrame, InputState};

pub fn crate_info() -> &'static str {
    "rooftop-input v0.1.0"
}
